//! Collaborator traits defined in `sidechain-core` and implemented by the
//! storage and integration crates.

pub mod activity;
pub mod cache;
pub mod feed;
pub mod preferences;
pub mod search;
pub mod social;
pub mod source;

pub use activity::ActivitySettingsStore;
pub use cache::CacheProvider;
pub use feed::FeedStore;
pub use preferences::PreferenceStore;
pub use search::SearchIndex;
pub use social::SocialGraph;
pub use source::SearchSource;
