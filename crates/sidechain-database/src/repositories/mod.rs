//! PostgreSQL implementations of the core store traits.

pub mod activity;
pub mod preferences;
pub mod search_source;
pub mod social;

pub use activity::PgActivitySettingsStore;
pub use preferences::PgPreferenceStore;
pub use search_source::PgSearchSource;
pub use social::PgSocialGraph;
