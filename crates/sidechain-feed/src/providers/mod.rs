//! Feed store provider implementations.

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "http")]
pub use http::HttpFeedStore;
#[cfg(feature = "memory")]
pub use memory::InMemoryFeedStore;
