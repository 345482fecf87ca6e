//! Search index provider implementations.

#[cfg(feature = "elasticsearch")]
pub mod elasticsearch;
#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "elasticsearch")]
pub use elasticsearch::ElasticsearchIndex;
#[cfg(feature = "memory")]
pub use memory::InMemorySearchIndex;
