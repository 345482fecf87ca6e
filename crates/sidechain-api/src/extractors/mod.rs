//! Custom Axum extractors.

pub mod auth;
pub mod pagination;

pub use auth::{AuthUser, InternalCaller, bearer_token};
pub use pagination::PaginationParams;
