//! Convenience result type alias for Sidechain.

use crate::error::AppError;

/// A specialized `Result` type for Sidechain operations.
pub type AppResult<T> = Result<T, AppError>;
