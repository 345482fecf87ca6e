//! Pagination query parameter extractor.

use serde::{Deserialize, Serialize};
use validator::Validate;

use sidechain_core::error::AppError;
use sidechain_core::types::PageRequest;

/// Query parameters for paginated endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaginationParams {
    /// Page number (1-based, default: 1).
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page starts at 1"))]
    pub page: u64,
    /// Items per page (default: 20, max: 100).
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    PageRequest::default().page_size
}

impl PaginationParams {
    /// Validates and converts to a `PageRequest`.
    pub fn into_page_request(self) -> Result<PageRequest, AppError> {
        self.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        Ok(PageRequest::new(self.page, self.page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_page_size_rejected() {
        let params = PaginationParams {
            page: 1,
            page_size: 500,
        };
        assert!(params.into_page_request().is_err());

        let params = PaginationParams {
            page: 2,
            page_size: 10,
        };
        assert_eq!(params.into_page_request().unwrap(), PageRequest::new(2, 10));
    }
}
