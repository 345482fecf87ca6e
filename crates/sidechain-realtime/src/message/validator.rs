//! Message validation rules.

use sidechain_core::error::AppError;

/// Reject empty or oversized text frames before parsing.
pub fn validate_inbound(raw: &str, max_size: usize) -> Result<(), AppError> {
    if raw.len() > max_size {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_size} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

/// Trim custom status text and cap it at `max_chars` characters.
/// Returns `None` when nothing is left.
pub fn normalize_status_text(text: &str, max_chars: usize) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_chars).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_limit() {
        assert!(validate_inbound(r#"{"type":"heartbeat"}"#, 64).is_ok());
        assert!(validate_inbound(&"x".repeat(65), 64).is_err());
        assert!(validate_inbound("   ", 64).is_err());
    }

    #[test]
    fn test_status_text_is_trimmed_and_capped() {
        assert_eq!(normalize_status_text("  mixing  ", 100).as_deref(), Some("mixing"));
        assert_eq!(normalize_status_text("   ", 100), None);
        let long = "é".repeat(150);
        assert_eq!(normalize_status_text(&long, 100).unwrap().chars().count(), 100);
    }
}
