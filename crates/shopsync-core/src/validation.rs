//! # Validation Module
//!
//! Input validation for configuration values and sync requests.
//!
//! ## Usage
//! ```rust
//! use shopsync_core::validation::{validate_page_size, validate_site_id};
//!
//! validate_page_size(25).unwrap();
//! assert!(validate_site_id(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_PAGE_SIZE;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a remote page size.
///
/// ## Rules
/// - Must be between 1 and [`MAX_PAGE_SIZE`] (the REST API's `per_page` cap)
pub fn validate_page_size(size: u32) -> ValidationResult<()> {
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "page_size".to_string(),
            min: 1,
            max: i64::from(MAX_PAGE_SIZE),
        });
    }
    Ok(())
}

/// Validates the cap on pages walked per sync.
pub fn validate_max_pages(max_pages: u32) -> ValidationResult<()> {
    if max_pages == 0 {
        return Err(ValidationError::MustBePositive {
            field: "max_pages".to_string(),
        });
    }
    Ok(())
}

/// Validates a raw site identifier.
pub fn validate_site_id(site_id: i64) -> ValidationResult<()> {
    if site_id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "site_id".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates the REST API base URL.
///
/// ## Rules
/// - Must not be empty
/// - Must start with `http://` or `https://`
/// - Must have a host after the scheme
///
/// ## Returns
/// The URL with surrounding whitespace and trailing slashes removed.
pub fn validate_api_url(url: &str) -> ValidationResult<String> {
    let url = url.trim();

    if url.is_empty() {
        return Err(ValidationError::Required {
            field: "api.base_url".to_string(),
        });
    }

    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "api.base_url".to_string(),
            reason: "must start with http:// or https://".to_string(),
        })?;

    if rest.trim_matches('/').is_empty() {
        return Err(ValidationError::InvalidFormat {
            field: "api.base_url".to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url.trim_end_matches('/').to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_page_size() {
        assert!(validate_page_size(1).is_ok());
        assert!(validate_page_size(100).is_ok());
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(101).is_err());
    }

    #[test]
    fn test_validate_max_pages() {
        assert!(validate_max_pages(1).is_ok());
        assert_eq!(
            validate_max_pages(0),
            Err(ValidationError::MustBePositive {
                field: "max_pages".to_string()
            })
        );
    }

    #[test]
    fn test_validate_site_id() {
        assert!(validate_site_id(7).is_ok());
        assert!(validate_site_id(0).is_err());
        assert!(validate_site_id(-3).is_err());
    }

    #[test]
    fn test_validate_api_url() {
        assert_eq!(
            validate_api_url(" https://api.example.com/rest/v1.1/ ").unwrap(),
            "https://api.example.com/rest/v1.1"
        );
        assert!(validate_api_url("http://localhost:8080").is_ok());
        assert!(validate_api_url("").is_err());
        assert!(validate_api_url("ftp://example.com").is_err());
        assert!(validate_api_url("https://").is_err());
    }
}
