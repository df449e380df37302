//! # Error Types
//!
//! Domain-specific error types for shopsync-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopsync-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopsync-db errors                                                    │
//! │  └── DbError          - Local store failures                           │
//! │                                                                         │
//! │  shopsync-sync errors                                                  │
//! │  ├── RemoteError      - Transport / decoding failures                  │
//! │  └── SyncError        - What a completion receives                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SyncError → completion            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A resource kind name could not be parsed.
    ///
    /// ## When This Occurs
    /// - CLI argument such as `--resource widgets`
    /// - Config file listing an unknown kind
    #[error("Unknown resource kind: {0}")]
    UnknownResourceKind(String),

    /// A sort order name could not be parsed.
    #[error("Unknown sort order: {0}")]
    UnknownSortOrder(String),

    /// A filter value (stock status, product status, product type) could
    /// not be parsed.
    #[error("Unknown {field}: {value}")]
    UnknownValue { field: &'static str, value: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., URL without scheme).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
