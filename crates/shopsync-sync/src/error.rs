//! # Sync Error Types
//!
//! Error types for remote calls and synchronization.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Remote      │  │      Storage            │ │
//! │  │                 │  │  (RemoteError)  │  │     (DbError)           │ │
//! │  │  InvalidConfig  │  │  Network        │  │  QueryFailed            │ │
//! │  │  InvalidUrl     │  │  Http           │  │  TransactionFailed      │ │
//! │  │  ConfigLoad/Save│  │  Decoding       │  │  ...                    │ │
//! │  │                 │  │  Timeout        │  │  (transaction rolled    │ │
//! │  │                 │  │                 │  │   back)                 │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Paging       │  │   Dispatch      │                              │
//! │  │                 │  │                 │                              │
//! │  │  PageLimit-     │  │  Duplicate-     │                              │
//! │  │  Exceeded       │  │  Processor      │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use shopsync_core::{ResourceKind, SiteId};
use shopsync_db::DbError;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

// =============================================================================
// Remote Error
// =============================================================================

/// Failure of a single remote list call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request could not be sent or the connection broke.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body did not decode into the expected records.
    #[error("Failed to decode response: {0}")]
    Decoding(String),

    /// The request did not complete in time.
    #[error("Request timed out")]
    Timeout,
}

impl RemoteError {
    /// Returns true if repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Network(_) | RemoteError::Timeout => true,
            RemoteError::Http { status, .. } => *status == 429 || *status >= 500,
            RemoteError::Decoding(_) => false,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::Decoding(err.to_string())
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}

// =============================================================================
// Sync Error
// =============================================================================

/// Sync error type covering every failure a completion can receive.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Invalid API URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Synchronization Errors
    // =========================================================================
    /// The remote call failed; the local store was not touched.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// The local store failed; the reconciliation was rolled back.
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    /// A paginated collection did not end within the page cap.
    #[error("{kind} collection for site {site_id} exceeds {max_pages} pages")]
    PageLimitExceeded {
        kind: ResourceKind,
        site_id: SiteId,
        max_pages: u32,
    },

    // =========================================================================
    // Dispatch Errors
    // =========================================================================
    /// A processor is already registered for this action kind.
    #[error("A processor is already registered for {0} actions")]
    DuplicateProcessor(ResourceKind),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if this error is recoverable and the sync can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Remote(err) => err.is_retryable(),
            SyncError::Storage(err) => err.is_transient(),
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(SyncError::Remote(RemoteError::Timeout).is_retryable());
        assert!(SyncError::Remote(RemoteError::Network("reset".into())).is_retryable());
        assert!(SyncError::Remote(RemoteError::Http {
            status: 503,
            body: String::new()
        })
        .is_retryable());
        assert!(SyncError::Storage(DbError::PoolExhausted).is_retryable());

        assert!(!SyncError::Remote(RemoteError::Http {
            status: 404,
            body: "rest_no_route".into()
        })
        .is_retryable());
        assert!(!SyncError::Remote(RemoteError::Decoding("eof".into())).is_retryable());
        assert!(!SyncError::InvalidConfig("bad".into()).is_retryable());
    }

    #[test]
    fn test_config_errors() {
        assert!(SyncError::InvalidUrl("ftp://x".into()).is_config_error());
        assert!(!SyncError::Remote(RemoteError::Timeout).is_config_error());
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::PageLimitExceeded {
            kind: ResourceKind::Product,
            site_id: SiteId::new(7),
            max_pages: 3,
        };
        assert_eq!(err.to_string(), "product collection for site 7 exceeds 3 pages");

        let err = SyncError::DuplicateProcessor(ResourceKind::Coupon);
        assert!(err.to_string().contains("coupon"));
    }
}
