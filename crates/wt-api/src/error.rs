//! # Client Error Types
//!
//! Error types for everything that leaves the process: backend calls,
//! the QR service, config files and export files.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Backend             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  Rejected {status,msg}  │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  Unauthorized           │ │
//! │  │  ConfigLoad/Save│  │  Http           │  │  InvalidResponse        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Session      │  │     Local       │                              │
//! │  │                 │  │                 │                              │
//! │  │  NotLoggedIn    │  │  Io / Serialize │                              │
//! │  │  SessionExpired │  │  QrRender       │                              │
//! │  │                 │  │  InvalidInput   │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for collaborator operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Error type covering every collaborator failure.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid terminal configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid backend or QR service URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not reach the backend.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete in time.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other HTTP-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// The backend answered with a non-success status.
    #[error("Backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// 401/403 from the backend.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Session expired, log in again")]
    SessionExpired,

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// File system failure (exports, config directory).
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The QR service returned something that is not an image.
    #[error("QR rendering failed: {0}")]
    QrRender(String),

    /// Input rejected locally before it was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_connect() {
            ClientError::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

impl From<wt_core::ValidationError> for ClientError {
    fn from(err: wt_core::ValidationError) -> Self {
        ClientError::InvalidInput(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if the same request may succeed when sent again.
    ///
    /// Bill saves are never retried automatically; the operator decides.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::ConnectionFailed(_) | ClientError::Timeout(_) => true,
            ClientError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if the operator has to log in (again).
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized(_) | ClientError::NotLoggedIn | ClientError::SessionExpired
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ClientError::ConnectionFailed("refused".into()).is_retryable());
        assert!(ClientError::Timeout("30s".into()).is_retryable());
        assert!(ClientError::Rejected {
            status: 503,
            message: "busy".into()
        }
        .is_retryable());

        assert!(!ClientError::Rejected {
            status: 400,
            message: "Insufficient stock".into()
        }
        .is_retryable());
        assert!(!ClientError::InvalidConfig("bad".into()).is_retryable());
        assert!(!ClientError::NotLoggedIn.is_retryable());
    }

    #[test]
    fn test_auth_errors() {
        assert!(ClientError::Unauthorized("token expired".into()).is_auth_error());
        assert!(ClientError::SessionExpired.is_auth_error());
        assert!(!ClientError::Http("boom".into()).is_auth_error());
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::Rejected {
            status: 422,
            message: "Product not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "Backend rejected request (422): Product not found"
        );
    }

    #[test]
    fn test_url_error_is_config_error() {
        let err: ClientError = url::Url::parse("not a url").unwrap_err().into();
        assert!(err.is_config_error());
    }
}
