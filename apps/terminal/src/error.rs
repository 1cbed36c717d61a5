//! # Command Error Type
//!
//! Unified error type for console commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Terminal                           │
//! │                                                                         │
//! │  Operator types `confirm`                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, CommandError>                                         │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Backend Error? ─── ClientError::Rejected{..} ─────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Register Error? ─── CoreError::PaymentInvalid ── CommandError ─►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The console prints `error [PAYMENT_ERROR]: ...` and keeps running.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use wt_api::ClientError;
use wt_core::{CoreError, ValidationError};

/// Error returned from console commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "PAYMENT_ERROR",
///   "message": "Payment cannot be confirmed: cash received ₹200.00 is less than total ₹212.40"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct CommandError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product or line not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Bill cannot be edited in the current checkout state
    CartLocked,

    /// Payment cannot be started or confirmed
    PaymentError,

    /// Login required or rejected
    Unauthorized,

    /// Backend rejected or could not be reached
    BackendError,

    /// Terminal configuration is missing or invalid
    ConfigError,

    /// Local file failure
    Internal,

    /// Unknown console command
    UnknownCommand,
}

impl ErrorCode {
    /// Wire form, e.g. `PAYMENT_ERROR`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::CartLocked => "CART_LOCKED",
            ErrorCode::PaymentError => "PAYMENT_ERROR",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::BackendError => "BACKEND_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::Internal => "INTERNAL",
            ErrorCode::UnknownCommand => "UNKNOWN_COMMAND",
        }
    }
}

impl CommandError {
    /// Creates a new command error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CommandError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        CommandError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        CommandError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a payment error.
    pub fn payment(message: impl Into<String>) -> Self {
        CommandError::new(ErrorCode::PaymentError, message)
    }

    /// Creates an unknown command error.
    pub fn unknown_command(input: &str) -> Self {
        CommandError::new(
            ErrorCode::UnknownCommand,
            format!("Unknown command '{}'. Type 'help' for the list.", input),
        )
    }
}

/// Converts register and cart errors.
impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::LineIndexOutOfRange { .. } => ErrorCode::NotFound,
            CoreError::BillFrozen { .. } | CoreError::CheckoutInProgress => ErrorCode::CartLocked,
            CoreError::EmptyBill
            | CoreError::NoPaymentMethod
            | CoreError::PaymentInvalid { .. }
            | CoreError::InvalidTransition { .. } => ErrorCode::PaymentError,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        CommandError::new(code, err.to_string())
    }
}

impl From<ValidationError> for CommandError {
    fn from(err: ValidationError) -> Self {
        CommandError::validation(err.to_string())
    }
}

/// Converts collaborator errors.
impl From<ClientError> for CommandError {
    fn from(err: ClientError) -> Self {
        let code = match &err {
            e if e.is_auth_error() => ErrorCode::Unauthorized,
            e if e.is_config_error() => {
                tracing::error!(error = %err, "Terminal configuration problem");
                ErrorCode::ConfigError
            }
            ClientError::InvalidInput(_) => ErrorCode::ValidationError,
            ClientError::Rejected { status: 404, .. } => ErrorCode::NotFound,
            ClientError::Rejected { .. }
            | ClientError::ConnectionFailed(_)
            | ClientError::Timeout(_)
            | ClientError::Http(_)
            | ClientError::InvalidResponse(_)
            | ClientError::QrRender(_) => ErrorCode::BackendError,
            _ => {
                tracing::error!(error = %err, "Local failure");
                ErrorCode::Internal
            }
        };
        CommandError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wt_core::PaymentState;

    #[test]
    fn test_core_error_codes() {
        let err: CommandError = CoreError::CheckoutInProgress.into();
        assert_eq!(err.code, ErrorCode::CartLocked);

        let err: CommandError = CoreError::PaymentInvalid {
            reason: "cash received ₹200.00 is less than total ₹212.40".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert!(err.message.contains("₹212.40"));

        let err: CommandError = CoreError::InvalidTransition {
            action: "confirm payment",
            state: PaymentState::Cancelled,
        }
        .into();
        assert_eq!(err.message, "Cannot confirm payment while payment is Cancelled");
    }

    #[test]
    fn test_client_error_codes() {
        let err: CommandError = ClientError::NotLoggedIn.into();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let err: CommandError = ClientError::Rejected {
            status: 404,
            message: "Product not found".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: CommandError = ClientError::Timeout("15s".into()).into();
        assert_eq!(err.code, ErrorCode::BackendError);

        let err: CommandError = ClientError::Io("disk full".into()).into();
        assert_eq!(err.code, ErrorCode::Internal);

        let err: CommandError = ClientError::InvalidUrl("relative URL without a base".into()).into();
        assert_eq!(err.code, ErrorCode::ConfigError);
        assert_eq!(err.code.as_str(), "CONFIG_ERROR");
    }

    #[test]
    fn test_serialization() {
        let err = CommandError::payment("Select a payment method first");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "PAYMENT_ERROR");
        assert_eq!(json["message"], "Select a payment method first");
        assert_eq!(err.code.as_str(), "PAYMENT_ERROR");
    }
}
