//! Error Types
//!
//! Two layers of failure exist in the mini-app:
//!
//! - [`ApiError`]: anything that went wrong talking to the remote API
//! - [`ControllerError`]: a controller refused an operation (bad input, wrong
//!   step) or the API call behind it failed
//!
//! None of these are fatal. Every caller catches them at the boundary of the
//! user action that triggered them and turns them into inline state or a toast.

use thiserror::Error;

use crate::wizard::WizardStep;

/// Failure of a single request against the remote API
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Transport-level failure (DNS, timeout, offline, client setup)
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("server rejected request with status {code}")]
    Status {
        /// HTTP status code
        code: u16,
    },

    /// The server answered 2xx but the body was not the expected shape
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status code, if the server produced one
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code } => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Status {
                code: status.as_u16(),
            }
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// A controller operation that could not be performed
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ControllerError {
    /// Client-side precondition failed (non-positive amount, missing selection)
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation is not valid for the current wizard step
    #[error("{operation} is not allowed in step {step}")]
    State {
        /// Operation that was attempted
        operation: &'static str,
        /// Step the wizard was in
        step: WizardStep,
    },

    /// The API call backing the operation failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ControllerError {
    /// Whether this is a validation failure
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether this is an invalid-transition failure
    #[must_use]
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        assert_eq!(ApiError::Status { code: 404 }.status_code(), Some(404));
        assert_eq!(ApiError::Network("offline".into()).status_code(), None);
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Status { code: 500 };
        assert_eq!(err.to_string(), "server rejected request with status 500");

        let err = ControllerError::State {
            operation: "select_bank",
            step: WizardStep::Country,
        };
        assert_eq!(err.to_string(), "select_bank is not allowed in step country");
        assert!(err.is_state());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_api_error_converts_into_controller_error() {
        let err: ControllerError = ApiError::Network("timeout".into()).into();
        assert_eq!(err.to_string(), "network error: timeout");
    }
}
