//! Domain-level error taxonomy.
//!
//! Every public repository operation returns either success or one of these
//! errors. They are transport agnostic: the inbound HTTP layer maps
//! [`ErrorCode`] to status codes.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Local row absent or remote record answered 404.
    NotFound,
    /// Caller supplied contradictory or out-of-range input.
    InvalidArgument,
    /// A uniqueness rule would be violated.
    Conflict,
    /// A remote service failed with anything other than 404.
    RemoteFailure,
    /// Any other local failure.
    Internal,
}

/// Domain error payload.
///
/// # Examples
/// ```
/// use portfolio::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("project not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary structured details.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Remote failure carrying the HTTP status (if any) and attempted path.
    ///
    /// ```
    /// use portfolio::domain::{Error, ErrorCode};
    ///
    /// let err = Error::remote_failure("directory unavailable", Some(503), "/api/user");
    /// assert_eq!(err.code(), ErrorCode::RemoteFailure);
    /// assert_eq!(err.remote_status(), Some(503));
    /// ```
    pub fn remote_failure(
        message: impl Into<String>,
        status: Option<u16>,
        path: impl Into<String>,
    ) -> Self {
        Self::new(ErrorCode::RemoteFailure, message).with_details(json!({
            "status": status,
            "path": path.into(),
        }))
    }

    /// HTTP status recorded on a remote failure.
    pub fn remote_status(&self) -> Option<u16> {
        self.details
            .as_ref()
            .and_then(|details| details.get("status"))
            .and_then(Value::as_u64)
            .and_then(|status| u16::try_from(status).ok())
    }

    /// Path recorded on a remote failure.
    pub fn remote_path(&self) -> Option<&str> {
        self.details
            .as_ref()
            .and_then(|details| details.get("path"))
            .and_then(Value::as_str)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
