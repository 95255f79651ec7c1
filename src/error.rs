use thiserror::Error;

use crate::AuthError;

/// Client-side validation failures.
///
/// These block an action locally and are rendered inline next to the
/// offending field; they never reach the backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required form field was left empty.
    #[error("required field is empty: {0}")]
    EmptyField(&'static str),

    /// Password confirmation does not match the password.
    #[error("password confirmation does not match")]
    PasswordMismatch,

    /// New password is shorter than the configured minimum.
    #[error("password must have at least {min} characters")]
    PasswordTooShort { min: usize },

    /// A numeric form field could not be parsed.
    #[error("field {field} is not a number: {input:?}")]
    InvalidNumber { field: &'static str, input: String },

    /// A sample arrived without a value and the policy rejects it.
    #[error("sample has no value")]
    MissingValue,

    /// A sample value is not a finite number.
    #[error("sample value is not numeric: {0}")]
    NonNumericValue(String),

    /// A sample timestamp is missing or not RFC 3339.
    #[error("invalid sample timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Errors that can occur while talking to the backend or running a screen action.
#[derive(Error, Debug)]
pub enum Error {
    /// Local validation rejected the input.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The auth provider rejected the request.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// A backend write failed or timed out.
    #[error("write failed: {0}")]
    Write(String),

    /// A backend read or subscription failed or timed out.
    #[error("read failed: {0}")]
    Read(String),

    /// The same action is already in flight.
    #[error("action already in progress")]
    Busy,

    /// The action requires a signed-in user.
    #[error("no authenticated user")]
    NotAuthenticated,

    /// JSON serialization or deserialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The data source has been closed.
    #[error("data source closed")]
    Closed,
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;
