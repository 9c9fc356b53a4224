//! Error taxonomy for the DevCollab client.
//!
//! Display strings double as the user-facing copy shown by the UI, so the
//! variants with a fixed mapping keep a stable message no matter what the
//! server put in the body.

use reqwest::StatusCode;

/// The error type for every fallible operation in this crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A single attempt exceeded the per-attempt deadline. Never retried.
    #[error("Request timed out. Please check your connection and try again.")]
    Timeout,
    /// Transport-level failure that survived every retry.
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unauthorized. Please log in again.")]
    Unauthorized,
    #[error("Access denied. You don't have permission for this action.")]
    Forbidden,
    #[error("Resource not found.")]
    NotFound,
    #[error("Too many requests. Please wait a moment and try again.")]
    RateLimited,
    #[error("Server error. Please try again later.")]
    ServerError,
    #[error("Service temporarily unavailable. Please try again later.")]
    ServiceUnavailable,
    /// Success status paired with a body that does not decode as the
    /// expected payload.
    #[error("Invalid response format from server")]
    InvalidResponseFormat,
    /// No credential in the store. Raised locally, before any network call.
    #[error("No authentication token found")]
    NoToken,
    /// Any other non-success status, carrying the server-provided message
    /// when the body had one.
    #[error("{0}")]
    Response(String),
    #[error("credential store error: {0}")]
    Store(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Maps a non-success HTTP status to its error kind.
    ///
    /// The six statuses with fixed user-facing copy ignore `message`;
    /// everything else surfaces the server text through [`Error::Response`].
    pub(crate) fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            StatusCode::INTERNAL_SERVER_ERROR => Self::ServerError,
            StatusCode::SERVICE_UNAVAILABLE => Self::ServiceUnavailable,
            _ => Self::Response(message),
        }
    }
}
