//! Error types for GitLab client operations.
//!
//! This module defines the error types that can occur when interacting with the GitLab REST
//! API through the gitlab_client crate. The variants are coarse on purpose: callers decide
//! between "fatal" and "skip this repository" based on where the call was made, not on the
//! exact failure.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitLab client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use gitlab_client::Error;
///
/// match client.get_slack_service(42).await {
///     Ok(service) => println!("Slack active: {}", service.active),
///     Err(Error::NotFound) => println!("Slack integration not configured"),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The GitLab API answered with an unexpected status code.
    ///
    /// The message holds whatever GitLab put in the `message` or `error` field of the
    /// response body, or the raw body if it could not be parsed.
    #[error("API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    /// The API token was rejected, or the token lacks the scope for the call.
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Error deserializing the response from GitLab.
    #[error("Failed to deserialize GitLab response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The configured base URL could not be used to build request URLs.
    #[error("Invalid GitLab URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The GitLab API returned a response in an unexpected format.
    #[error("Invalid response format")]
    InvalidResponse,

    /// The requested resource was not found.
    ///
    /// GitLab also answers 404 when the token cannot see the resource at all.
    #[error("Resource not found")]
    NotFound,

    /// GitLab API rate limit has been exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The request never produced a response (DNS, TLS, connection reset, timeout).
    #[error("Transport failure: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            return Error::InvalidResponse;
        }

        if let Some(status) = value.status() {
            return Error::ApiError {
                status: status.as_u16(),
                message: value.to_string(),
            };
        }

        Error::Transport(value.to_string())
    }
}
