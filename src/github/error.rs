//! Error types exposed by the GitHub status client.

use std::time::Duration;

use thiserror::Error;

/// Failure categories driving retry and propagation decisions.
///
/// The set is closed: every classified failure carries exactly one kind, and
/// both the retry engine and the bot layers match on it rather than on error
/// subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The credential was rejected (HTTP 401).
    Unauthorized,
    /// Access was denied (HTTP 403), either a permission problem or an
    /// exhausted quota window.
    Forbidden,
    /// The resource does not exist or is not visible (HTTP 404).
    NotFound,
    /// The input was rejected, remotely (HTTP 422) or by local validation
    /// before any request was issued.
    UnprocessableInput,
    /// The provider failed (HTTP 5xx).
    ServerError,
    /// No response arrived within the configured per-attempt timeout.
    Timeout,
    /// Any other unexpected response status.
    Generic,
}

/// A classified failure for a single request attempt.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("GitHub request failed ({status_text}): {message}")]
pub struct ApiFailure {
    /// Failure category consulted by the retry engine.
    pub kind: FailureKind,
    /// HTTP status code, absent for timeouts and locally rejected input.
    pub status: Option<u16>,
    /// Canonical status text, or a synthetic label for failures that never
    /// produced a response.
    pub status_text: String,
    /// Human-readable message, extracted from the response body when present.
    pub message: String,
    /// Documentation link included in the provider's error body, if any.
    pub documentation_url: Option<String>,
    /// Raw response body when it parsed as JSON.
    pub body: Option<serde_json::Value>,
}

impl ApiFailure {
    /// Builds a failure for input rejected before any request was issued.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::UnprocessableInput,
            status: None,
            status_text: "invalid input".to_owned(),
            message: message.into(),
            documentation_url: None,
            body: None,
        }
    }

    /// Builds a failure for an attempt aborted by the request timeout.
    #[must_use]
    pub fn timeout(limit: Duration) -> Self {
        Self {
            kind: FailureKind::Timeout,
            status: None,
            status_text: "timeout".to_owned(),
            message: format!("no response within {}ms", limit.as_millis()),
            documentation_url: None,
            body: None,
        }
    }
}

/// Errors surfaced by the GitHub status client.
///
/// Classified response failures travel as [`ApiFailure`] payloads; the
/// remaining variants cover states that never produced a classifiable
/// response.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GithubError {
    /// No personal access token has been supplied yet.
    #[error("personal access token is required")]
    MissingToken,

    /// Client construction or configuration failed.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// GitHub answered with a response classified as a failure.
    #[error(transparent)]
    Api(Box<ApiFailure>),

    /// Transport failed before any response could be classified.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },
}

impl GithubError {
    /// Wraps a classified failure.
    #[must_use]
    pub fn api(failure: ApiFailure) -> Self {
        Self::Api(Box::new(failure))
    }

    /// Returns the failure category for classified failures, `None` for
    /// local and transport errors.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Api(failure) => Some(failure.kind),
            Self::MissingToken | Self::Configuration { .. } | Self::Network { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiFailure, FailureKind, GithubError};

    #[test]
    fn invalid_input_failures_carry_no_status() {
        let failure = ApiFailure::invalid_input("owner must not be empty");
        assert_eq!(failure.kind, FailureKind::UnprocessableInput);
        assert_eq!(failure.status, None);
        assert_eq!(failure.message, "owner must not be empty");
    }

    #[test]
    fn failure_kind_is_exposed_only_for_classified_failures() {
        let classified = GithubError::api(ApiFailure::invalid_input("bad"));
        assert_eq!(
            classified.failure_kind(),
            Some(FailureKind::UnprocessableInput)
        );

        let transport = GithubError::Network {
            message: "connection refused".to_owned(),
        };
        assert_eq!(transport.failure_kind(), None);
    }
}
