//! Single-attempt request execution and response classification.
//!
//! The executor performs exactly one network call per invocation: it builds
//! the endpoint URL against the configured base, attaches the credential,
//! media-type, and client-identification headers, enforces the per-attempt
//! timeout, and classifies the outcome. Retrying is the facade's concern.

use std::sync::Arc;
use std::time::Duration;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use url::Url;

use super::client::ClientOptions;
use super::error::{ApiFailure, FailureKind, GithubError};
use super::locator::PersonalAccessToken;
use super::rate_limit::RateLimitTracker;

/// Media type pinning responses to the structured JSON variant.
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// One API request to be attempted by the executor.
#[derive(Debug, Clone)]
pub(super) struct ApiRequest {
    pub(super) method: Method,
    /// Path relative to the configured base endpoint.
    pub(super) path: String,
    pub(super) query: Vec<(String, String)>,
    pub(super) body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub(super) fn get(path: String) -> Self {
        Self {
            method: Method::GET,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    pub(super) fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

/// Parsed body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum ResponseBody {
    /// The content type declared JSON and the payload parsed.
    Json(serde_json::Value),
    /// A non-JSON payload, returned verbatim.
    Text(String),
    /// The provider signalled no content.
    Empty,
}

/// A successful (2xx) response with its metadata.
#[derive(Debug, Clone)]
pub(super) struct ApiResponse {
    pub(super) headers: HeaderMap,
    pub(super) body: ResponseBody,
}

/// Performs one network attempt per call and classifies the outcome.
pub(super) struct RequestExecutor {
    http: reqwest::Client,
    api_base: Url,
    token: Option<PersonalAccessToken>,
    timeout: Duration,
    tracker: Arc<RateLimitTracker>,
}

impl RequestExecutor {
    /// Builds an executor from client options, sharing the quota tracker.
    pub(super) fn new(
        options: &ClientOptions,
        tracker: Arc<RateLimitTracker>,
    ) -> Result<Self, GithubError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));

        let http = reqwest::Client::builder()
            .user_agent(options.user_agent.clone())
            .default_headers(default_headers)
            .build()
            .map_err(|error| GithubError::Configuration {
                message: format!("failed to build HTTP client: {error}"),
            })?;

        Ok(Self {
            http,
            api_base: normalized_base(&options.api_base),
            token: options.token.clone(),
            timeout: options.timeout,
            tracker,
        })
    }

    /// Issues the request and classifies the response.
    ///
    /// Quota headers are fed to the tracker for every response, success or
    /// failure, before any status classification happens.
    pub(super) async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, GithubError> {
        let token = self.token.as_ref().ok_or(GithubError::MissingToken)?;
        let url = self.endpoint(&request.path)?;

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(AUTHORIZATION, format!("token {}", token.value()))
            .timeout(self.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|error| self.classify_transport(&error))?;

        self.tracker.observe(response.headers());

        let status = response.status();
        tracing::debug!(status = %status, path = %request.path, "GitHub response received");
        if status.is_success() {
            return self.read_success(response).await;
        }
        Err(classify_failure(response).await)
    }

    fn endpoint(&self, path: &str) -> Result<Url, GithubError> {
        self.api_base
            .join(path)
            .map_err(|error| GithubError::Configuration {
                message: format!("invalid request path {path}: {error}"),
            })
    }

    fn classify_transport(&self, error: &reqwest::Error) -> GithubError {
        if error.is_timeout() {
            return GithubError::api(ApiFailure::timeout(self.timeout));
        }
        GithubError::Network {
            message: format!("request failed: {error}"),
        }
    }

    async fn read_success(&self, response: reqwest::Response) -> Result<ApiResponse, GithubError> {
        let status = response.status();
        let headers = response.headers().clone();
        if status == StatusCode::NO_CONTENT {
            return Ok(ApiResponse {
                headers,
                body: ResponseBody::Empty,
            });
        }

        let json_declared = declares_json(&headers);
        let text = response
            .text()
            .await
            .map_err(|error| self.classify_transport(&error))?;

        let body = if json_declared {
            serde_json::from_str(&text)
                .map(ResponseBody::Json)
                .map_err(|error| {
                    GithubError::api(ApiFailure {
                        kind: FailureKind::Generic,
                        status: Some(status.as_u16()),
                        status_text: status_label(status),
                        message: format!("response decode failed: {error}"),
                        documentation_url: None,
                        body: None,
                    })
                })?
        } else {
            ResponseBody::Text(text)
        };

        Ok(ApiResponse { headers, body })
    }
}

/// Maps a failure status to its retry/propagation category.
fn classify_status(status: StatusCode) -> FailureKind {
    match status {
        StatusCode::UNAUTHORIZED => FailureKind::Unauthorized,
        StatusCode::FORBIDDEN => FailureKind::Forbidden,
        StatusCode::NOT_FOUND => FailureKind::NotFound,
        StatusCode::UNPROCESSABLE_ENTITY => FailureKind::UnprocessableInput,
        _ if status.is_server_error() => FailureKind::ServerError,
        _ => FailureKind::Generic,
    }
}

fn status_label(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("unknown status")
        .to_owned()
}

/// Builds the typed failure for a non-2xx response.
///
/// The body is read best-effort: a payload that fails to parse as JSON
/// yields a `None` body rather than an error, and the human-readable
/// message falls back to the raw text.
async fn classify_failure(response: reqwest::Response) -> GithubError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let parsed: Option<serde_json::Value> = serde_json::from_str(&text).ok();

    let message = parsed
        .as_ref()
        .and_then(|value| value.get("message"))
        .and_then(serde_json::Value::as_str)
        .map_or_else(
            || {
                if text.is_empty() {
                    "unknown error".to_owned()
                } else {
                    text.clone()
                }
            },
            ToOwned::to_owned,
        );
    let documentation_url = parsed
        .as_ref()
        .and_then(|value| value.get("documentation_url"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned);

    GithubError::api(ApiFailure {
        kind: classify_status(status),
        status: Some(status.as_u16()),
        status_text: status_label(status),
        message,
        documentation_url,
        body: parsed,
    })
}

fn declares_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("json"))
}

fn normalized_base(base: &Url) -> Url {
    // Url::join drops the final path segment of a base without a trailing
    // slash, which would break enterprise bases like `/api/v3`.
    let mut normalized = base.clone();
    if !normalized.path().ends_with('/') {
        normalized.set_path(&format!("{}/", normalized.path()));
    }
    normalized
}
