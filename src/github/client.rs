//! Public client facade for pull request status lookups.
//!
//! Every read operation runs the same orchestration: consult the cache,
//! honour a pending quota reset, hand the attempt to the executor, and loop
//! through the retry policy until the request succeeds or the policy gives
//! up. The facade is the only entry point the bot layers use.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use url::Url;

use super::cache::{CachedOutcome, ResourceCache};
use super::error::{ApiFailure, FailureKind, GithubError};
use super::executor::{ApiRequest, ApiResponse, RequestExecutor, ResponseBody};
use super::locator::{PersonalAccessToken, PullRequestLocator, RepositoryLocator};
use super::models::{ApiPullRequest, PullRequest};
use super::pagination::{DEFAULT_PER_PAGE, ListParams, MAX_PER_PAGE, PageInfo, parse_link_header};
use super::rate_limit::{RateLimitSnapshot, RateLimitTracker};
use super::retry::RetryPolicy;

/// Default base endpoint for the public GitHub REST API.
pub(crate) const DEFAULT_API_BASE: &str = "https://api.github.com/";

/// Default client identification sent as the user agent.
pub(crate) const DEFAULT_USER_AGENT: &str = "patty-pr-minder";

/// Immutable settings for one client instance.
///
/// Options are fixed at construction; a client never re-reads its
/// configuration, and the environment is consulted only by the assembly in
/// [`crate::config::PattyConfig`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Credential for the provider API. `None` is a valid initial state in
    /// which every request fails fast with [`GithubError::MissingToken`].
    pub token: Option<PersonalAccessToken>,
    /// Base endpoint for the provider REST API.
    pub api_base: Url,
    /// Client identification string sent as the user agent.
    pub user_agent: String,
    /// Hard per-attempt timeout.
    pub timeout: Duration,
    /// Whether single-resource lookups are memoized.
    pub cache_enabled: bool,
    /// Lifetime of memoized lookups.
    pub cache_ttl: Duration,
    /// Backoff policy for transient failures.
    pub retry: RetryPolicy,
}

/// One page of pull requests for a repository.
#[derive(Debug, Clone)]
pub struct PullRequestPage {
    /// Pull requests on this page.
    pub items: Vec<PullRequest>,
    /// Pagination state.
    pub page_info: PageInfo,
}

/// Source of pull request status data consumed by the bot layers.
///
/// The trait-based seam lets the message-handling and refresh layers mock
/// the provider in their own tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Fetches one pull request.
    ///
    /// Returns `Ok(None)` exactly when the provider reports the resource as
    /// not found; callers treat that as "skip silently".
    ///
    /// # Errors
    ///
    /// Propagates any other failure kind once the retry policy gives up.
    async fn fetch_pull_request(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<Option<PullRequest>, GithubError>;

    /// Lists pull requests with a lifecycle filter and pagination.
    ///
    /// List results are never memoized.
    ///
    /// # Errors
    ///
    /// Returns an `UnprocessableInput` failure for zero page parameters and
    /// propagates remote failures once the retry policy gives up.
    async fn list_pull_requests(
        &self,
        locator: &RepositoryLocator,
        params: &ListParams,
    ) -> Result<PullRequestPage, GithubError>;

    /// Performs a lightweight authenticated call against the identity
    /// endpoint.
    ///
    /// Returns `Ok(false)` exactly when the credential is rejected.
    ///
    /// # Errors
    ///
    /// Propagates any failure kind other than `Unauthorized`.
    async fn validate_credential(&self) -> Result<bool, GithubError>;
}

/// Client facade over the GitHub REST API.
pub struct GithubClient {
    executor: RequestExecutor,
    tracker: Arc<RateLimitTracker>,
    cache: Option<ResourceCache>,
    retry: RetryPolicy,
}

impl GithubClient {
    /// Builds a client from explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Configuration`] when the HTTP client cannot
    /// be constructed from the options.
    pub fn new(options: &ClientOptions) -> Result<Self, GithubError> {
        let tracker = Arc::new(RateLimitTracker::default());
        let executor = RequestExecutor::new(options, Arc::clone(&tracker))?;
        let cache = options
            .cache_enabled
            .then(|| ResourceCache::new(options.cache_ttl));
        Ok(Self {
            executor,
            tracker,
            cache,
            retry: options.retry,
        })
    }

    /// Latest observed quota state, `None` until a response has carried
    /// quota headers.
    #[must_use]
    pub fn rate_limit_snapshot(&self) -> Option<RateLimitSnapshot> {
        self.tracker.snapshot()
    }

    /// Runs one logical request through the quota wait and retry loop.
    async fn send_with_retries(&self, request: ApiRequest) -> Result<ApiResponse, GithubError> {
        if let Some(wait) = RetryPolicy::reset_wait(self.tracker.snapshot()) {
            tracing::debug!(
                wait_secs = wait.as_secs(),
                "quota exhausted, waiting for reset before first attempt"
            );
            sleep(wait).await;
        }

        let mut attempt: u32 = 1;
        loop {
            match self.executor.execute(&request).await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    let Some(delay) =
                        self.retry
                            .next_delay(attempt, &error, self.tracker.snapshot())
                    else {
                        return Err(error);
                    };
                    tracing::debug!(attempt, ?delay, %error, "retrying request");
                    sleep(delay).await;
                    attempt = attempt.saturating_add(1);
                }
            }
        }
    }

    fn store(&self, key: String, outcome: CachedOutcome) {
        if let Some(cache) = &self.cache {
            cache.put(key, outcome);
        }
    }
}

#[async_trait]
impl PullRequestSource for GithubClient {
    async fn fetch_pull_request(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<Option<PullRequest>, GithubError> {
        let key = locator.cache_key();
        if let Some(cached) = self.cache.as_ref().and_then(|cache| cache.get(&key)) {
            tracing::debug!(key = %key, "serving pull request from cache");
            return Ok(cached.into_pull_request());
        }

        match self
            .send_with_retries(ApiRequest::get(locator.pull_request_path()))
            .await
        {
            Ok(response) => {
                let resource = decode_pull_request(response.body)?;
                self.store(key, CachedOutcome::Found(resource.clone()));
                Ok(Some(resource))
            }
            Err(error) if error.failure_kind() == Some(FailureKind::NotFound) => {
                self.store(key, CachedOutcome::NotFound);
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    async fn list_pull_requests(
        &self,
        locator: &RepositoryLocator,
        params: &ListParams,
    ) -> Result<PullRequestPage, GithubError> {
        let state = params.state.unwrap_or_default();
        let page = params.page.unwrap_or(1);
        let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if page == 0 {
            return Err(GithubError::api(ApiFailure::invalid_input(
                "page must be at least 1",
            )));
        }
        if per_page == 0 {
            return Err(GithubError::api(ApiFailure::invalid_input(
                "per_page must be at least 1",
            )));
        }
        let clamped = per_page.min(MAX_PER_PAGE);

        let query = vec![
            ("state".to_owned(), state.as_str().to_owned()),
            ("page".to_owned(), page.to_string()),
            ("per_page".to_owned(), clamped.to_string()),
        ];
        let response = self
            .send_with_retries(ApiRequest::get(locator.pulls_path()).with_query(query))
            .await?;

        let relations = response
            .headers
            .get(http::header::LINK)
            .and_then(|value| value.to_str().ok())
            .map(parse_link_header)
            .unwrap_or_default();

        let items = decode_pull_request_list(response.body)?;
        Ok(PullRequestPage {
            items,
            page_info: PageInfo::from_relations(page, clamped, relations),
        })
    }

    async fn validate_credential(&self) -> Result<bool, GithubError> {
        match self.send_with_retries(ApiRequest::get("user".to_owned())).await {
            Ok(_) => Ok(true),
            Err(error) if error.failure_kind() == Some(FailureKind::Unauthorized) => Ok(false),
            Err(error) => Err(error),
        }
    }
}

fn decode_pull_request(body: ResponseBody) -> Result<PullRequest, GithubError> {
    let ResponseBody::Json(value) = body else {
        return Err(decode_failure("pull request response was not JSON"));
    };
    serde_json::from_value::<ApiPullRequest>(value)
        .map(PullRequest::from)
        .map_err(|error| decode_failure(&format!("pull request deserialisation failed: {error}")))
}

fn decode_pull_request_list(body: ResponseBody) -> Result<Vec<PullRequest>, GithubError> {
    let ResponseBody::Json(value) = body else {
        return Err(decode_failure("pull request list response was not JSON"));
    };
    serde_json::from_value::<Vec<ApiPullRequest>>(value)
        .map(|items| items.into_iter().map(PullRequest::from).collect())
        .map_err(|error| {
            decode_failure(&format!(
                "pull request list deserialisation failed: {error}"
            ))
        })
}

fn decode_failure(message: &str) -> GithubError {
    GithubError::api(ApiFailure {
        kind: FailureKind::Generic,
        status: None,
        status_text: "invalid response".to_owned(),
        message: message.to_owned(),
        documentation_url: None,
        body: None,
    })
}
