//! GitHub API access layer: request execution, quota tracking, caching,
//! and retries.
//!
//! This module is the remote half of the PR minder: the bot layers hand it
//! validated locators and get back typed pull request snapshots or a
//! classified failure. It paces itself against the provider's rate limit,
//! retries transient faults with exponential backoff, and memoizes repeated
//! lookups for a short TTL.

pub mod cache;
pub mod client;
pub mod error;
mod executor;
pub mod locator;
pub mod models;
pub mod pagination;
pub mod rate_limit;
pub mod retry;

pub use cache::{CachedOutcome, ResourceCache};
pub use client::{ClientOptions, GithubClient, PullRequestPage, PullRequestSource};
pub use error::{ApiFailure, FailureKind, GithubError};
pub use locator::{
    PersonalAccessToken, PullRequestLocator, PullRequestNumber, RepositoryLocator, RepositoryName,
    RepositoryOwner,
};
pub use models::{MergeableState, PullRequest, PullRequestState};
pub use pagination::{ListParams, PageInfo, StateFilter};
pub use rate_limit::{RateLimitSnapshot, RateLimitTracker};
pub use retry::RetryPolicy;

#[cfg(test)]
pub use client::MockPullRequestSource;

#[cfg(test)]
mod tests;
