//! Patty's GitHub access core.
//!
//! Patty is a chat bot that watches channel messages for pull request links
//! and keeps a current summary of their status. This crate is the remote
//! half of that system: an authenticated GitHub REST client that paces
//! itself against the provider's rate limit, retries transient failures
//! with exponential backoff, and memoizes repeated lookups so a busy
//! channel does not burn quota. The bot layers (message scanning, the
//! datastore, rendering, scheduling) live elsewhere and consume the
//! [`PullRequestSource`] trait.

pub mod config;
pub mod github;

pub use config::PattyConfig;
pub use github::{
    ClientOptions, FailureKind, GithubClient, GithubError, ListParams, PageInfo,
    PersonalAccessToken, PullRequest, PullRequestLocator, PullRequestPage, PullRequestSource,
    PullRequestState, RateLimitSnapshot, RepositoryLocator, RetryPolicy, StateFilter,
};
