//! Data models for pull request resources returned by the provider.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestState {
    /// The pull request is open.
    Open,
    /// The pull request is closed (including merged).
    Closed,
}

impl PullRequestState {
    /// Returns the API string for this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    fn from_api(value: Option<&str>) -> Self {
        match value {
            Some("open") => Self::Open,
            _ => Self::Closed,
        }
    }
}

/// Mergeability of a pull request as last computed by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeableState {
    /// The provider has not (re)computed mergeability yet, or reported a
    /// state outside the known set.
    Unknown,
    /// The branch merges cleanly.
    Clean,
    /// The branch conflicts with its base.
    Dirty,
    /// The branch merges but required checks are failing or pending.
    Unstable,
}

impl MergeableState {
    fn from_api(value: &str) -> Self {
        match value {
            "clean" => Self::Clean,
            "dirty" => Self::Dirty,
            "unstable" => Self::Unstable,
            _ => Self::Unknown,
        }
    }
}

/// A point-in-time snapshot of a pull request.
///
/// A fresh fetch produces a new value which may replace a cached one;
/// snapshots are never updated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Pull request number.
    pub number: u64,
    /// Title of the pull request.
    pub title: Option<String>,
    /// Lifecycle state.
    pub state: PullRequestState,
    /// Whether the pull request is a draft.
    pub draft: bool,
    /// HTML URL for displaying to a user.
    pub html_url: Option<String>,
    /// Author login if present.
    pub author: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Mergeability, absent in list responses where the provider omits it.
    pub mergeable_state: Option<MergeableState>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequest {
    pub(super) number: u64,
    pub(super) title: Option<String>,
    pub(super) state: Option<String>,
    #[serde(default)]
    pub(super) draft: bool,
    pub(super) html_url: Option<String>,
    pub(super) user: Option<ApiUser>,
    pub(super) created_at: Option<DateTime<Utc>>,
    pub(super) updated_at: Option<DateTime<Utc>>,
    pub(super) mergeable_state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiUser {
    pub(super) login: Option<String>,
}

impl From<ApiPullRequest> for PullRequest {
    fn from(value: ApiPullRequest) -> Self {
        Self {
            number: value.number,
            title: value.title,
            state: PullRequestState::from_api(value.state.as_deref()),
            draft: value.draft,
            html_url: value.html_url,
            author: value.user.and_then(|user| user.login),
            created_at: value.created_at,
            updated_at: value.updated_at,
            mergeable_state: value
                .mergeable_state
                .as_deref()
                .map(MergeableState::from_api),
        }
    }
}
