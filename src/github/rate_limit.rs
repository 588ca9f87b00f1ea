//! Quota state parsed from GitHub API response headers.
//!
//! GitHub reports the authenticated credential's quota window through the
//! `x-ratelimit-limit`, `x-ratelimit-remaining`, `x-ratelimit-reset`, and
//! `x-ratelimit-used` headers on every response. The tracker keeps the most
//! recently observed snapshot so the retry engine can pace requests and
//! callers can inspect their remaining budget.

use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use http::HeaderMap;

/// The most recently observed quota state for a credential.
///
/// # Example
///
/// ```
/// use patty::github::rate_limit::RateLimitSnapshot;
///
/// let snapshot = RateLimitSnapshot::new(5000, 4999, 1_700_000_000, 1);
/// assert!(!snapshot.is_exhausted());
/// assert_eq!(snapshot.remaining(), 4999);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    /// Maximum requests allowed in the current window.
    limit: u32,
    /// Remaining requests in the current window.
    remaining: u32,
    /// Unix timestamp when the window resets.
    reset_at: u64,
    /// Requests already spent in the current window.
    used: u32,
}

impl RateLimitSnapshot {
    /// Creates a snapshot from explicit values.
    #[must_use]
    pub const fn new(limit: u32, remaining: u32, reset_at: u64, used: u32) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
            used,
        }
    }

    /// Parses the quota headers from a response.
    ///
    /// Returns `None` when any of limit, remaining, or reset is missing or
    /// non-numeric; a partial update would corrupt the snapshot, so the
    /// caller keeps the stale one instead. `used` defaults to
    /// `limit - remaining` when the provider omits it.
    pub(crate) fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limit = header_number::<u32>(headers, "x-ratelimit-limit")?;
        let remaining = header_number::<u32>(headers, "x-ratelimit-remaining")?;
        let reset_at = header_number::<u64>(headers, "x-ratelimit-reset")?;
        let used = header_number::<u32>(headers, "x-ratelimit-used")
            .unwrap_or_else(|| limit.saturating_sub(remaining));
        Some(Self::new(limit, remaining, reset_at, used))
    }

    /// Maximum requests allowed in the current window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Remaining requests in the current window.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Unix timestamp when the window resets.
    #[must_use]
    pub const fn reset_at(&self) -> u64 {
        self.reset_at
    }

    /// Requests already spent in the current window.
    #[must_use]
    pub const fn used(&self) -> u32 {
        self.used
    }

    /// Returns true when no requests remain in the current window.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Seconds until the window resets, zero when the reset has passed or
    /// the system clock cannot be read.
    #[must_use]
    pub fn seconds_until_reset(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or(0);

        self.reset_at.saturating_sub(now)
    }
}

fn header_number<T: FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}

/// Holds the latest quota snapshot for one client instance.
///
/// Shared by every request the client issues: each response overwrites the
/// snapshot, and concurrent callers read whichever observation landed last.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    current: Mutex<Option<RateLimitSnapshot>>,
}

impl RateLimitTracker {
    /// Records the snapshot carried by a response.
    ///
    /// A response without complete quota headers leaves the previous
    /// snapshot in place.
    pub(crate) fn observe(&self, headers: &HeaderMap) {
        if let Some(snapshot) = RateLimitSnapshot::from_headers(headers) {
            *self.lock() = Some(snapshot);
        }
    }

    /// Latest observed quota state, `None` until a response has carried
    /// quota headers.
    #[must_use]
    pub fn snapshot(&self) -> Option<RateLimitSnapshot> {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, Option<RateLimitSnapshot>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
