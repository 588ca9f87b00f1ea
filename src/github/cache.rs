//! Short-lived memoization of pull request lookups.
//!
//! Repeated lookups of the same pull request inside a chat channel are
//! common (several messages linking one PR, periodic refreshes), so resolved
//! outcomes are held for a short TTL to conserve quota. Entries expire
//! lazily on lookup; there is no background sweep.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::models::PullRequest;

/// Outcome of a resolved lookup, cacheable for the configured TTL.
///
/// Not-found is a terminal answer: the resource is missing or inaccessible,
/// and repeating the remote lookup before the TTL lapses would waste quota
/// without changing the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedOutcome {
    /// The resource exists and deserialized successfully.
    Found(PullRequest),
    /// The provider reported the resource as not found.
    NotFound,
}

impl CachedOutcome {
    /// Converts the outcome into the facade's return shape.
    #[must_use]
    pub fn into_pull_request(self) -> Option<PullRequest> {
        match self {
            Self::Found(resource) => Some(resource),
            Self::NotFound => None,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    outcome: CachedOutcome,
    expires_at: Instant,
}

/// In-memory TTL cache keyed by the composite resource identity.
#[derive(Debug)]
pub struct ResourceCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResourceCache {
    /// Creates an empty cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the cached outcome for `key` when present and not expired.
    ///
    /// An expired entry is dropped on the way out.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<CachedOutcome> {
        let mut entries = self.lock();
        let hit = entries
            .get(key)
            .and_then(|entry| (entry.expires_at > Instant::now()).then(|| entry.outcome.clone()));
        if hit.is_none() {
            entries.remove(key);
        }
        hit
    }

    /// Stores `outcome` under `key`, replacing any previous entry.
    pub fn put(&self, key: String, outcome: CachedOutcome) {
        let entry = CacheEntry {
            outcome,
            expires_at: Instant::now() + self.ttl,
        };
        self.lock().insert(key, entry);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::super::models::{PullRequest, PullRequestState};
    use super::{CachedOutcome, ResourceCache};

    fn sample_pull_request(number: u64) -> PullRequest {
        PullRequest {
            number,
            title: Some("demo".to_owned()),
            state: PullRequestState::Open,
            draft: false,
            html_url: None,
            author: Some("octocat".to_owned()),
            created_at: None,
            updated_at: None,
            mergeable_state: None,
        }
    }

    #[test]
    fn returns_stored_outcome_before_expiry() {
        let cache = ResourceCache::new(Duration::from_secs(60));
        cache.put(
            "octo/repo#4".to_owned(),
            CachedOutcome::Found(sample_pull_request(4)),
        );

        let hit = cache.get("octo/repo#4").expect("entry should be live");
        assert_eq!(hit, CachedOutcome::Found(sample_pull_request(4)));
    }

    #[test]
    fn caches_not_found_as_a_terminal_answer() {
        let cache = ResourceCache::new(Duration::from_secs(60));
        cache.put("octo/repo#999".to_owned(), CachedOutcome::NotFound);

        let hit = cache.get("octo/repo#999").expect("entry should be live");
        assert_eq!(hit.into_pull_request(), None);
    }

    #[test]
    fn expired_entries_miss_and_are_dropped() {
        let cache = ResourceCache::new(Duration::from_millis(10));
        cache.put(
            "octo/repo#4".to_owned(),
            CachedOutcome::Found(sample_pull_request(4)),
        );

        thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.get("octo/repo#4"), None);
    }

    #[test]
    fn put_overwrites_the_previous_entry() {
        let cache = ResourceCache::new(Duration::from_secs(60));
        cache.put("octo/repo#4".to_owned(), CachedOutcome::NotFound);
        cache.put(
            "octo/repo#4".to_owned(),
            CachedOutcome::Found(sample_pull_request(4)),
        );

        let hit = cache.get("octo/repo#4").expect("entry should be live");
        assert_eq!(hit, CachedOutcome::Found(sample_pull_request(4)));
    }

    #[test]
    fn unknown_keys_miss() {
        let cache = ResourceCache::new(Duration::from_secs(60));
        assert_eq!(cache.get("octo/repo#1"), None);
    }
}
