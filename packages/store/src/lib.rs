#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Bounded, newest-first in-memory buffer of recent incidents.
//!
//! Shared between a single writer (the feed poller) and any number of
//! concurrent readers (request handlers). Readers take a cloned snapshot
//! under a read lock, so a merge never exposes a partially-updated buffer.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use dispatch_map_incident_models::{Incident, IncidentId};

/// Bounded incident buffer, newest first.
///
/// Constructed once at startup and shared via `Arc`. The only mutation is
/// [`merge`](Self::merge), called from the poll cycle; everything else is
/// read-only.
pub struct IncidentStore {
    max_incidents: usize,
    incidents: RwLock<Vec<Incident>>,
}

impl IncidentStore {
    /// Creates an empty store that retains at most `max_incidents` entries.
    #[must_use]
    pub const fn new(max_incidents: usize) -> Self {
        Self {
            max_incidents,
            incidents: RwLock::new(Vec::new()),
        }
    }

    /// Prepends `new_incidents` (preserving their order) and trims the
    /// oldest entries beyond the retention limit.
    ///
    /// Runs in a single write-lock critical section: concurrent readers see
    /// either the full pre-merge or the full post-merge contents.
    pub fn merge(&self, new_incidents: Vec<Incident>) {
        let mut incidents = self
            .incidents
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        incidents.splice(0..0, new_incidents);
        if incidents.len() > self.max_incidents {
            log::debug!(
                "Trimming incident buffer from {} to {}",
                incidents.len(),
                self.max_incidents
            );
            incidents.truncate(self.max_incidents);
        }
    }

    /// Maximum number of incidents this store retains.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.max_incidents
    }

    /// Returns a snapshot of the current contents, newest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Incident> {
        self.incidents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the identity set of the current contents.
    ///
    /// Recomputed from the buffer on every call, so an identity that has
    /// been trimmed out of the retention window no longer counts as seen.
    #[must_use]
    pub fn identities(&self) -> HashSet<IncidentId> {
        self.incidents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|incident| incident.id.clone())
            .collect()
    }

    /// Number of incidents currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.incidents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_map_incident_models::Attributes;

    fn incident(id: &str) -> Incident {
        Incident {
            id: IncidentId::new(id),
            latitude: 52.1,
            longitude: 4.3,
            attributes: Attributes::new(),
        }
    }

    #[test]
    fn merge_prepends_newest_first() {
        let store = IncidentStore::new(10);
        store.merge(vec![incident("a")]);
        store.merge(vec![incident("b"), incident("c")]);

        let ids: Vec<String> = store
            .snapshot()
            .iter()
            .map(|i| i.id.as_str().to_string())
            .collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn merge_trims_oldest_beyond_limit() {
        let store = IncidentStore::new(3);
        store.merge(vec![incident("a"), incident("b")]);
        store.merge(vec![incident("c"), incident("d")]);

        let ids: Vec<String> = store
            .snapshot()
            .iter()
            .map(|i| i.id.as_str().to_string())
            .collect();
        assert_eq!(ids, ["c", "d", "a"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn oversized_batch_keeps_its_newest_prefix() {
        let store = IncidentStore::new(2);
        store.merge(vec![incident("a"), incident("b"), incident("c")]);

        let ids: Vec<String> = store
            .snapshot()
            .iter()
            .map(|i| i.id.as_str().to_string())
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn merge_empty_batch_is_a_noop() {
        let store = IncidentStore::new(3);
        store.merge(vec![incident("a")]);
        store.merge(Vec::new());

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn size_never_exceeds_limit() {
        let store = IncidentStore::new(5);
        for batch in 0..4 {
            let incidents = (0..3)
                .map(|i| incident(&format!("{batch}-{i}")))
                .collect();
            store.merge(incidents);
            assert!(store.len() <= 5);
        }
    }

    #[test]
    fn identities_reflect_current_contents_only() {
        let store = IncidentStore::new(2);
        store.merge(vec![incident("a"), incident("b")]);
        store.merge(vec![incident("c")]);

        let ids = store.identities();
        assert!(ids.contains(&IncidentId::new("c")));
        assert!(ids.contains(&IncidentId::new("a")));
        // "b" was trimmed out of the window, so it is no longer seen.
        assert!(!ids.contains(&IncidentId::new("b")));
    }

    #[test]
    fn snapshot_is_isolated_from_later_merges() {
        let store = IncidentStore::new(10);
        store.merge(vec![incident("a")]);

        let snapshot = store.snapshot();
        store.merge(vec![incident("b")]);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }
}
