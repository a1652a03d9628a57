//! Recurring background fetch of the dispatch feed.
//!
//! One poller instance is spawned at startup and owns the write side of the
//! incident store. A poll cycle fetches the feed, normalizes and
//! deduplicates the records, and merges the admitted batch. Any cycle
//! failure is logged and retried on the next interval; the loop itself
//! never terminates on an error.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dispatch_map_incident_models::{Incident, IncidentId};
use dispatch_map_store::IncidentStore;
use serde_json::Value;
use tokio::sync::watch;

use crate::{FeedError, normalize};

/// Request timeout for a single feed fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Background poller for the dispatch feed.
pub struct FeedPoller {
    client: reqwest::Client,
    feed_url: String,
    interval: Duration,
    store: Arc<IncidentStore>,
}

impl FeedPoller {
    /// Creates a poller for `feed_url` that merges into `store` every
    /// `interval`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] if the HTTP client cannot be constructed.
    pub fn new(
        feed_url: impl Into<String>,
        interval: Duration,
        store: Arc<IncidentStore>,
    ) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            client,
            feed_url: feed_url.into(),
            interval,
            store,
        })
    }

    /// Runs the poll loop until the shutdown signal fires.
    ///
    /// The interval is measured from the end of one cycle's work to the
    /// start of the next, so a slow fetch stretches the effective period.
    /// The shutdown signal is observed between cycles; a merge is never
    /// left half-applied.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        log::info!(
            "Polling {} every {:?} (retaining up to {} incidents)",
            self.feed_url,
            self.interval,
            self.store.capacity(),
        );

        loop {
            match self.poll_once().await {
                Ok(0) => log::debug!("No new incidents this cycle"),
                Ok(admitted) => {
                    log::info!(
                        "Merged {admitted} new incidents ({} retained)",
                        self.store.len()
                    );
                }
                Err(e) => log::warn!("Feed poll failed: {e}"),
            }

            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => {
                    log::info!("Feed poller stopping");
                    return;
                }
            }
        }
    }

    /// Fetches the feed once and merges new incidents into the store.
    ///
    /// Returns the number of incidents admitted this cycle.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] if the fetch fails, the body is not valid
    /// JSON, or the payload is not a record or sequence of records. The
    /// store is left untouched in every error case.
    pub async fn poll_once(&self) -> Result<usize, FeedError> {
        let response = self
            .client
            .get(&self.feed_url)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body)?;
        let records = into_records(payload)?;

        let mut seen = self.store.identities();
        let batch = collect_new(&records, &mut seen);
        let admitted = batch.len();
        self.store.merge(batch);

        Ok(admitted)
    }
}

/// Interprets the feed payload as a sequence of records. A single
/// top-level object counts as a one-element sequence.
fn into_records(payload: Value) -> Result<Vec<Value>, FeedError> {
    match payload {
        Value::Array(records) => Ok(records),
        record @ Value::Object(_) => Ok(vec![record]),
        other => Err(FeedError::Payload {
            message: format!("expected an object or an array of objects, got {other}"),
        }),
    }
}

/// Normalizes and deduplicates a batch of raw records in feed order.
///
/// `seen` starts as the store's current identity set and accumulates the
/// identities admitted here, so later in-batch duplicates are rejected
/// too. First-seen wins.
fn collect_new(records: &[Value], seen: &mut HashSet<IncidentId>) -> Vec<Incident> {
    let mut admitted = Vec::new();

    for record in records {
        let Some(raw) = record.as_object() else {
            log::debug!("Skipping non-object feed entry");
            continue;
        };

        match normalize::normalize(raw) {
            Ok(incident) => {
                if seen.insert(incident.id.clone()) {
                    admitted.push(incident);
                }
            }
            Err(reason) => log::debug!("Skipping feed record: {reason}"),
        }
    }

    admitted
}
