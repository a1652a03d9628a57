#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The canonical normalized incident format for the dispatch map.
//!
//! The feed poller produces [`Incident`] records from the raw pager feed;
//! the store and the `GeoJSON` projection only ever see this type, never the
//! raw feed shape.

use serde::{Deserialize, Serialize};

/// Residual metadata fields carried along with an incident, keyed by the raw
/// feed field names.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Stable identity of an incident, used for deduplication.
///
/// Derived from the raw record by the normalizer: either the feed's explicit
/// unique field, or a composite of the timestamp and message fields when no
/// explicit identifier is present. Two records with equal identity are the
/// same incident.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IncidentId(String);

impl IncidentId {
    /// Creates an identity from its canonical string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a composite identity from a timestamp-like value and a
    /// message value.
    #[must_use]
    pub fn composite(timestamp: &str, message: &str) -> Self {
        Self(format!("{timestamp}|{message}"))
    }

    /// The canonical string form of this identity.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IncidentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dispatch incident normalized from the raw feed.
///
/// Coordinates are required and finite — records without parseable
/// coordinates never become an `Incident`. `attributes` holds every raw
/// field except the ones consumed to produce the coordinates; the identity
/// source fields are kept since they are useful metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Deduplication identity derived from the raw record.
    pub id: IncidentId,
    /// Latitude (WGS84), decimal degrees.
    pub latitude: f64,
    /// Longitude (WGS84), decimal degrees.
    pub longitude: f64,
    /// Remaining raw feed fields (message text, service, region, ...).
    pub attributes: Attributes,
}
