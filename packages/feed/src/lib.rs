#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dispatch feed client.
//!
//! Fetches the raw pager feed, normalizes its schemaless records into
//! [`dispatch_map_incident_models::Incident`] values, and merges new
//! incidents into the shared store on a fixed interval.

pub mod normalize;
pub mod poller;

/// Errors that can occur during a feed poll cycle.
///
/// All variants are recoverable: the poll loop logs them and tries again on
/// the next interval.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, or error status).
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON.
    #[error("feed response was not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Response was valid JSON but not a record or sequence of records.
    #[error("unexpected feed payload: {message}")]
    Payload {
        /// Description of what the feed returned instead.
        message: String,
    },
}
