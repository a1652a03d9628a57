//! Normalization of raw feed records into canonical incidents.
//!
//! The upstream feed is schemaless and has shipped two record shapes over
//! time: an explicit `uid` field vs. a derived `tijd` + `melding` identity,
//! and split `lat` / `lon` fields vs. a combined `"lat,lon"` string. Both
//! variants of each are supported, tried in order.

use dispatch_map_incident_models::{Attributes, Incident, IncidentId};
use serde_json::Value;

/// A raw feed record: an opaque key/value mapping with no guaranteed schema.
pub type RawRecord = serde_json::Map<String, Value>;

/// Explicit unique identifier field.
const ID_FIELD: &str = "uid";
/// Timestamp field, first half of the derived identity.
const TIMESTAMP_FIELD: &str = "tijd";
/// Message field, second half of the derived identity.
const MESSAGE_FIELD: &str = "melding";
/// Split latitude field.
const LATITUDE_FIELD: &str = "lat";
/// Split longitude field.
const LONGITUDE_FIELD: &str = "lon";
/// Combined `"latitude,longitude"` field.
const COMBINED_FIELD: &str = "latlong";

/// Why a raw record was dropped during normalization.
///
/// Per-record only: a rejection never affects the rest of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    /// No explicit identifier and no timestamp + message pair to derive one.
    #[error("record carries no usable identity")]
    MissingIdentity,

    /// Neither split coordinate fields nor a combined coordinate field.
    #[error("record carries no coordinate fields")]
    MissingCoordinates,

    /// Coordinate fields present but not parseable as finite decimal degrees.
    #[error("coordinate fields could not be parsed")]
    MalformedCoordinates,
}

/// Validates and canonicalizes one raw feed record.
///
/// Pure function of its input. The returned incident's `attributes` holds
/// every raw field except the consumed coordinate source fields; identity
/// source fields are retained.
///
/// # Errors
///
/// Returns a [`RejectReason`] when the record lacks a usable identity or
/// parseable coordinates.
pub fn normalize(raw: &RawRecord) -> Result<Incident, RejectReason> {
    let id = extract_identity(raw)?;
    let (latitude, longitude, consumed) = extract_coordinates(raw)?;

    let attributes: Attributes = raw
        .iter()
        .filter(|(key, _)| !consumed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(Incident {
        id,
        latitude,
        longitude,
        attributes,
    })
}

/// Derives the deduplication identity: the explicit `uid` field when
/// present, otherwise the `tijd` + `melding` composite.
fn extract_identity(raw: &RawRecord) -> Result<IncidentId, RejectReason> {
    if let Some(uid) = raw.get(ID_FIELD).and_then(scalar_string) {
        return Ok(IncidentId::new(uid));
    }

    let timestamp = raw.get(TIMESTAMP_FIELD).and_then(scalar_string);
    let message = raw.get(MESSAGE_FIELD).and_then(scalar_string);
    match (timestamp, message) {
        (Some(timestamp), Some(message)) => Ok(IncidentId::composite(&timestamp, &message)),
        _ => Err(RejectReason::MissingIdentity),
    }
}

/// Extracts coordinates from split `lat` / `lon` fields or a combined
/// `"lat,lon"` string, in that order. Returns the parsed pair plus the
/// field names consumed, so they can be excluded from `attributes`.
fn extract_coordinates(
    raw: &RawRecord,
) -> Result<(f64, f64, &'static [&'static str]), RejectReason> {
    if let (Some(lat), Some(lon)) = (raw.get(LATITUDE_FIELD), raw.get(LONGITUDE_FIELD)) {
        let latitude = coordinate_value(lat).ok_or(RejectReason::MalformedCoordinates)?;
        let longitude = coordinate_value(lon).ok_or(RejectReason::MalformedCoordinates)?;
        return Ok((latitude, longitude, &[LATITUDE_FIELD, LONGITUDE_FIELD]));
    }

    if let Some(combined) = raw.get(COMBINED_FIELD) {
        let text = combined.as_str().ok_or(RejectReason::MalformedCoordinates)?;
        let (lat_part, lon_part) = text
            .split_once(',')
            .ok_or(RejectReason::MalformedCoordinates)?;
        let latitude = parse_degrees(lat_part).ok_or(RejectReason::MalformedCoordinates)?;
        let longitude = parse_degrees(lon_part).ok_or(RejectReason::MalformedCoordinates)?;
        return Ok((latitude, longitude, &[COMBINED_FIELD]));
    }

    Err(RejectReason::MissingCoordinates)
}

/// Reads a coordinate from a JSON value that is either a number or a
/// numeric string.
fn coordinate_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_degrees(s),
        _ => None,
    }
}

/// Parses a trimmed decimal-degrees string, rejecting non-finite values.
fn parse_degrees(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Canonicalizes a scalar JSON value to its string form. Nulls, arrays,
/// and objects yield `None`.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
