#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Projection of incident snapshots into `GeoJSON`.
//!
//! One point feature per incident, coordinates in `[longitude, latitude]`
//! order, properties equal to the incident's residual attributes.

use dispatch_map_incident_models::Incident;
use geojson::{Feature, FeatureCollection, Geometry};

/// Projects a store snapshot into a `FeatureCollection`, preserving the
/// snapshot's newest-first order.
///
/// Store invariants guarantee finite coordinates; an entry that violates
/// them is skipped with a warning rather than failing the whole response.
#[must_use]
pub fn feature_collection(incidents: &[Incident]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: incidents.iter().filter_map(feature).collect(),
        foreign_members: None,
    }
}

/// Builds the point feature for one incident.
fn feature(incident: &Incident) -> Option<Feature> {
    if !incident.latitude.is_finite() || !incident.longitude.is_finite() {
        log::warn!(
            "Skipping incident {} with unusable coordinates",
            incident.id
        );
        return None;
    }

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::Point(vec![
            incident.longitude,
            incident.latitude,
        ]))),
        id: None,
        properties: Some(incident.attributes.clone()),
        foreign_members: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_map_incident_models::{Attributes, IncidentId};
    use serde_json::json;

    fn incident(id: &str, latitude: f64, longitude: f64) -> Incident {
        let mut attributes = Attributes::new();
        attributes.insert("uid".to_string(), json!(id));
        attributes.insert("melding".to_string(), json!("fire"));
        Incident {
            id: IncidentId::new(id),
            latitude,
            longitude,
            attributes,
        }
    }

    #[test]
    fn one_feature_per_incident_in_snapshot_order() {
        let incidents = vec![incident("a", 52.1, 4.3), incident("b", 51.9, 4.5)];

        let collection = feature_collection(&incidents);
        assert_eq!(collection.features.len(), 2);

        let first = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(first["uid"], json!("a"));
    }

    #[test]
    fn coordinates_are_longitude_first() {
        let collection = feature_collection(&[incident("a", 52.1, 4.3)]);

        let geometry = collection.features[0].geometry.as_ref().unwrap();
        let geojson::Value::Point(coordinates) = &geometry.value else {
            panic!("expected a point geometry");
        };
        assert!((coordinates[0] - 4.3).abs() < f64::EPSILON);
        assert!((coordinates[1] - 52.1).abs() < f64::EPSILON);
    }

    #[test]
    fn properties_carry_the_attributes() {
        let collection = feature_collection(&[incident("a", 52.1, 4.3)]);

        let properties = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(properties["melding"], json!("fire"));
        assert!(!properties.contains_key("lat"));
        assert!(!properties.contains_key("lon"));
    }

    #[test]
    fn skips_entries_with_unusable_coordinates() {
        let incidents = vec![incident("a", f64::NAN, 4.3), incident("b", 51.9, 4.5)];

        let collection = feature_collection(&incidents);
        assert_eq!(collection.features.len(), 1);
    }

    #[test]
    fn serializes_as_a_feature_collection() {
        let collection = feature_collection(&[incident("a", 52.1, 4.3)]);

        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["type"], json!("FeatureCollection"));
        assert_eq!(value["features"][0]["type"], json!("Feature"));
        assert_eq!(value["features"][0]["geometry"]["type"], json!("Point"));
    }

    #[test]
    fn empty_snapshot_yields_an_empty_collection() {
        let collection = feature_collection(&[]);
        assert!(collection.features.is_empty());
    }
}
