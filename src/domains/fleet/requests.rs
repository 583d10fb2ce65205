//! Caller input for fleet commands, validated before it reaches the aggregate.

use super::aggregate::Waypoint;
use crate::common::{DomainError, DomainResult};
use geojson::GeoJson;
use serde::Deserialize;

/// A validated request to create a path.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePathRequest {
    pub name: Option<String>,
    pub coordinates: Vec<Waypoint>,
}

#[derive(Deserialize)]
struct RawCreatePath {
    #[serde(default)]
    name: Option<String>,
    coordinates: Vec<serde_json::Value>,
}

impl CreatePathRequest {
    pub fn new(name: Option<String>, coordinates: Vec<Waypoint>) -> DomainResult<Self> {
        for (index, waypoint) in coordinates.iter().enumerate() {
            validate_waypoint(waypoint).map_err(|e| {
                DomainError::invalid_input(format!("coordinates[{}]: {}", index, reason(e)))
            })?;
        }
        Ok(Self {
            name: normalize_name(name),
            coordinates,
        })
    }

    /// Parses `{"name": "...", "coordinates": [[lat, lng], ...]}`.
    pub fn from_json(body: &str) -> DomainResult<Self> {
        let raw: RawCreatePath = serde_json::from_str(body)
            .map_err(|e| DomainError::invalid_input(format!("malformed path document: {}", e)))?;

        let coordinates = raw
            .coordinates
            .iter()
            .enumerate()
            .map(|(index, value)| {
                waypoint_from_value(value).map_err(|e| {
                    DomainError::invalid_input(format!("coordinates[{}]: {}", index, reason(e)))
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Self::new(raw.name, coordinates)
    }

    /// Takes the first `LineString` found in a GeoJSON document. For features
    /// the `name` property, when present, becomes the path name.
    pub fn from_geojson(body: &str) -> DomainResult<Self> {
        let document: GeoJson = body
            .parse()
            .map_err(|e| DomainError::invalid_input(format!("malformed GeoJSON: {}", e)))?;

        let (name, line) = match document {
            GeoJson::Geometry(geometry) => (None, line_string(&geometry.value)),
            GeoJson::Feature(feature) => feature_line(&feature),
            GeoJson::FeatureCollection(collection) => collection
                .features
                .iter()
                .map(feature_line)
                .find(|(_, line)| line.is_some())
                .unwrap_or((None, None)),
        };

        let coordinates = line.ok_or_else(|| {
            DomainError::invalid_input("GeoJSON document contains no LineString geometry")
        })?;
        Self::new(name, coordinates)
    }
}

fn feature_line(feature: &geojson::Feature) -> (Option<String>, Option<Vec<Waypoint>>) {
    let name = feature
        .properties
        .as_ref()
        .and_then(|props| props.get("name"))
        .and_then(|value| value.as_str())
        .map(str::to_string);
    let line = feature
        .geometry
        .as_ref()
        .and_then(|geometry| line_string(&geometry.value));
    (name, line)
}

fn line_string(value: &geojson::Value) -> Option<Vec<Waypoint>> {
    match value {
        geojson::Value::LineString(points) => Some(points.clone()),
        _ => None,
    }
}

/// A waypoint is an array of at least two finite numbers.
pub fn validate_waypoint(waypoint: &[f64]) -> DomainResult<()> {
    if waypoint.len() < 2 {
        return Err(DomainError::invalid_input(format!(
            "waypoint needs at least 2 numbers, got {}",
            waypoint.len()
        )));
    }
    if waypoint.iter().any(|n| !n.is_finite()) {
        return Err(DomainError::invalid_input("waypoint values must be finite numbers"));
    }
    Ok(())
}

pub fn waypoint_from_value(value: &serde_json::Value) -> DomainResult<Waypoint> {
    let items = value
        .as_array()
        .ok_or_else(|| DomainError::invalid_input("waypoint must be an array of numbers"))?;
    let waypoint = items
        .iter()
        .map(|item| {
            item.as_f64()
                .ok_or_else(|| DomainError::invalid_input("waypoint must be an array of numbers"))
        })
        .collect::<DomainResult<Waypoint>>()?;
    validate_waypoint(&waypoint)?;
    Ok(waypoint)
}

/// Positions are opaque but must survive a JSON round trip.
pub fn validate_position(position: f64) -> DomainResult<()> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(DomainError::invalid_input("position must be a finite number"))
    }
}

/// Trims a display name; blank names count as absent.
pub fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Drone colors are free-form but must not be blank.
pub fn normalize_color(color: Option<String>) -> DomainResult<Option<String>> {
    match color {
        None => Ok(None),
        Some(c) if c.trim().is_empty() => {
            Err(DomainError::invalid_input("color must not be blank"))
        }
        Some(c) => Ok(Some(c.trim().to_string())),
    }
}

fn reason(error: DomainError) -> String {
    match error {
        DomainError::InvalidInput { reason } => reason,
        other => other.to_string(),
    }
}
