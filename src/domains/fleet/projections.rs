use super::aggregate::{DroneInstance, FleetAggregate, FlightPath};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-path playback summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: String,
    pub name: String,
    /// Number of waypoints in the path, used as its playback length.
    pub duration: usize,
    pub created_at: DateTime<Utc>,
}

/// Paths and drones read together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetOverview {
    pub paths: Vec<FlightPath>,
    pub drones: Vec<DroneInstance>,
}

impl From<FleetAggregate> for FleetOverview {
    fn from(fleet: FleetAggregate) -> Self {
        Self {
            paths: fleet.paths,
            drones: fleet.drones,
        }
    }
}

pub fn compute_timeline(paths: &[FlightPath]) -> Vec<TimelineEntry> {
    paths
        .iter()
        .map(|path| TimelineEntry {
            id: path.id.clone(),
            name: path.name.clone(),
            duration: path.waypoint_count(),
            created_at: path.created_at,
        })
        .collect()
}
