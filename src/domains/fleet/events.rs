use crate::common::DomainEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate::Waypoint;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FleetEvent {
    FleetCreated {
        fleet_id: String,
        name: String,
        timestamp: DateTime<Utc>,
    },
    PathCreated {
        fleet_id: String,
        path_id: String,
        name: String,
        coordinates: Vec<Waypoint>,
        timestamp: DateTime<Utc>,
    },
    WaypointAppended {
        fleet_id: String,
        path_id: String,
        coordinate: Waypoint,
        timestamp: DateTime<Utc>,
    },
    DroneCreated {
        fleet_id: String,
        drone_id: String,
        name: String,
        color: String,
        timestamp: DateTime<Utc>,
    },
    DronePositionUpdated {
        fleet_id: String,
        drone_id: String,
        path_id: Option<String>,
        position: f64,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for FleetEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FleetEvent::FleetCreated { .. } => "FleetCreated",
            FleetEvent::PathCreated { .. } => "PathCreated",
            FleetEvent::WaypointAppended { .. } => "WaypointAppended",
            FleetEvent::DroneCreated { .. } => "DroneCreated",
            FleetEvent::DronePositionUpdated { .. } => "DronePositionUpdated",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            FleetEvent::FleetCreated { fleet_id, .. }
            | FleetEvent::PathCreated { fleet_id, .. }
            | FleetEvent::WaypointAppended { fleet_id, .. }
            | FleetEvent::DroneCreated { fleet_id, .. }
            | FleetEvent::DronePositionUpdated { fleet_id, .. } => fleet_id,
        }
    }

    fn event_version(&self) -> u64 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            FleetEvent::FleetCreated { timestamp, .. }
            | FleetEvent::PathCreated { timestamp, .. }
            | FleetEvent::WaypointAppended { timestamp, .. }
            | FleetEvent::DroneCreated { timestamp, .. }
            | FleetEvent::DronePositionUpdated { timestamp, .. } => *timestamp,
        }
    }
}
