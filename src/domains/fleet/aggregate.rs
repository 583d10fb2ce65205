use super::events::FleetEvent;
use super::ids::IdAllocator;
use super::projections::{compute_timeline, TimelineEntry};
use crate::common::{AggregateRoot, DomainError, DomainResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One coordinate of a path. Usually `[lat, lng]` or `[x, y]`; the fleet
/// never interprets the numbers, only their order inside a path.
pub type Waypoint = Vec<f64>;

/// How many times the aggregate asks an [`IdAllocator`] for a fresh id
/// before giving up.
const MAX_ID_ATTEMPTS: usize = 16;

/// The single record holding every path and drone of a fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetAggregate {
    pub id: String,
    pub name: String,
    pub paths: Vec<FlightPath>,
    pub drones: Vec<DroneInstance>,
    pub created_at: DateTime<Utc>,
    /// Write sequence assigned by the repository; 0 means never stored.
    #[serde(default)]
    pub version: u64,
    #[serde(skip)]
    uncommitted_events: Vec<FleetEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPath {
    pub id: String,
    pub name: String,
    pub coordinates: Vec<Waypoint>,
    pub created_at: DateTime<Utc>,
}

impl FlightPath {
    pub fn waypoint_count(&self) -> usize {
        self.coordinates.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneInstance {
    pub id: String,
    pub name: String,
    /// Weak reference to a [`FlightPath::id`]. Never checked against `paths`.
    pub current_path_id: Option<String>,
    pub current_position: f64,
    pub is_active: bool,
    pub color: String,
}

impl FleetAggregate {
    pub fn new(id: String, name: String) -> Self {
        let timestamp = Utc::now();
        let mut fleet = Self {
            id: id.clone(),
            name: name.clone(),
            paths: Vec::new(),
            drones: Vec::new(),
            created_at: timestamp,
            version: 0,
            uncommitted_events: Vec::new(),
        };

        fleet.add_event(FleetEvent::FleetCreated {
            fleet_id: id,
            name,
            timestamp,
        });
        fleet
    }

    /// Linear scan, O(paths).
    pub fn path_index(&self, path_id: &str) -> Option<usize> {
        self.paths.iter().position(|p| p.id == path_id)
    }

    pub fn path(&self, path_id: &str) -> Option<&FlightPath> {
        self.path_index(path_id).map(|i| &self.paths[i])
    }

    /// Linear scan, O(drones).
    pub fn drone_index(&self, drone_id: &str) -> Option<usize> {
        self.drones.iter().position(|d| d.id == drone_id)
    }

    pub fn drone(&self, drone_id: &str) -> Option<&DroneInstance> {
        self.drone_index(drone_id).map(|i| &self.drones[i])
    }

    pub fn timeline(&self) -> Vec<TimelineEntry> {
        compute_timeline(&self.paths)
    }

    pub fn create_path(
        &mut self,
        ids: &dyn IdAllocator,
        name: Option<String>,
        coordinates: Vec<Waypoint>,
    ) -> DomainResult<FlightPath> {
        let existing: Vec<&str> = self.paths.iter().map(|e| e.id.as_str()).collect();
        let path_id = self.unique_id(
            "path",
            || ids.next_path_id(&existing),
            |id| self.path_index(id).is_some(),
        )?;
        let name = name.unwrap_or_else(|| format!("Path {}", self.paths.len() + 1));

        self.record(FleetEvent::PathCreated {
            fleet_id: self.id.clone(),
            path_id: path_id.clone(),
            name,
            coordinates,
            timestamp: Utc::now(),
        })?;

        self.path(&path_id)
            .cloned()
            .ok_or(DomainError::PathNotFound { id: path_id })
    }

    pub fn append_waypoint(
        &mut self,
        path_id: &str,
        coordinate: Waypoint,
    ) -> DomainResult<FlightPath> {
        if self.path_index(path_id).is_none() {
            return Err(DomainError::PathNotFound {
                id: path_id.to_string(),
            });
        }

        self.record(FleetEvent::WaypointAppended {
            fleet_id: self.id.clone(),
            path_id: path_id.to_string(),
            coordinate,
            timestamp: Utc::now(),
        })?;

        self.path(path_id).cloned().ok_or(DomainError::PathNotFound {
            id: path_id.to_string(),
        })
    }

    /// `color` is already resolved by the caller; generation lives outside
    /// the aggregate so that replaying events stays deterministic.
    pub fn create_drone(
        &mut self,
        ids: &dyn IdAllocator,
        name: Option<String>,
        color: String,
    ) -> DomainResult<DroneInstance> {
        let existing: Vec<&str> = self.drones.iter().map(|e| e.id.as_str()).collect();
        let drone_id = self.unique_id(
            "drone",
            || ids.next_drone_id(&existing),
            |id| self.drone_index(id).is_some(),
        )?;
        let name = name.unwrap_or_else(|| format!("Drone {}", self.drones.len() + 1));

        self.record(FleetEvent::DroneCreated {
            fleet_id: self.id.clone(),
            drone_id: drone_id.clone(),
            name,
            color,
            timestamp: Utc::now(),
        })?;

        self.drone(&drone_id)
            .cloned()
            .ok_or(DomainError::DroneNotFound { id: drone_id })
    }

    /// Sets the drone's path reference and position verbatim. Neither the
    /// path id nor the position bounds are checked.
    pub fn update_drone_position(
        &mut self,
        drone_id: &str,
        path_id: Option<String>,
        position: f64,
    ) -> DomainResult<DroneInstance> {
        if self.drone_index(drone_id).is_none() {
            return Err(DomainError::DroneNotFound {
                id: drone_id.to_string(),
            });
        }

        self.record(FleetEvent::DronePositionUpdated {
            fleet_id: self.id.clone(),
            drone_id: drone_id.to_string(),
            path_id,
            position,
            timestamp: Utc::now(),
        })?;

        self.drone(drone_id).cloned().ok_or(DomainError::DroneNotFound {
            id: drone_id.to_string(),
        })
    }

    fn unique_id(
        &self,
        collection: &'static str,
        mut next: impl FnMut() -> String,
        taken: impl Fn(&str) -> bool,
    ) -> DomainResult<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = next();
            if !taken(&candidate) {
                return Ok(candidate);
            }
        }
        Err(DomainError::IdExhausted {
            collection,
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}

impl AggregateRoot for FleetAggregate {
    type Event = FleetEvent;

    fn aggregate_type(&self) -> &'static str {
        "Fleet"
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) -> DomainResult<()> {
        match event {
            FleetEvent::FleetCreated {
                fleet_id,
                name,
                timestamp,
            } => {
                self.id = fleet_id.clone();
                self.name = name.clone();
                self.created_at = *timestamp;
            }
            FleetEvent::PathCreated {
                path_id,
                name,
                coordinates,
                timestamp,
                ..
            } => {
                self.paths.push(FlightPath {
                    id: path_id.clone(),
                    name: name.clone(),
                    coordinates: coordinates.clone(),
                    created_at: *timestamp,
                });
            }
            FleetEvent::WaypointAppended {
                path_id,
                coordinate,
                ..
            } => {
                let index = self
                    .path_index(path_id)
                    .ok_or_else(|| DomainError::PathNotFound { id: path_id.clone() })?;
                self.paths[index].coordinates.push(coordinate.clone());
            }
            FleetEvent::DroneCreated {
                drone_id,
                name,
                color,
                ..
            } => {
                self.drones.push(DroneInstance {
                    id: drone_id.clone(),
                    name: name.clone(),
                    current_path_id: None,
                    current_position: 0.0,
                    is_active: false,
                    color: color.clone(),
                });
            }
            FleetEvent::DronePositionUpdated {
                drone_id,
                path_id,
                position,
                ..
            } => {
                let index = self
                    .drone_index(drone_id)
                    .ok_or_else(|| DomainError::DroneNotFound { id: drone_id.clone() })?;
                let drone = &mut self.drones[index];
                drone.current_path_id = path_id.clone();
                drone.current_position = *position;
            }
        }
        Ok(())
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted_events)
    }

    fn add_event(&mut self, event: Self::Event) {
        self.uncommitted_events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::fleet::SequentialAllocator;

    struct StuckAllocator;

    impl IdAllocator for StuckAllocator {
        fn next_path_id(&self, _existing: &[&str]) -> String {
            "same".to_string()
        }

        fn next_drone_id(&self, _existing: &[&str]) -> String {
            "same".to_string()
        }
    }

    #[test]
    fn replaying_events_rebuilds_the_same_state() {
        let ids = SequentialAllocator::new();
        let mut fleet = FleetAggregate::new("default".into(), "Default Drone".into());
        let path = fleet.create_path(&ids, None, vec![vec![1.0, 2.0]]).unwrap();
        fleet.append_waypoint(&path.id, vec![3.0, 4.0]).unwrap();
        let drone = fleet.create_drone(&ids, None, "#00ff00".into()).unwrap();
        fleet
            .update_drone_position(&drone.id, Some(path.id.clone()), 1.0)
            .unwrap();

        let events = fleet.take_uncommitted_events();
        assert_eq!(events.len(), 5);

        let mut replayed = FleetAggregate::new(String::new(), String::new());
        replayed.take_uncommitted_events();
        for event in &events {
            replayed.apply(event).unwrap();
        }

        assert_eq!(replayed, fleet);
    }

    #[test]
    fn duplicate_ids_are_rejected_after_bounded_attempts() {
        let mut fleet = FleetAggregate::new("default".into(), "Default Drone".into());
        fleet.create_path(&StuckAllocator, None, vec![]).unwrap();

        let err = fleet.create_path(&StuckAllocator, None, vec![]).unwrap_err();
        assert!(matches!(err, DomainError::IdExhausted { collection: "path", .. }));
        assert_eq!(fleet.paths.len(), 1);

        // drones live in their own id space
        assert!(fleet.create_drone(&StuckAllocator, None, "#000000".into()).is_ok());
    }

    #[test]
    fn apply_waypoint_for_unknown_path_fails() {
        let mut fleet = FleetAggregate::new("default".into(), "Default Drone".into());
        let err = fleet
            .apply(&FleetEvent::WaypointAppended {
                fleet_id: "default".into(),
                path_id: "ghost".into(),
                coordinate: vec![0.0, 0.0],
                timestamp: Utc::now(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::PathNotFound { .. }));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let ids = SequentialAllocator::new();
        let mut fleet = FleetAggregate::new("default".into(), "Default Drone".into());
        fleet.create_drone(&ids, None, "#123456".into()).unwrap();

        let json = serde_json::to_value(&fleet).unwrap();
        assert!(json.get("createdAt").is_some());
        let drone = &json["drones"][0];
        assert_eq!(drone["currentPathId"], serde_json::Value::Null);
        assert_eq!(drone["currentPosition"], 0.0);
        assert_eq!(drone["isActive"], false);
        assert!(json.get("uncommittedEvents").is_none());
    }
}
