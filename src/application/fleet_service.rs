use crate::common::{
    AggregateRoot, ApplicationError, ApplicationResult, DomainError, DomainResult, EventEnvelope,
    EventJournal, EventMetadata,
};
use crate::domains::fleet::{
    normalize_color, normalize_name, random_color, validate_position, validate_waypoint,
    AggregateRepository, CreatePathRequest, DroneInstance, FleetAggregate, FleetEvent,
    FleetOverview, FlightPath, IdAllocator, TimelineEntry, Waypoint,
};
use crate::domains::DynLogger;
use std::sync::Arc;
use uuid::Uuid;

/// Settings for the fleet operation surface.
#[derive(Debug, Clone)]
pub struct FleetSettings {
    /// Repository key of the single fleet aggregate this service manages.
    pub aggregate_key: String,
    /// Display name given to a freshly created aggregate.
    pub default_name: String,
    /// Read-modify-write attempts before a conflicting write is given up.
    pub max_write_attempts: usize,
}

impl Default for FleetSettings {
    fn default() -> Self {
        Self {
            aggregate_key: "default".to_string(),
            default_name: "Default Drone".to_string(),
            max_write_attempts: 5,
        }
    }
}

/// Operation surface over the fleet aggregate.
///
/// Every write is a read-modify-write pass: load (or lazily create) the
/// aggregate, apply one command, and save with the version that was read.
/// A concurrent writer makes the save fail with a conflict and the whole pass
/// is repeated against the fresh record, so no update is silently lost.
pub struct FleetService {
    repository: Arc<dyn AggregateRepository>,
    ids: Arc<dyn IdAllocator>,
    journal: Option<Arc<dyn EventJournal>>,
    logger: DynLogger,
    settings: FleetSettings,
}

impl FleetService {
    pub fn new(
        repository: Arc<dyn AggregateRepository>,
        ids: Arc<dyn IdAllocator>,
        logger: DynLogger,
        settings: FleetSettings,
    ) -> Self {
        Self {
            repository,
            ids,
            journal: None,
            logger,
            settings,
        }
    }

    /// Record committed events in `journal` after each successful write.
    pub fn with_journal(mut self, journal: Arc<dyn EventJournal>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Returns the fleet aggregate, creating and storing a default one first
    /// if the repository has none. Without intervening writes, repeated calls
    /// return equal records.
    pub async fn load_or_create_aggregate(&self) -> ApplicationResult<FleetAggregate> {
        let key = &self.settings.aggregate_key;

        for _ in 0..self.attempts() {
            if let Some(aggregate) = self.repository.load(key).await? {
                return Ok(aggregate);
            }

            let mut aggregate =
                FleetAggregate::new(key.clone(), self.settings.default_name.clone());
            match self.repository.save(key, 0, &aggregate).await {
                Ok(version) => {
                    aggregate.version = version;
                    self.logger
                        .info(&format!("Created fleet aggregate '{}' ({})", aggregate.name, key));
                    self.publish(&mut aggregate).await;
                    return Ok(aggregate);
                }
                // Someone else created it first; read theirs on the next pass.
                Err(ApplicationError::Domain(DomainError::ConcurrencyConflict { .. })) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(self.gave_up("load_or_create_aggregate"))
    }

    pub async fn create_path(&self, request: CreatePathRequest) -> ApplicationResult<FlightPath> {
        // Fields are public, so re-run the checks `CreatePathRequest::new` applies.
        let request = CreatePathRequest::new(request.name, request.coordinates)?;
        let ids = self.ids.clone();
        let path = self
            .mutate("create_path", |fleet| {
                fleet.create_path(ids.as_ref(), request.name.clone(), request.coordinates.clone())
            })
            .await?;

        self.logger.info(&format!(
            "Created path {} '{}' with {} waypoints",
            path.id,
            path.name,
            path.coordinates.len()
        ));
        Ok(path)
    }

    /// Creates a path from a JSON upload (`{"name"?, "coordinates": [...]}`).
    pub async fn create_path_from_json(&self, body: &str) -> ApplicationResult<FlightPath> {
        let request = CreatePathRequest::from_json(body)?;
        self.create_path(request).await
    }

    /// Creates a path from the first LineString of a GeoJSON upload.
    pub async fn create_path_from_geojson(&self, body: &str) -> ApplicationResult<FlightPath> {
        let request = CreatePathRequest::from_geojson(body)?;
        self.create_path(request).await
    }

    pub async fn append_waypoint(
        &self,
        path_id: &str,
        coordinate: Waypoint,
    ) -> ApplicationResult<FlightPath> {
        validate_waypoint(&coordinate)?;

        let path = self
            .mutate("append_waypoint", |fleet| {
                fleet.append_waypoint(path_id, coordinate.clone())
            })
            .await?;

        tracing::debug!(path_id, waypoints = path.coordinates.len(), "waypoint appended");
        Ok(path)
    }

    pub async fn list_paths(&self) -> ApplicationResult<Vec<FlightPath>> {
        Ok(self.load_or_create_aggregate().await?.paths)
    }

    pub async fn create_drone(
        &self,
        name: Option<String>,
        color: Option<String>,
    ) -> ApplicationResult<DroneInstance> {
        let name = normalize_name(name);
        let color = match normalize_color(color)? {
            Some(color) => color,
            None => random_color(&mut rand::thread_rng()),
        };

        let ids = self.ids.clone();
        let drone = self
            .mutate("create_drone", |fleet| {
                fleet.create_drone(ids.as_ref(), name.clone(), color.clone())
            })
            .await?;

        self.logger.info(&format!(
            "Created drone {} '{}' ({})",
            drone.id, drone.name, drone.color
        ));
        Ok(drone)
    }

    /// Points a drone at `path_id` and `position`. The path is a weak
    /// reference and is stored as given, even if no such path exists; only an
    /// unknown drone is an error.
    pub async fn update_drone_position(
        &self,
        drone_id: &str,
        path_id: Option<String>,
        position: f64,
    ) -> ApplicationResult<DroneInstance> {
        validate_position(position)?;

        let drone = self
            .mutate("update_drone_position", |fleet| {
                fleet.update_drone_position(drone_id, path_id.clone(), position)
            })
            .await?;

        tracing::debug!(
            drone_id,
            path_id = ?drone.current_path_id,
            position = drone.current_position,
            "drone position updated"
        );
        Ok(drone)
    }

    pub async fn list_drones(&self) -> ApplicationResult<Vec<DroneInstance>> {
        Ok(self.load_or_create_aggregate().await?.drones)
    }

    /// Paths and drones from a single read of the aggregate.
    pub async fn list_fleet(&self) -> ApplicationResult<FleetOverview> {
        Ok(self.load_or_create_aggregate().await?.into())
    }

    pub async fn timeline(&self) -> ApplicationResult<Vec<TimelineEntry>> {
        Ok(self.load_or_create_aggregate().await?.timeline())
    }

    async fn mutate<T, F>(&self, operation: &'static str, mut command: F) -> ApplicationResult<T>
    where
        F: FnMut(&mut FleetAggregate) -> DomainResult<T> + Send,
        T: Send,
    {
        let key = &self.settings.aggregate_key;

        for attempt in 1..=self.attempts() {
            let mut aggregate = self.load_or_create_aggregate().await?;
            let expected_version = aggregate.version;

            // Domain failures (unknown id, bad input) return before anything is saved.
            let outcome = command(&mut aggregate)?;

            match self.repository.save(key, expected_version, &aggregate).await {
                Ok(version) => {
                    aggregate.version = version;
                    self.publish(&mut aggregate).await;
                    return Ok(outcome);
                }
                Err(ApplicationError::Domain(DomainError::ConcurrencyConflict {
                    expected,
                    actual,
                })) => {
                    tracing::warn!(
                        operation,
                        attempt,
                        expected,
                        actual,
                        "fleet write conflicted, retrying"
                    );
                }
                Err(e) => {
                    self.logger.error(&format!(
                        "{} failed to persist fleet '{}': {}",
                        operation, key, e
                    ));
                    return Err(e);
                }
            }
        }

        Err(self.gave_up(operation))
    }

    /// Hands committed events to the journal. The aggregate is already
    /// stored at this point, so journal failures are only logged.
    async fn publish(&self, aggregate: &mut FleetAggregate) {
        let events = aggregate.take_uncommitted_events();
        let Some(journal) = &self.journal else {
            return;
        };
        if events.is_empty() {
            return;
        }

        let correlation_id = Uuid::new_v4();
        let envelopes: Result<Vec<EventEnvelope>, _> = events
            .iter()
            .map(|event: &FleetEvent| {
                EventEnvelope::new(
                    event,
                    aggregate.aggregate_type(),
                    aggregate.version,
                    EventMetadata {
                        correlation_id: Some(correlation_id),
                        source: "FleetService".to_string(),
                    },
                )
            })
            .collect();

        let result = match envelopes {
            Ok(envelopes) => journal.append_events(&aggregate.id, envelopes).await,
            Err(e) => Err(format!("Failed to create event envelope: {}", e)),
        };
        if let Err(e) = result {
            self.logger.warn(&format!(
                "Fleet events for version {} not journaled: {}",
                aggregate.version, e
            ));
        }
    }

    fn attempts(&self) -> usize {
        self.settings.max_write_attempts.max(1)
    }

    fn gave_up(&self, operation: &str) -> ApplicationError {
        let message = format!(
            "{} gave up after {} conflicting writes to fleet '{}'",
            operation,
            self.attempts(),
            self.settings.aggregate_key
        );
        self.logger.error(&message);
        ApplicationError::Persistence(message)
    }
}
