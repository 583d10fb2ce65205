//! Builds services from a [`Config`]: picks adapters for each port.

use super::{FleetService, FleetSettings, PlaceService};
use crate::adapters::{
    FileAggregateRepository, FileEventJournal, HttpPlaceLookup, InMemoryAggregateRepository,
    InMemoryEventJournal, StaticPlaceDirectory,
};
use crate::common::EventJournal;
use crate::config::{Config, IdStrategy, PlaceProvider, StoreBackend};
use crate::domains::fleet::{AggregateRepository, IdAllocator, SequentialAllocator, UuidAllocator};
use crate::domains::places::PlaceLookup;
use crate::domains::DynLogger;
use std::sync::Arc;
use std::time::Duration;

impl From<&Config> for FleetSettings {
    fn from(config: &Config) -> Self {
        Self {
            aggregate_key: config.fleet.aggregate_key.clone(),
            default_name: config.fleet.default_name.clone(),
            max_write_attempts: config.fleet.max_write_attempts,
        }
    }
}

pub fn build_fleet_service(config: &Config, logger: DynLogger) -> FleetService {
    let repository: Arc<dyn AggregateRepository> = match config.store.backend {
        StoreBackend::Memory => Arc::new(InMemoryAggregateRepository::new()),
        StoreBackend::File => Arc::new(FileAggregateRepository::new(&config.store.data_dir)),
    };

    let ids: Arc<dyn IdAllocator> = match config.fleet.id_strategy {
        IdStrategy::Uuid => Arc::new(UuidAllocator),
        IdStrategy::Sequential => Arc::new(SequentialAllocator::new()),
    };

    let service = FleetService::new(repository, ids, logger, FleetSettings::from(config));
    if !config.store.journal {
        return service;
    }

    let journal: Arc<dyn EventJournal> = match config.store.backend {
        StoreBackend::Memory => Arc::new(InMemoryEventJournal::new()),
        StoreBackend::File => {
            Arc::new(FileEventJournal::new(config.store.data_dir.join("journal")))
        }
    };
    service.with_journal(journal)
}

pub fn build_place_service(config: &Config) -> anyhow::Result<PlaceService> {
    let timeout = Duration::from_millis(config.places.timeout_ms);

    let lookup: Arc<dyn PlaceLookup> = match config.places.provider {
        PlaceProvider::Static => Arc::new(StaticPlaceDirectory::new(config.places.entries.clone())),
        PlaceProvider::Http => Arc::new(HttpPlaceLookup::new(
            &config.places.base_url,
            config.places.access_token.clone(),
            timeout,
        )?),
    };

    Ok(PlaceService::new(lookup, timeout, config.places.max_results))
}
