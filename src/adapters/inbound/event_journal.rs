use crate::common::{EventEnvelope, EventJournal};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory event journal for testing and development
#[derive(Debug, Default)]
pub struct InMemoryEventJournal {
    events: RwLock<HashMap<String, Vec<EventEnvelope>>>,
}

impl InMemoryEventJournal {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl EventJournal for InMemoryEventJournal {
    async fn append_events(
        &self,
        aggregate_id: &str,
        events: Vec<EventEnvelope>,
    ) -> Result<(), String> {
        let mut journal = self.events.write().await;
        journal
            .entry(aggregate_id.to_string())
            .or_default()
            .extend(events);
        Ok(())
    }

    async fn load_events(&self, aggregate_id: &str) -> Result<Vec<EventEnvelope>, String> {
        let journal = self.events.read().await;
        Ok(journal.get(aggregate_id).cloned().unwrap_or_default())
    }

    async fn load_events_by_type(
        &self,
        event_type: &str,
        from_timestamp: Option<DateTime<Utc>>,
    ) -> Result<Vec<EventEnvelope>, String> {
        let journal = self.events.read().await;

        let mut matching: Vec<EventEnvelope> = journal
            .values()
            .flatten()
            .filter(|e| e.event_type == event_type)
            .filter(|e| from_timestamp.map_or(true, |from| e.occurred_at >= from))
            .cloned()
            .collect();

        matching.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
        Ok(matching)
    }
}
