use drone_fleet::adapters::{init_noop_logger, init_tracing_logger, InMemoryAggregateRepository};
use drone_fleet::application::{FleetService, FleetSettings};
use drone_fleet::domains::fleet::SequentialAllocator;
use drone_fleet::domains::logger::DomainLogger;
use std::sync::{Arc, Mutex};

struct BridgeCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl BridgeCapture {
    fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl DomainLogger for BridgeCapture {
    fn info(&self, msg: &str) {
        self.messages.lock().unwrap().push(format!("INFO:{}", msg));
    }

    fn warn(&self, msg: &str) {
        self.messages.lock().unwrap().push(format!("WARN:{}", msg));
    }

    fn error(&self, msg: &str) {
        self.messages.lock().unwrap().push(format!("ERR:{}", msg));
    }
}

#[tokio::test]
async fn test_fleet_service_logs_through_injected_logger() {
    let capture = Arc::new(BridgeCapture::new());
    let bridge = capture.clone() as Arc<dyn DomainLogger>;

    let service = FleetService::new(
        Arc::new(InMemoryAggregateRepository::new()),
        Arc::new(SequentialAllocator::new()),
        bridge,
        FleetSettings::default(),
    );
    service.create_drone(Some("Kestrel".to_string()), None).await.unwrap();

    let msgs = capture.messages.lock().unwrap();
    assert!(msgs.iter().any(|m| m.starts_with("INFO:Created fleet aggregate 'Default Drone'")));
    assert!(msgs.iter().any(|m| m.contains("Created drone drone-1 'Kestrel'")));
}

#[tokio::test]
async fn test_bundled_loggers_accept_messages() {
    // Neither logger needs a subscriber to be installed.
    let noop = init_noop_logger();
    noop.info("ignored");
    noop.error("ignored-err");

    let tracing_logger = init_tracing_logger();
    tracing_logger.warn("no subscriber installed");
}
