use drone_fleet::adapters::init_tracing_logger;
use drone_fleet::application::{build_fleet_service, build_place_service};
use drone_fleet::Config;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let config = Config::load(&config_path)?;

    // Initialize tracing; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting drone fleet");
    info!("Configuration loaded from {}", config_path);
    info!(
        "Fleet '{}' on {:?} store at {}",
        config.fleet.aggregate_key,
        config.store.backend,
        config.store.data_dir.display()
    );

    let fleet = build_fleet_service(&config, init_tracing_logger());
    let places = build_place_service(&config)?;

    let overview = match fleet.list_fleet().await {
        Ok(overview) => overview,
        Err(e) => {
            error!("Failed to read fleet: {}", e);
            println!("{}", serde_json::to_string_pretty(&e.report())?);
            return Ok(());
        }
    };
    info!(
        "Fleet has {} paths and {} drones",
        overview.paths.len(),
        overview.drones.len()
    );
    println!("{}", serde_json::to_string_pretty(&overview)?);

    let timeline = fleet.timeline().await?;
    println!("{}", serde_json::to_string_pretty(&timeline)?);

    // Optional place search: `drone-fleet <config> <query>`
    if let Some(query) = std::env::args().nth(2) {
        match places.search(&query).await {
            Ok(hits) => println!("{}", serde_json::to_string_pretty(&hits)?),
            Err(e) => println!("{}", serde_json::to_string_pretty(&e.report())?),
        }
    }

    info!("Drone fleet finished");
    Ok(())
}
