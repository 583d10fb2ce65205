use crate::domains::places::Place;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `DRONE_FLEET__STORE__BACKEND=file`.
pub const ENV_PREFIX: &str = "DRONE_FLEET";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub fleet: FleetConfig,
    pub store: StoreConfig,
    pub places: PlacesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetConfig {
    pub aggregate_key: String,
    pub default_name: String,
    pub max_write_attempts: usize,
    pub id_strategy: IdStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    Uuid,
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub data_dir: PathBuf,
    pub journal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacesConfig {
    pub provider: PlaceProvider,
    pub base_url: String,
    pub access_token: Option<String>,
    pub timeout_ms: u64,
    pub max_results: usize,
    #[serde(default)]
    pub entries: Vec<Place>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceProvider {
    Static,
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Reads a complete configuration from a TOML file.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Layers defaults, then the TOML file at `path` if it exists, then
    /// `DRONE_FLEET__`-prefixed environment variables.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let layered = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Config::default())?)
            .add_source(::config::File::from(path.as_ref()).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = layered.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fleet.aggregate_key.trim().is_empty() {
            anyhow::bail!("fleet.aggregate_key must not be empty");
        }
        if self.fleet.max_write_attempts == 0 {
            anyhow::bail!("fleet.max_write_attempts must be at least 1");
        }
        if self.places.provider == PlaceProvider::Http && self.places.base_url.trim().is_empty() {
            anyhow::bail!("places.base_url is required for the http provider");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fleet: FleetConfig {
                aggregate_key: "default".to_string(),
                default_name: "Default Drone".to_string(),
                max_write_attempts: 5,
                id_strategy: IdStrategy::Uuid,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                data_dir: PathBuf::from("data/fleet"),
                journal: false,
            },
            places: PlacesConfig {
                provider: PlaceProvider::Static,
                base_url: "https://api.mapbox.com/geocoding/v5/mapbox.places".to_string(),
                access_token: None,
                timeout_ms: 5000,
                max_results: 10,
                entries: Vec::new(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[fleet]
aggregate_key = "north-sea"
default_name = "North Sea Fleet"
max_write_attempts = 3
id_strategy = "sequential"

[store]
backend = "file"
data_dir = "/var/lib/drone-fleet"
journal = true

[places]
provider = "static"
base_url = ""
timeout_ms = 250
max_results = 3

[[places.entries]]
id = "kiel"
name = "Kiel"
coordinates = [54.32, 10.12]

[logging]
level = "debug"
"#;

    #[tokio::test]
    async fn reads_a_full_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::from_file(&path).await.unwrap();
        assert_eq!(config.fleet.aggregate_key, "north-sea");
        assert_eq!(config.fleet.id_strategy, IdStrategy::Sequential);
        assert_eq!(config.store.backend, StoreBackend::File);
        assert!(config.store.journal);
        assert_eq!(config.places.entries.len(), 1);
        assert_eq!(config.places.entries[0].coordinates, vec![54.32, 10.12]);
        assert_eq!(config.places.access_token, None);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.fleet, Config::default().fleet);
        assert_eq!(config.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn layered_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[fleet]\naggregate_key = \"baltic\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.fleet.aggregate_key, "baltic");
        assert_eq!(config.fleet.default_name, "Default Drone");
        assert_eq!(config.places.timeout_ms, 5000);
    }

    #[test]
    fn zero_write_attempts_is_rejected() {
        let mut config = Config::default();
        config.fleet.max_write_attempts = 0;
        assert!(config.validate().is_err());
    }
}
