use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::gateway::{self, AiGateway};
use crate::pipeline::Qualifier;
use crate::storage::{FileStorage, KeyValueStorage};
use crate::store::LeadStore;
use crate::types::Config;

/// Application state shared by every UI trigger.
pub struct AppState {
    pub config: Config,
    pub store: Arc<LeadStore>,
    pub gateway: Arc<dyn AiGateway>,
    pub qualifier: Qualifier,
}

impl AppState {
    /// Wire the file-backed store and the Gemini gateway from config.
    pub fn new(config: Config) -> Result<Self, String> {
        let dir = data_dir(&config)?;
        let gateway = gateway::build_gateway(&config.gateway)
            .map_err(|e| format!("Failed to build AI gateway: {}", e))?;
        Ok(Self::with_parts(config, Arc::new(FileStorage::new(dir)), gateway))
    }

    /// Wire explicit storage and gateway implementations.
    pub fn with_parts(
        config: Config,
        storage: Arc<dyn KeyValueStorage>,
        gateway: Arc<dyn AiGateway>,
    ) -> Self {
        let store = Arc::new(LeadStore::open(storage));
        let qualifier = Qualifier::new(store.clone(), gateway.clone(), config.outreach_threshold);
        Self {
            config,
            store,
            gateway,
            qualifier,
        }
    }
}

/// Get the state directory (~/.linkpulse)
fn default_state_dir() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".linkpulse"))
}

/// Get the canonical config file path (~/.linkpulse/config.json)
pub fn config_path() -> Result<PathBuf, String> {
    Ok(default_state_dir()?.join("config.json"))
}

/// Directory holding the persisted lead slot.
pub fn data_dir(config: &Config) -> Result<PathBuf, String> {
    match &config.data_dir {
        Some(dir) => Ok(dir.clone()),
        None => default_state_dir(),
    }
}

/// Load configuration from `path`.
///
/// A missing file yields defaults. A file that exists but does not parse, or
/// carries an out-of-range threshold, is an error.
pub fn load_config(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        log::info!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;
    let config: Config =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), String> {
    if !(0.0..=100.0).contains(&config.outreach_threshold) {
        return Err(format!(
            "outreachThreshold must be between 0 and 100, got {}",
            config.outreach_threshold
        ));
    }
    if config.gateway.model.trim().is_empty() {
        return Err("gateway.model must not be empty".to_string());
    }
    if config.gateway.timeout_secs == 0 {
        return Err("gateway.timeoutSecs must be at least 1".to_string());
    }
    Ok(())
}
