use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    #[serde(default)]
    pub logistics: LogisticsConfig,
}

/// Logistics engine settings. Every section falls back to its default.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LogisticsConfig {
    #[serde(default)]
    pub cargo: CargoProfileConfig,
    #[serde(default)]
    pub crew: CrewProfileConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub driver: DriverConfig,
}

/// One-way cargo transfers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CargoProfileConfig {
    /// Fixed transit time for any cargo transfer (simulated seconds)
    pub base_transit_secs: f64,
    /// Additional transit time per tonne of cargo
    pub secs_per_tonne: f64,
    /// Transport credits charged per tonne of cargo
    pub credits_per_tonne: f64,
}

impl Default for CargoProfileConfig {
    fn default() -> Self {
        Self {
            base_transit_secs: 3600.0,
            secs_per_tonne: 60.0,
            credits_per_tonne: 10.0,
        }
    }
}

/// Round-trip crew rotations.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CrewProfileConfig {
    /// Transit time of each leg (simulated seconds)
    pub transit_secs: f64,
    /// Transport credits charged per crew seat
    pub credits_per_seat: f64,
}

impl Default for CrewProfileConfig {
    fn default() -> Self {
        Self {
            transit_secs: 21600.0,
            credits_per_seat: 25.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PersistenceConfig {
    pub save_path: String,
    /// "yaml" or "json"
    pub format: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_path: "./data/logistics.yaml".to_string(),
            format: "yaml".to_string(),
        }
    }
}

/// Host frame loop used by [`crate::logistics::FrameDriver`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DriverConfig {
    pub frame_interval_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 20,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path))
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }
}
