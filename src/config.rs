use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";

/// Static configuration loaded once at startup.
///
/// Map size must be a multiple of the water region edge length, otherwise the
/// region grid refuses to build.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InitialConfig {
    // Map generation
    pub map_size_x: u32,
    pub map_size_y: u32,
    pub seed: u64,
    pub lake_count: usize,
    pub lake_min_radius: u32,
    pub lake_max_radius: u32,
    pub canal_count: usize,
    pub aqueduct_count: usize,

    // Output
    pub save_path: String,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            map_size_x: 256,
            map_size_y: 256,
            seed: 0x5EA_5EED,
            lake_count: 24,
            lake_min_radius: 3,
            lake_max_radius: 12,
            canal_count: 12,
            aqueduct_count: 4,
            save_path: "saves/waterway.sav".to_string(),
        }
    }
}

impl InitialConfig {
    /// Parse a config from RON text. Missing fields take their default.
    pub fn from_ron(contents: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str::<InitialConfig>(contents)
    }

    /// Load the config at `path`, falling back to defaults (with an error
    /// logged) when it can't be read or parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_ron(&contents) {
                Ok(config) => {
                    info!("Loaded initial config from {}", path.display());
                    config
                }
                Err(e) => {
                    error!("Failed to parse initial config: {}", e);
                    error!("Using default InitialConfig");
                    InitialConfig::default()
                }
            },
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                error!("Using default InitialConfig");
                InitialConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = InitialConfig::from_ron("(map_size_x: 64, map_size_y: 32, seed: 7)").unwrap();
        assert_eq!(config.map_size_x, 64);
        assert_eq!(config.map_size_y, 32);
        assert_eq!(config.seed, 7);
        assert_eq!(config.lake_count, InitialConfig::default().lake_count);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = InitialConfig::load_or_default("does/not/exist.ron");
        assert_eq!(config, InitialConfig::default());
    }

    #[test]
    fn test_default_round_trips_through_ron() {
        let text = ron::to_string(&InitialConfig::default()).unwrap();
        assert_eq!(InitialConfig::from_ron(&text).unwrap(), InitialConfig::default());
    }
}
