//! # Collision Configuration
//!
//! Tuning values for the sweep and overlap math. The tolerances are
//! empirical; tune them to the precision of the coordinates in use.

use super::{Config, ConfigError};
use serde::{Deserialize, Serialize};

/// Collision tuning values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Spatial hash cell size in world units
    pub bucket_size: f32,

    /// Slack on segment and time parameters in translation sweeps
    pub sweep_tolerance: f32,

    /// Angular slack near a full turn in rotation sweeps
    pub angular_tolerance: f32,

    /// Penetration depth that still counts as touching in overlap checks
    pub overlap_tolerance: f32,

    /// How many times a blocked push group is rolled back and re-resolved
    pub max_resolve_passes: u32,
}

impl CollisionConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            bucket_size: 128.0,
            sweep_tolerance: 1.0 / 1024.0,
            angular_tolerance: 1.0 / 4096.0,
            overlap_tolerance: 1.0 / 2048.0,
            max_resolve_passes: 4,
        }
    }

    /// Builder method to set the spatial hash cell size
    pub fn with_bucket_size(mut self, bucket_size: f32) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    /// Builder method to set the rollback pass limit
    pub fn with_max_resolve_passes(mut self, passes: u32) -> Self {
        self.max_resolve_passes = passes;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("bucket_size", self.bucket_size),
            ("sweep_tolerance", self.sweep_tolerance),
            ("angular_tolerance", self.angular_tolerance),
            ("overlap_tolerance", self.overlap_tolerance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        if self.sweep_tolerance >= 0.5 {
            return Err(ConfigError::Invalid("sweep_tolerance must stay well below 1".to_string()));
        }

        if self.max_resolve_passes == 0 {
            return Err(ConfigError::Invalid("max_resolve_passes must be at least 1".to_string()));
        }

        Ok(())
    }
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for CollisionConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;

    #[test]
    fn test_defaults_are_valid() {
        let config = CollisionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bucket_size, 128.0);
        assert_eq!(config.sweep_tolerance, 1.0 / 1024.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(CollisionConfig::new().with_bucket_size(0.0).validate().is_err());
        assert!(CollisionConfig::new().with_max_resolve_passes(0).validate().is_err());

        let config = CollisionConfig {
            angular_tolerance: f32::NAN,
            ..CollisionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = CollisionConfig::from_str_as("bucket_size = 64.0\nmax_resolve_passes = 2\n", ConfigFormat::Toml).unwrap();
        assert_eq!(config.bucket_size, 64.0);
        assert_eq!(config.max_resolve_passes, 2);
        assert_eq!(config.overlap_tolerance, 1.0 / 2048.0);
    }

    #[test]
    fn test_ron_text() {
        let config = CollisionConfig::new().with_bucket_size(32.0);
        let text = config.to_string_as(ConfigFormat::Ron).unwrap();
        assert!(text.contains("bucket_size"));
        assert_eq!(CollisionConfig::from_str_as(&text, ConfigFormat::Ron).unwrap(), config);
    }

    #[test]
    fn test_file_round_trip_and_unknown_extension() {
        let path = std::env::temp_dir().join(format!("collider_core_config_{}.toml", std::process::id()));
        let config = CollisionConfig::new().with_max_resolve_passes(7);
        config.save_to_file(&path).unwrap();
        let loaded = CollisionConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);

        assert!(matches!(
            CollisionConfig::load_from_file("collision.json"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
