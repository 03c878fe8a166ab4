//! Runner configuration.

use anyhow::{Context, Result};
use humus_core::{OrganismKind, SeedOrganism, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding the simulation seed
pub const SEED_ENV: &str = "HUMUS_SEED";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub simulation: SimulationConfig,
    /// Last tick to run (exclusive)
    pub end_tick: u64,
    /// Log a population gauge every this many ticks (0 disables)
    pub report_interval: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig {
                initial_organisms: vec![
                    SeedOrganism::new(OrganismKind::OxygenBacteria, 10, 10),
                    SeedOrganism::new(OrganismKind::NitrogenBacteria, 4, 4),
                    SeedOrganism::new(OrganismKind::PhosphorusBacteria, 15, 6),
                    SeedOrganism::new(OrganismKind::GrassPlant, 7, 12),
                    SeedOrganism::new(OrganismKind::TreePlant, 16, 16),
                ],
                ..Default::default()
            },
            end_tick: 75,
            report_interval: 10,
        }
    }
}

impl RunnerConfig {
    /// Read a JSON config file; absent fields fall back to the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Apply an override seed taken from the environment
    pub fn with_seed_override(mut self, seed: Option<&str>) -> Result<Self> {
        if let Some(seed) = seed {
            self.simulation.seed = seed
                .trim()
                .parse()
                .with_context(|| format!("{SEED_ENV} must be an unsigned integer, got {seed:?}"))?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RunnerConfig::default();
        assert!(config.simulation.validate().is_ok());
        assert_eq!(config.simulation.initial_organisms.len(), 5);
        assert_eq!(config.end_tick, 75);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RunnerConfig::from_json(r#"{"end_tick": 300, "simulation": {"seed": 9}}"#).unwrap();
        assert_eq!(config.end_tick, 300);
        assert_eq!(config.report_interval, 10);
        assert_eq!(config.simulation.seed, 9);
        assert_eq!(config.simulation.world.width, 20);
    }

    #[test]
    fn test_seed_override() {
        let config = RunnerConfig::default().with_seed_override(Some(" 1234 ")).unwrap();
        assert_eq!(config.simulation.seed, 1234);

        let unchanged = RunnerConfig::default().with_seed_override(None).unwrap();
        assert_eq!(unchanged.simulation.seed, 0);

        assert!(RunnerConfig::default().with_seed_override(Some("abc")).is_err());
    }
}
