use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::thermal_monitor::{
    HardwareProbe, Jitter, LevelThresholds, LiveProbe, SchedulerConfig, SimulatedProbe,
};
use crate::error::{MonitorError, Result};

/// Which probe implementation feeds the scheduler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMode {
    /// Real OS statistics
    #[default]
    Live,
    /// Random-walk demo data
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub mode: ProbeMode,
    #[serde(default = "default_live_interval_ms")]
    pub live_interval_ms: u64,
    #[serde(default = "default_simulated_interval_ms")]
    pub simulated_interval_ms: u64,
    /// Defaults to the tick interval
    #[serde(default)]
    pub probe_timeout_ms: Option<u64>,
    /// Seeds both the jitter source and the simulated probe
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub thresholds: LevelThresholds,
}

fn default_live_interval_ms() -> u64 {
    2000
}

fn default_simulated_interval_ms() -> u64 {
    1000
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            mode: ProbeMode::default(),
            live_interval_ms: default_live_interval_ms(),
            simulated_interval_ms: default_simulated_interval_ms(),
            probe_timeout_ms: None,
            seed: None,
            thresholds: LevelThresholds::default(),
        }
    }
}

impl MonitorConfig {
    /// Load from the user config directory.
    ///
    /// A missing or empty file yields the defaults; so does a file that no
    /// longer parses (for example after the format changed), with a warning.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(MonitorConfig::default());
        }

        let data = fs::read_to_string(&config_path)?;
        if data.trim().is_empty() {
            return Ok(MonitorConfig::default());
        }

        Ok(serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!(
                "Ignoring unreadable config {:?}: {}; using defaults",
                config_path,
                e
            );
            MonitorConfig::default()
        }))
    }

    /// Strict load from an explicit path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| MonitorError::config(format!("Failed to read {:?}: {}", path, e)))?;
        let config: MonitorConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, data).with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| MonitorError::config("Could not determine config directory"))?;

        Ok(config_dir.join("thermwatch").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.live_interval_ms == 0 || self.simulated_interval_ms == 0 {
            return Err(MonitorError::config("intervals must be greater than zero"));
        }
        if self.probe_timeout_ms == Some(0) {
            return Err(MonitorError::config("probe timeout must be greater than zero"));
        }
        Ok(())
    }

    /// Tick interval of the configured mode
    pub fn interval(&self) -> Duration {
        let ms = match self.mode {
            ProbeMode::Live => self.live_interval_ms,
            ProbeMode::Simulated => self.simulated_interval_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        let config = SchedulerConfig::new(self.interval());
        match self.probe_timeout_ms {
            Some(ms) => config.with_probe_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }

    pub fn jitter(&self) -> Jitter {
        Jitter::from_seed(self.seed)
    }

    /// The probe implementation selected by `mode`
    pub fn build_probe(&self) -> Box<dyn HardwareProbe> {
        match self.mode {
            ProbeMode::Live => Box::new(LiveProbe::new()),
            // offset so probe noise and sensor noise are not the same stream
            ProbeMode::Simulated => Box::new(SimulatedProbe::new(Jitter::from_seed(
                self.seed.map(|s| s.wrapping_add(1)),
            ))),
        }
    }
}
