//! Hardware probes: the boundary calls that fetch real metrics from the OS.
//!
//! Only CPU and memory utilization are ever measured; everything else in a
//! snapshot is derived from them. Implementations live in submodules and are
//! selected by configuration, never by flags inside the scheduler.

mod live;
mod simulated;

pub use live::{read_hwmon_fans, LiveProbe};
pub use simulated::{FixedProbe, SimulatedProbe};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ProbeError;

/// Fan name to RPM. Ordered so that "the first fan" is deterministic.
pub type FanReadings = BTreeMap<String, f64>;

/// The only values actually obtained from outside during a tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawMetrics {
    pub cpu_usage_pct: f64,
    pub memory_usage_pct: f64,
    pub probe_succeeded: bool,
}

impl RawMetrics {
    pub fn sampled(cpu_usage_pct: f64, memory_usage_pct: f64) -> Self {
        Self {
            cpu_usage_pct,
            memory_usage_pct,
            probe_succeeded: true,
        }
    }

    /// Stand-in used when the probe failed: continue from the last good
    /// sample, or from zero if there never was one.
    pub fn fallback(last_known: Option<RawMetrics>) -> Self {
        let last = last_known.unwrap_or_default();
        Self {
            cpu_usage_pct: last.cpu_usage_pct,
            memory_usage_pct: last.memory_usage_pct,
            probe_succeeded: false,
        }
    }

    /// Reject readings no real machine can produce
    pub fn validate(self) -> Result<Self, ProbeError> {
        for (label, value) in [
            ("cpu usage", self.cpu_usage_pct),
            ("memory usage", self.memory_usage_pct),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ProbeError::invalid_reading(format!(
                    "{} out of range: {}",
                    label, value
                )));
            }
        }
        Ok(self)
    }
}

/// Drop fan readings no spinning fan can produce (non-finite, zero or negative)
pub fn sanitize_fans(fans: FanReadings) -> FanReadings {
    fans.into_iter()
        .filter(|(name, rpm)| {
            let valid = rpm.is_finite() && *rpm > 0.0;
            if !valid {
                log::debug!("Discarding fan reading {} = {}", name, rpm);
            }
            valid
        })
        .collect()
}

/// Source of raw hardware metrics.
///
/// Calls may block on I/O; the scheduler always runs them on a blocking
/// thread under a timeout, so implementations do not need to be async.
pub trait HardwareProbe: Send {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Sample global CPU and memory utilization in percent
    fn sample_cpu_and_memory_usage(&mut self) -> Result<RawMetrics, ProbeError>;

    /// Sample fan speeds. An empty map is the normal answer on hardware
    /// without accessible fan telemetry.
    fn sample_fan_speeds(&mut self) -> FanReadings {
        FanReadings::new()
    }
}

impl HardwareProbe for Box<dyn HardwareProbe> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn sample_cpu_and_memory_usage(&mut self) -> Result<RawMetrics, ProbeError> {
        (**self).sample_cpu_and_memory_usage()
    }

    fn sample_fan_speeds(&mut self) -> FanReadings {
        (**self).sample_fan_speeds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_continues_last_sample() {
        let last = RawMetrics::sampled(62.0, 48.0);
        let fallback = RawMetrics::fallback(Some(last));

        assert_eq!(fallback.cpu_usage_pct, 62.0);
        assert_eq!(fallback.memory_usage_pct, 48.0);
        assert!(!fallback.probe_succeeded);
    }

    #[test]
    fn test_fallback_without_history_is_zero() {
        let fallback = RawMetrics::fallback(None);

        assert_eq!(fallback.cpu_usage_pct, 0.0);
        assert_eq!(fallback.memory_usage_pct, 0.0);
        assert!(!fallback.probe_succeeded);
    }

    #[test]
    fn test_sanitize_fans_keeps_only_spinning_fans() {
        let mut fans = FanReadings::new();
        fans.insert("A".to_string(), f64::NAN);
        fans.insert("B".to_string(), -40.0);
        fans.insert("C".to_string(), 0.0);
        fans.insert("D".to_string(), f64::INFINITY);
        fans.insert("E".to_string(), 1450.0);

        let clean = sanitize_fans(fans);

        assert_eq!(clean.len(), 1);
        assert_eq!(clean.get("E"), Some(&1450.0));
    }

    #[test]
    fn test_validate_rejects_impossible_values() {
        assert!(RawMetrics::sampled(50.0, 50.0).validate().is_ok());
        assert!(RawMetrics::sampled(f64::NAN, 50.0).validate().is_err());
        assert!(RawMetrics::sampled(50.0, 140.0).validate().is_err());
        assert!(matches!(
            RawMetrics::sampled(-1.0, 10.0).validate(),
            Err(ProbeError::InvalidReading(_))
        ));
    }
}
