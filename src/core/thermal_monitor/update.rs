//! Per-tick update rules.
//!
//! `next_snapshot` is a pure transform over the previous snapshot and the raw
//! metrics of the current tick. It builds a complete new snapshot; nothing in
//! the previous one is touched, so readers holding it are unaffected.

use super::estimation::{
    derive_usage, fallback_fan_speed, temperature_jitter, TemperatureEstimates,
};
use super::jitter::Jitter;
use super::probe::{sanitize_fans, FanReadings, RawMetrics};
use super::sensors::*;
use super::snapshot::SensorSnapshot;
use crate::error::MonitorError;

pub const FAN_JITTER_RPM: f64 = 50.0;

/// Name used for the synthetic fan reading when the probe reports none
pub const FALLBACK_FAN_NAME: &str = "Fan 1";

/// A freshly built snapshot plus any bound violations found while building it
#[derive(Debug)]
pub struct UpdateOutcome {
    pub snapshot: SensorSnapshot,
    pub violations: Vec<MonitorError>,
}

/// Build the snapshot that follows `previous` given this tick's measurements
pub fn next_snapshot(
    previous: &SensorSnapshot,
    raw: RawMetrics,
    fans: &FanReadings,
    jitter: &mut Jitter,
) -> UpdateOutcome {
    let mut violations = Vec::new();
    let estimates = TemperatureEstimates::from_cpu_usage(raw.cpu_usage_pct);

    let temperature_sensors = previous
        .temperature_sensors
        .iter()
        .map(|sensor| {
            let candidate = estimates.baseline_for(sensor.category)
                + jitter.perturb(temperature_jitter(sensor.category));
            let value = bounded(
                &sensor.name,
                candidate,
                sensor.min_value(),
                sensor.max_value,
                &mut violations,
            );
            sensor.with_value(value)
        })
        .collect();

    let usage_sensors = previous
        .usage_sensors
        .iter()
        .map(|sensor| {
            let candidate = derive_usage(
                sensor.category,
                raw.cpu_usage_pct,
                raw.memory_usage_pct,
                jitter,
            );
            let value = bounded(
                &sensor.name,
                candidate,
                MIN_USAGE_PERCENT,
                MAX_USAGE_PERCENT,
                &mut violations,
            );
            sensor.with_value(value)
        })
        .collect();

    let reported = sanitize_fans(fans.clone());
    let fan_speeds = if reported.is_empty() {
        let mut synthetic = FanReadings::new();
        synthetic.insert(
            FALLBACK_FAN_NAME.to_string(),
            fallback_fan_speed(raw.cpu_usage_pct),
        );
        synthetic
    } else {
        reported
    };
    let reference_speed = fan_speeds
        .values()
        .next()
        .copied()
        .unwrap_or_else(|| fallback_fan_speed(raw.cpu_usage_pct));

    let fan_sensors = previous
        .fan_sensors
        .iter()
        .map(|fan| {
            let candidate = reference_speed + jitter.perturb(FAN_JITTER_RPM);
            let speed = bounded(
                &fan.name,
                candidate,
                fan.min_speed(),
                fan.max_speed,
                &mut violations,
            );
            fan.with_speed(speed)
        })
        .collect();

    let snapshot = SensorSnapshot {
        sequence: previous.sequence + 1,
        timestamp: chrono::Utc::now().timestamp(),
        cpu_temp: estimates.cpu,
        gpu_temp: estimates.gpu,
        storage_temp: estimates.storage,
        battery_temp: estimates.battery,
        cpu_usage: raw.cpu_usage_pct.max(MIN_USAGE_PERCENT).min(MAX_USAGE_PERCENT),
        memory_usage: raw
            .memory_usage_pct
            .max(MIN_USAGE_PERCENT)
            .min(MAX_USAGE_PERCENT),
        fan_speeds,
        probe_succeeded: raw.probe_succeeded,
        temperature_sensors,
        usage_sensors,
        fan_sensors,
    };

    UpdateOutcome {
        snapshot,
        violations,
    }
}

/// Clamp a candidate into `[lo, hi]`.
///
/// Anything that still ends up outside the range (or was never a number) is
/// a defect in the derivation; it is recorded and replaced by `lo`.
fn bounded(
    name: &str,
    candidate: f64,
    lo: f64,
    hi: f64,
    violations: &mut Vec<MonitorError>,
) -> f64 {
    if !candidate.is_finite() {
        violations.push(MonitorError::invariant_violation(name, candidate, lo, hi));
        return lo;
    }

    let value = candidate.max(lo).min(hi);
    match check_bounds(name, value, lo, hi) {
        Ok(value) => value,
        Err(violation) => {
            violations.push(violation);
            lo
        }
    }
}

pub fn check_bounds(name: &str, value: f64, lo: f64, hi: f64) -> Result<f64, MonitorError> {
    if value.is_finite() && value >= lo && value <= hi {
        Ok(value)
    } else {
        Err(MonitorError::invariant_violation(name, value, lo, hi))
    }
}

/// Every reading in `snapshot` that lies outside its declared bound
pub fn verify_bounds(snapshot: &SensorSnapshot) -> Vec<MonitorError> {
    let temps = snapshot
        .temperature_sensors
        .iter()
        .map(|s| check_bounds(&s.name, s.value, s.min_value(), s.max_value));
    let usage = snapshot
        .usage_sensors
        .iter()
        .map(|s| check_bounds(&s.name, s.value, MIN_USAGE_PERCENT, MAX_USAGE_PERCENT));
    let fans = snapshot
        .fan_sensors
        .iter()
        .map(|f| check_bounds(&f.name, f.speed, f.min_speed(), f.max_speed));

    temps.chain(usage).chain(fans).filter_map(|r| r.err()).collect()
}
