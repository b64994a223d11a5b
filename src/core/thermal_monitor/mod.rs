//! Thermal monitoring core.
//!
//! Owns the current sensor snapshot, refreshes it on a timer through a
//! pluggable hardware probe, derives synthetic per-sensor values from coarse
//! CPU and memory utilization, and publishes each new snapshot atomically.

pub mod estimation;
mod jitter;
pub mod levels;
pub mod probe;
mod scheduler;
pub mod sensors;
mod snapshot;
mod subscribers;
pub mod update;

pub use estimation::{derive_temperature, derive_usage, fallback_fan_speed, TemperatureEstimates};
pub use jitter::Jitter;
pub use levels::{
    evaluate_levels, LevelThresholds, ReadingAlert, ReadingKind, ReadingLevel,
};
pub use probe::{
    sanitize_fans, FanReadings, FixedProbe, HardwareProbe, LiveProbe, RawMetrics, SimulatedProbe,
};
pub use scheduler::{SamplingScheduler, SchedulerConfig, SchedulerState, StatsSnapshot};
pub use sensors::{FanSensor, SensorCategory, TemperatureSensor, UsageSensor};
pub use snapshot::SensorSnapshot;
pub use subscribers::{SnapshotCallback, SubscriberRegistry, SubscriptionHandle};
pub use update::{next_snapshot, verify_bounds, UpdateOutcome};
