//! Fixed linear models for values the probe cannot supply.
//!
//! Everything here is a pure function of the coarse CPU and memory
//! utilization; randomness is applied by the caller through [`Jitter`].
//!
//! [`Jitter`]: super::jitter::Jitter

use super::jitter::Jitter;
use super::sensors::SensorCategory;

pub const CPU_TEMP_BASE: f64 = 30.0;
pub const CPU_TEMP_PER_PERCENT: f64 = 0.5;
pub const GPU_TEMP_BASE: f64 = 35.0;
pub const GPU_TEMP_PER_PERCENT: f64 = 0.3;
pub const STORAGE_TEMP: f64 = 25.0;
pub const BATTERY_TEMP: f64 = 25.0;

/// Memory modules sit near the SoC and track its temperature at a discount
const MEMORY_TEMP_FACTOR: f64 = 0.8;
const AMBIENT_TEMP_FACTOR: f64 = 0.7;

const GPU_USAGE_FACTOR: f64 = 0.6;
pub const GPU_USAGE_JITTER: f64 = 5.0;

pub const FAN_BASE_RPM: f64 = 1000.0;
pub const FAN_FALLBACK_MAX_RPM: f64 = 3000.0;

/// Summary temperatures derived from one set of raw metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureEstimates {
    pub cpu: f64,
    pub gpu: f64,
    pub storage: f64,
    pub battery: f64,
}

impl TemperatureEstimates {
    pub fn from_cpu_usage(cpu_usage_pct: f64) -> Self {
        Self {
            cpu: derive_temperature(SensorCategory::Cpu, cpu_usage_pct),
            gpu: derive_temperature(SensorCategory::Gpu, cpu_usage_pct),
            storage: derive_temperature(SensorCategory::Storage, cpu_usage_pct),
            battery: derive_temperature(SensorCategory::Battery, cpu_usage_pct),
        }
    }

    /// Baseline an individual sensor of `category` is pulled toward
    pub fn baseline_for(&self, category: SensorCategory) -> f64 {
        match category {
            SensorCategory::Cpu => self.cpu,
            SensorCategory::Gpu => self.gpu,
            SensorCategory::Storage => self.storage,
            SensorCategory::Battery => self.battery,
            SensorCategory::Memory => self.cpu * MEMORY_TEMP_FACTOR,
            SensorCategory::Ambient
            | SensorCategory::Power
            | SensorCategory::Network
            | SensorCategory::Wireless
            | SensorCategory::Other => self.cpu * AMBIENT_TEMP_FACTOR,
        }
    }
}

/// Estimated temperature (°C) of a category's summary sensor
pub fn derive_temperature(category: SensorCategory, cpu_usage_pct: f64) -> f64 {
    let cpu_temp = CPU_TEMP_BASE + cpu_usage_pct * CPU_TEMP_PER_PERCENT;

    match category {
        SensorCategory::Cpu => cpu_temp,
        SensorCategory::Gpu => GPU_TEMP_BASE + cpu_usage_pct * GPU_TEMP_PER_PERCENT,
        SensorCategory::Storage => STORAGE_TEMP,
        SensorCategory::Battery => BATTERY_TEMP,
        SensorCategory::Memory => cpu_temp * MEMORY_TEMP_FACTOR,
        SensorCategory::Ambient
        | SensorCategory::Power
        | SensorCategory::Network
        | SensorCategory::Wireless
        | SensorCategory::Other => cpu_temp * AMBIENT_TEMP_FACTOR,
    }
}

/// Utilization (%) for a usage sensor. GPU load is not measured, it is
/// approximated from CPU load with a little noise.
pub fn derive_usage(
    category: SensorCategory,
    cpu_usage_pct: f64,
    memory_usage_pct: f64,
    jitter: &mut Jitter,
) -> f64 {
    match category {
        SensorCategory::Memory => memory_usage_pct,
        SensorCategory::Gpu => cpu_usage_pct * GPU_USAGE_FACTOR + jitter.perturb(GPU_USAGE_JITTER),
        _ => cpu_usage_pct,
    }
}

/// Synthetic fan speed used when the probe reports no fans
pub fn fallback_fan_speed(cpu_usage_pct: f64) -> f64 {
    FAN_BASE_RPM + (cpu_usage_pct / 100.0) * (FAN_FALLBACK_MAX_RPM - FAN_BASE_RPM)
}

/// Half-width of the random perturbation applied to a temperature sensor
pub fn temperature_jitter(category: SensorCategory) -> f64 {
    match category {
        SensorCategory::Cpu | SensorCategory::Gpu => 2.0,
        _ => 1.0,
    }
}
