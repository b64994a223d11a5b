use serde::{Deserialize, Serialize};

use super::probe::FanReadings;
use super::sensors::*;

/// Complete, immutable set of sensor readings valid at one point in time.
///
/// Snapshots are never edited after construction. The scheduler builds a new
/// one per tick and swaps it in wholesale, so a reader holding an
/// `Arc<SensorSnapshot>` always sees a consistent set of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Publish order; the seed is 0 and every tick adds one
    pub sequence: u64,
    pub timestamp: i64, // Unix timestamp

    // Summary scalars, derived from the same raw metrics as the sensors
    pub cpu_temp: f64,
    pub gpu_temp: f64,
    pub storage_temp: f64,
    pub battery_temp: f64,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub fan_speeds: FanReadings,

    /// False when the readings are a fallback estimate
    pub probe_succeeded: bool,

    pub temperature_sensors: Vec<TemperatureSensor>,
    pub usage_sensors: Vec<UsageSensor>,
    pub fan_sensors: Vec<FanSensor>,
}

impl SensorSnapshot {
    /// Snapshot built around caller supplied sensors, with zeroed summaries
    pub fn from_sensors(
        temperature_sensors: Vec<TemperatureSensor>,
        usage_sensors: Vec<UsageSensor>,
        fan_sensors: Vec<FanSensor>,
    ) -> Self {
        Self {
            sequence: 0,
            timestamp: chrono::Utc::now().timestamp(),
            cpu_temp: 0.0,
            gpu_temp: 0.0,
            storage_temp: 0.0,
            battery_temp: 0.0,
            cpu_usage: 0.0,
            memory_usage: 0.0,
            fan_speeds: FanReadings::new(),
            probe_succeeded: false,
            temperature_sensors,
            usage_sensors,
            fan_sensors,
        }
    }

    /// Cold start state shown before the first tick completes
    pub fn seed() -> Self {
        let mut temperature_sensors = Vec::with_capacity(21);

        for (i, value) in [54.0, 53.0, 54.0, 54.0, 51.0, 58.0].iter().enumerate() {
            temperature_sensors.push(TemperatureSensor::named(
                format!("Efficiency Core {}", i + 1),
                *value,
                100.0,
            ));
        }
        for (i, value) in [55.0, 55.0, 55.0, 54.0].iter().enumerate() {
            temperature_sensors.push(TemperatureSensor::named(
                format!("Performance Core {}", i + 1),
                *value,
                100.0,
            ));
        }

        let rest = [
            ("GPU Cluster", 52.0, 100.0),
            ("GPU Cluster", 46.0, 100.0),
            ("Internal Ambient", 45.0, 80.0),
            ("Ethernet", 45.0, 80.0),
            ("Memory Proximity", 42.0, 80.0),
            ("Memory Proximity", 48.0, 80.0),
            ("Power Supply", 41.0, 80.0),
            ("Power Supply Proximity", 48.0, 80.0),
            ("Wireless Proximity", 34.0, 80.0),
            ("SSD", 41.0, 70.0),
            ("SSD (NAND I/O)", 39.0, 70.0),
        ];
        temperature_sensors.extend(
            rest.iter()
                .map(|(name, value, max)| TemperatureSensor::named(*name, *value, *max)),
        );

        let usage_sensors = vec![
            UsageSensor::new("CPU Usage", 25.8, SensorCategory::Cpu, "cpu", "blue"),
            UsageSensor::new(
                "Memory Usage",
                67.2,
                SensorCategory::Memory,
                "memorychip",
                "purple",
            ),
            UsageSensor::new("GPU Usage", 15.3, SensorCategory::Gpu, "display", "purple"),
        ];

        let fan_sensors = vec![
            FanSensor::new("Main Fan", 1800.0, 4900.0),
            FanSensor::new("Secondary Fan", 1650.0, 4900.0),
        ];

        let mut fan_speeds = FanReadings::new();
        fan_speeds.insert("Fan 1".to_string(), 1800.0);
        fan_speeds.insert("Fan 2".to_string(), 1650.0);

        Self {
            cpu_temp: 45.5,
            gpu_temp: 52.3,
            storage_temp: 38.7,
            battery_temp: 32.1,
            cpu_usage: 25.8,
            memory_usage: 67.2,
            fan_speeds,
            ..Self::from_sensors(temperature_sensors, usage_sensors, fan_sensors)
        }
    }

    pub fn temperatures_in(
        &self,
        category: SensorCategory,
    ) -> impl Iterator<Item = &TemperatureSensor> + '_ {
        self.temperature_sensors
            .iter()
            .filter(move |s| s.category == category)
    }

    pub fn usage_in(&self, category: SensorCategory) -> impl Iterator<Item = &UsageSensor> + '_ {
        self.usage_sensors
            .iter()
            .filter(move |s| s.category == category)
    }

    /// Mean temperature of a category, `None` when it has no sensors
    pub fn average_temperature(&self, category: SensorCategory) -> Option<f64> {
        let (sum, count) = self
            .temperatures_in(category)
            .fold((0.0, 0usize), |(sum, count), s| (sum + s.value, count + 1));

        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    pub fn hottest(&self) -> Option<&TemperatureSensor> {
        self.temperature_sensors.iter().max_by(|a, b| {
            a.value
                .partial_cmp(&b.value)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// False on hardware without any fan telemetry or fan sensors
    pub fn has_fan_data(&self) -> bool {
        !self.fan_sensors.is_empty()
    }
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self::seed()
    }
}
