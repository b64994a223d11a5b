//! Reading levels for flagging hot, busy or loud sensors.
//!
//! Evaluates a snapshot against configurable thresholds and reports every
//! reading that is above normal.

use super::snapshot::SensorSnapshot;
use serde::{Deserialize, Serialize};

/// Thresholds a reading must exceed to reach each level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelThresholds {
    pub temp_elevated: f64,  // °C
    pub temp_high: f64,      // °C
    pub temp_critical: f64,  // °C
    pub usage_elevated: f64, // %
    pub usage_high: f64,     // %
    pub usage_critical: f64, // %
    pub fan_elevated: f64,   // RPM
    pub fan_high: f64,       // RPM
    pub fan_critical: f64,   // RPM
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            temp_elevated: 60.0,
            temp_high: 70.0,
            temp_critical: 80.0,
            usage_elevated: 70.0,
            usage_high: 80.0,
            usage_critical: 90.0,
            fan_elevated: 2000.0,
            fan_high: 3000.0,
            fan_critical: 4000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReadingLevel {
    Normal,
    Elevated,
    High,
    Critical,
}

impl ReadingLevel {
    /// Strictly above a threshold escalates
    fn from_thresholds(value: f64, elevated: f64, high: f64, critical: f64) -> Self {
        if value > critical {
            ReadingLevel::Critical
        } else if value > high {
            ReadingLevel::High
        } else if value > elevated {
            ReadingLevel::Elevated
        } else {
            ReadingLevel::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingKind {
    Temperature,
    Usage,
    Fan,
}

/// A sensor reading above normal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingAlert {
    pub level: ReadingLevel,
    pub kind: ReadingKind,
    pub sensor: String,
    pub message: String,
    pub value: f64,
}

pub fn classify_temperature(celsius: f64, thresholds: &LevelThresholds) -> ReadingLevel {
    ReadingLevel::from_thresholds(
        celsius,
        thresholds.temp_elevated,
        thresholds.temp_high,
        thresholds.temp_critical,
    )
}

pub fn classify_usage(percent: f64, thresholds: &LevelThresholds) -> ReadingLevel {
    ReadingLevel::from_thresholds(
        percent,
        thresholds.usage_elevated,
        thresholds.usage_high,
        thresholds.usage_critical,
    )
}

pub fn classify_fan(rpm: f64, thresholds: &LevelThresholds) -> ReadingLevel {
    ReadingLevel::from_thresholds(
        rpm,
        thresholds.fan_elevated,
        thresholds.fan_high,
        thresholds.fan_critical,
    )
}

/// Evaluate every sensor in a snapshot, most severe first
pub fn evaluate_levels(
    snapshot: &SensorSnapshot,
    thresholds: &LevelThresholds,
) -> Vec<ReadingAlert> {
    let mut alerts = Vec::new();

    for sensor in &snapshot.temperature_sensors {
        let level = classify_temperature(sensor.value, thresholds);
        if level != ReadingLevel::Normal {
            alerts.push(ReadingAlert {
                level,
                kind: ReadingKind::Temperature,
                sensor: sensor.name.clone(),
                message: format!("{} at {:.1}°C", sensor.name, sensor.value),
                value: sensor.value,
            });
        }
    }

    for sensor in &snapshot.usage_sensors {
        let level = classify_usage(sensor.value, thresholds);
        if level != ReadingLevel::Normal {
            alerts.push(ReadingAlert {
                level,
                kind: ReadingKind::Usage,
                sensor: sensor.name.clone(),
                message: format!("{} at {:.1}{}", sensor.name, sensor.value, sensor.unit),
                value: sensor.value,
            });
        }
    }

    for fan in &snapshot.fan_sensors {
        let level = classify_fan(fan.speed, thresholds);
        if level != ReadingLevel::Normal {
            alerts.push(ReadingAlert {
                level,
                kind: ReadingKind::Fan,
                sensor: fan.name.clone(),
                message: format!("{} at {:.0} RPM", fan.name, fan.speed),
                value: fan.speed,
            });
        }
    }

    // stable, so sensor order is kept within a level
    alerts.sort_by(|a, b| b.level.cmp(&a.level));
    alerts
}
