use serde::{Deserialize, Serialize};

/// Lowest temperature a sensor is allowed to report after an update (°C)
pub const MIN_TEMPERATURE_CELSIUS: f64 = 20.0;
/// Usage percentages are always within this range
pub const MIN_USAGE_PERCENT: f64 = 0.0;
pub const MAX_USAGE_PERCENT: f64 = 100.0;
/// Lowest fan speed a sensor is allowed to report after an update (RPM)
pub const MIN_FAN_RPM: f64 = 800.0;

/// Functional grouping of a sensor, drives which derivation rule applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorCategory {
    Cpu,
    Gpu,
    Memory,
    Storage,
    Power,
    Network,
    Wireless,
    Ambient,
    Battery,
    Other,
}

impl SensorCategory {
    /// Guess the category from a human readable sensor name.
    ///
    /// Matching is substring based and checked in priority order, so
    /// "Power Supply Proximity" is Power and "Memory Proximity" is Memory.
    pub fn infer(name: &str) -> Self {
        let has = |needle: &str| name.contains(needle);

        if has("Core") || has("CPU") {
            SensorCategory::Cpu
        } else if has("GPU") {
            SensorCategory::Gpu
        } else if has("SSD") || has("Storage") || has("NAND") {
            SensorCategory::Storage
        } else if has("Battery") {
            SensorCategory::Battery
        } else if has("Memory") {
            SensorCategory::Memory
        } else if has("Ambient") {
            SensorCategory::Ambient
        } else if has("Power") {
            SensorCategory::Power
        } else if has("Wireless") || has("Wi-Fi") {
            SensorCategory::Wireless
        } else if has("Ethernet") || has("Network") {
            SensorCategory::Network
        } else {
            SensorCategory::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SensorCategory::Cpu => "CPU",
            SensorCategory::Gpu => "GPU",
            SensorCategory::Memory => "Memory",
            SensorCategory::Storage => "Storage",
            SensorCategory::Power => "Power",
            SensorCategory::Network => "Network",
            SensorCategory::Wireless => "Wireless",
            SensorCategory::Ambient => "Ambient",
            SensorCategory::Battery => "Battery",
            SensorCategory::Other => "Other",
        }
    }
}

impl std::fmt::Display for SensorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSensor {
    pub name: String,
    pub value: f64, // °C
    pub max_value: f64,
    pub category: SensorCategory,
    pub icon: String,
    pub color: String,
}

impl TemperatureSensor {
    pub fn new(
        name: impl Into<String>,
        value: f64,
        max_value: f64,
        category: SensorCategory,
        icon: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value,
            max_value,
            category,
            icon: icon.into(),
            color: color.into(),
        }
    }

    /// Build a sensor whose category, icon and color follow from its name
    pub fn named(name: impl Into<String>, value: f64, max_value: f64) -> Self {
        let name = name.into();
        let category = SensorCategory::infer(&name);
        let (icon, color) = default_presentation(category);
        Self::new(name, value, max_value, category, icon, color)
    }

    /// Same identity, new reading
    pub fn with_value(&self, value: f64) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }

    /// Lower bound an updated reading is clamped to
    pub fn min_value(&self) -> f64 {
        MIN_TEMPERATURE_CELSIUS.min(self.max_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSensor {
    pub name: String,
    pub value: f64, // percent
    pub category: SensorCategory,
    pub icon: String,
    pub color: String,
    pub unit: String,
}

impl UsageSensor {
    pub fn new(
        name: impl Into<String>,
        value: f64,
        category: SensorCategory,
        icon: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value,
            category,
            icon: icon.into(),
            color: color.into(),
            unit: "%".to_string(),
        }
    }

    pub fn with_value(&self, value: f64) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanSensor {
    pub name: String,
    pub speed: f64, // RPM
    pub max_speed: f64,
    pub icon: String,
    pub color: String,
}

impl FanSensor {
    pub fn new(name: impl Into<String>, speed: f64, max_speed: f64) -> Self {
        Self {
            name: name.into(),
            speed,
            max_speed,
            icon: "fan".to_string(),
            color: "cyan".to_string(),
        }
    }

    pub fn with_speed(&self, speed: f64) -> Self {
        Self {
            speed,
            ..self.clone()
        }
    }

    pub fn min_speed(&self) -> f64 {
        MIN_FAN_RPM.min(self.max_speed)
    }
}

/// Icon and color used for a category when the caller does not pick one
pub fn default_presentation(category: SensorCategory) -> (&'static str, &'static str) {
    match category {
        SensorCategory::Cpu => ("cpu", "blue"),
        SensorCategory::Gpu => ("display", "purple"),
        SensorCategory::Memory => ("memorychip", "green"),
        SensorCategory::Storage => ("internaldrive", "green"),
        SensorCategory::Power => ("bolt", "yellow"),
        SensorCategory::Network => ("network", "gray"),
        SensorCategory::Wireless => ("wifi", "gray"),
        SensorCategory::Ambient => ("thermometer", "gray"),
        SensorCategory::Battery => ("battery.100", "red"),
        SensorCategory::Other => ("thermometer", "gray"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_category_from_name() {
        assert_eq!(SensorCategory::infer("Efficiency Core 3"), SensorCategory::Cpu);
        assert_eq!(SensorCategory::infer("GPU Cluster"), SensorCategory::Gpu);
        assert_eq!(SensorCategory::infer("SSD (NAND I/O)"), SensorCategory::Storage);
        assert_eq!(SensorCategory::infer("Memory Proximity"), SensorCategory::Memory);
        assert_eq!(
            SensorCategory::infer("Power Supply Proximity"),
            SensorCategory::Power
        );
        assert_eq!(
            SensorCategory::infer("Wireless Proximity"),
            SensorCategory::Wireless
        );
        assert_eq!(SensorCategory::infer("Ethernet"), SensorCategory::Network);
        assert_eq!(SensorCategory::infer("Internal Ambient"), SensorCategory::Ambient);
        assert_eq!(SensorCategory::infer("Battery Cell"), SensorCategory::Battery);
        assert_eq!(SensorCategory::infer("Mystery Probe"), SensorCategory::Other);
    }

    #[test]
    fn test_with_value_preserves_identity() {
        let sensor = TemperatureSensor::named("GPU Cluster", 52.0, 100.0);
        let updated = sensor.with_value(61.5);

        assert_eq!(updated.name, sensor.name);
        assert_eq!(updated.icon, "display");
        assert_eq!(updated.color, "purple");
        assert_eq!(updated.max_value, 100.0);
        assert_eq!(updated.value, 61.5);
    }

    #[test]
    fn test_lower_bounds_never_exceed_upper_bounds() {
        let cold = TemperatureSensor::named("Odd Sensor", 10.0, 15.0);
        assert_eq!(cold.min_value(), 15.0);

        let slow = FanSensor::new("Tiny Fan", 500.0, 600.0);
        assert_eq!(slow.min_speed(), 600.0);
        assert_eq!(FanSensor::new("Main Fan", 1800.0, 4900.0).min_speed(), 800.0);
    }
}
