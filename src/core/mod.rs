// Core business logic module

pub mod config;
pub mod thermal_monitor;

// Re-export commonly used items
pub use config::{MonitorConfig, ProbeMode};
pub use thermal_monitor::{SamplingScheduler, SensorSnapshot};
