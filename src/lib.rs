// Thermwatch Library - Public API

// Re-export error types
pub mod error;
pub use error::{MonitorError, ProbeError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use core::config::{MonitorConfig, ProbeMode};
pub use core::thermal_monitor::{
    HardwareProbe, RawMetrics, SamplingScheduler, SchedulerConfig, SensorSnapshot,
};

// Initialize logging; RUST_LOG overrides the default level
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
