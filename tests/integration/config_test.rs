// Tests for loading and saving the monitor configuration

use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use thermwatch::core::config::{MonitorConfig, ProbeMode};
use thermwatch::{HardwareProbe, MonitorError};

#[test]
fn test_save_then_load_preserves_settings() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let mut config = MonitorConfig::default();
    config.mode = ProbeMode::Simulated;
    config.simulated_interval_ms = 500;
    config.probe_timeout_ms = Some(200);
    config.seed = Some(42);
    config.thresholds.temp_critical = 95.0;

    config.save_to(&path).unwrap();
    let loaded = MonitorConfig::load_from(&path).unwrap();

    assert_eq!(loaded, config);
    assert_eq!(loaded.interval(), Duration::from_millis(500));
    assert_eq!(
        loaded.scheduler_config().probe_timeout,
        Duration::from_millis(200)
    );
}

#[test]
fn test_load_from_rejects_invalid_values() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{"live_interval_ms": 0}"#).unwrap();

    let result = MonitorConfig::load_from(&path);
    assert!(matches!(result, Err(MonitorError::Config(_))));
}

#[test]
fn test_load_from_rejects_malformed_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    let result = MonitorConfig::load_from(&path);
    assert!(matches!(result, Err(MonitorError::Serialization(_))));
}

#[test]
fn test_seeded_config_builds_reproducible_probe() {
    let config = MonitorConfig {
        mode: ProbeMode::Simulated,
        seed: Some(5),
        ..Default::default()
    };

    let mut first = config.build_probe();
    let mut second = config.build_probe();
    for _ in 0..10 {
        assert_eq!(
            first.sample_cpu_and_memory_usage().unwrap(),
            second.sample_cpu_and_memory_usage().unwrap()
        );
    }
}
