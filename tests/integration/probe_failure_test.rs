// Integration tests for degraded sampling when the probe fails or hangs

use super::common::wait_until;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thermwatch::core::thermal_monitor::{
    fallback_fan_speed, verify_bounds, FixedProbe, Jitter, SamplingScheduler, SchedulerConfig,
    SensorSnapshot,
};

#[test]
fn test_failing_probe_still_publishes_valid_snapshots() {
    let scheduler = SamplingScheduler::with_parts(
        SchedulerConfig::new(Duration::from_millis(10)),
        Box::new(FixedProbe::failing("no permission")),
        Jitter::seeded(3),
        SensorSnapshot::seed(),
    )
    .unwrap();

    let snapshots = Arc::new(Mutex::new(Vec::new()));
    let sink = snapshots.clone();
    scheduler.subscribe(move |snapshot| sink.lock().push(snapshot.clone()));
    scheduler.start();

    assert!(wait_until(Duration::from_secs(2), || snapshots.lock().len() >= 5));
    let stats = scheduler.stats();
    scheduler.shutdown(Duration::from_secs(1));

    assert!(stats.probe_failures >= 5);
    assert_eq!(stats.invariant_violations, 0);

    for snapshot in snapshots.lock().iter().take(5) {
        assert!(!snapshot.probe_succeeded);
        assert!(verify_bounds(snapshot).is_empty());
        // no good sample yet, so estimates start from zero usage
        assert_eq!(snapshot.cpu_usage, 0.0);
        assert_eq!(snapshot.cpu_temp, 30.0);
        assert_eq!(snapshot.fan_speeds.len(), 1);
        assert_eq!(snapshot.fan_speeds.get("Fan 1"), Some(&fallback_fan_speed(0.0)));
        assert_eq!(snapshot.temperature_sensors.len(), 21);
    }
}

#[test]
fn test_hung_probe_is_cut_off_by_timeout() {
    let config = SchedulerConfig::new(Duration::from_millis(20))
        .with_probe_timeout(Duration::from_millis(30));
    let scheduler = SamplingScheduler::with_parts(
        config,
        Box::new(FixedProbe::new(50.0, 50.0).with_delay(Duration::from_secs(2))),
        Jitter::disabled(),
        SensorSnapshot::seed(),
    )
    .unwrap();
    scheduler.start();

    // Without the timeout nothing would publish for two seconds
    assert!(wait_until(Duration::from_secs(1), || scheduler.stats().published >= 3));
    let snapshot = scheduler.current_snapshot();
    let stats = scheduler.stats();
    scheduler.shutdown(Duration::from_millis(100));

    assert!(stats.probe_failures >= 3);
    assert!(!snapshot.probe_succeeded);
    assert!(verify_bounds(&snapshot).is_empty());
}

#[test]
fn test_sequence_keeps_advancing_through_failures() {
    let scheduler = SamplingScheduler::with_parts(
        SchedulerConfig::new(Duration::from_millis(10)),
        Box::new(FixedProbe::failing("sensor bus offline")),
        Jitter::disabled(),
        SensorSnapshot::seed(),
    )
    .unwrap();
    scheduler.start();

    assert!(wait_until(Duration::from_secs(2), || {
        scheduler.current_snapshot().sequence >= 10
    }));
    scheduler.shutdown(Duration::from_secs(1));
}

#[test]
fn test_unusable_fan_readings_are_discarded() {
    let mut fans = BTreeMap::new();
    fans.insert("Broken".to_string(), f64::NAN);
    fans.insert("Reversed".to_string(), -300.0);

    let scheduler = SamplingScheduler::with_parts(
        SchedulerConfig::new(Duration::from_millis(10)),
        Box::new(FixedProbe::new(40.0, 40.0).with_fans(fans)),
        Jitter::seeded(4),
        SensorSnapshot::seed(),
    )
    .unwrap();
    scheduler.start();

    assert!(wait_until(Duration::from_secs(2), || scheduler.stats().published >= 5));
    let snapshot = scheduler.current_snapshot();
    let stats = scheduler.stats();
    scheduler.shutdown(Duration::from_secs(1));

    assert_eq!(stats.invariant_violations, 0);
    assert_eq!(stats.probe_failures, 0);
    assert!(snapshot.probe_succeeded);
    assert_eq!(snapshot.fan_speeds.len(), 1);
    assert_eq!(snapshot.fan_speeds.get("Fan 1"), Some(&fallback_fan_speed(40.0)));
    assert!(verify_bounds(&snapshot).is_empty());
}
