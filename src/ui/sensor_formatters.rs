use colored::*;
use std::fmt::Write;

use crate::core::thermal_monitor::levels::{classify_fan, classify_temperature, classify_usage};
use crate::core::thermal_monitor::{
    evaluate_levels, LevelThresholds, ReadingLevel, SensorSnapshot,
};

fn paint(text: String, level: ReadingLevel) -> ColoredString {
    match level {
        ReadingLevel::Normal => text.green(),
        ReadingLevel::Elevated => text.yellow(),
        ReadingLevel::High => text.bright_red(),
        ReadingLevel::Critical => text.red().bold(),
    }
}

fn section_header(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title.bold().green());
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
}

/// Render one snapshot as a colored text report
pub fn format_snapshot(snapshot: &SensorSnapshot, thresholds: &LevelThresholds) -> String {
    let mut out = String::new();

    let source = if snapshot.probe_succeeded {
        "measured".green()
    } else {
        "estimated".yellow()
    };
    let _ = writeln!(
        out,
        "\n{} #{} ({})",
        "SENSOR SNAPSHOT".bold().bright_cyan(),
        snapshot.sequence,
        source
    );
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(
        out,
        "  CPU {:.1}°C  GPU {:.1}°C  Storage {:.1}°C  Battery {:.1}°C",
        snapshot.cpu_temp, snapshot.gpu_temp, snapshot.storage_temp, snapshot.battery_temp
    );

    section_header(&mut out, "Temperatures");
    for sensor in &snapshot.temperature_sensors {
        let level = classify_temperature(sensor.value, thresholds);
        let _ = writeln!(
            out,
            "  {:<26} {:>8}  {}",
            sensor.name,
            paint(format!("{:.1}°C", sensor.value), level),
            format!("max {:.0}°C", sensor.max_value).dimmed()
        );
    }

    section_header(&mut out, "Usage");
    for sensor in &snapshot.usage_sensors {
        let level = classify_usage(sensor.value, thresholds);
        let _ = writeln!(
            out,
            "  {:<26} {:>8}",
            sensor.name,
            paint(format!("{:.1}{}", sensor.value, sensor.unit), level)
        );
    }

    section_header(&mut out, "Fans");
    if snapshot.has_fan_data() {
        for fan in &snapshot.fan_sensors {
            let level = classify_fan(fan.speed, thresholds);
            let _ = writeln!(
                out,
                "  {:<26} {:>8}  {}",
                fan.name,
                paint(format!("{:.0} RPM", fan.speed), level),
                format!("max {:.0} RPM", fan.max_speed).dimmed()
            );
        }
    } else {
        let _ = writeln!(out, "  {}", "No fan sensors detected".dimmed());
    }

    let alerts = evaluate_levels(snapshot, thresholds);
    if !alerts.is_empty() {
        section_header(&mut out, "Alerts");
        for alert in &alerts {
            let _ = writeln!(
                out,
                "  {} {}",
                paint(format!("[{:?}]", alert.level), alert.level),
                alert.message
            );
        }
    }

    out
}

pub fn print_snapshot(snapshot: &SensorSnapshot, thresholds: &LevelThresholds) {
    print!("{}", format_snapshot(snapshot, thresholds));
}
