//! OS-backed probe.
//!
//! CPU and memory come from sysinfo. Fans come from Linux hwmon when the
//! platform exposes it. Temperatures are not read here; they are estimated from
//! CPU load like everywhere else.

use std::fs;
use std::path::{Path, PathBuf};

use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use super::{FanReadings, HardwareProbe, RawMetrics};
use crate::error::ProbeError;

#[cfg(target_os = "linux")]
const HWMON_ROOT: &str = "/sys/class/hwmon";

pub struct LiveProbe {
    system: System,
    hwmon_root: Option<PathBuf>,
    primed: bool,
}

impl LiveProbe {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());

        #[cfg(target_os = "linux")]
        let hwmon_root = Some(PathBuf::from(HWMON_ROOT));
        #[cfg(not(target_os = "linux"))]
        let hwmon_root = None;

        Self {
            system: System::new_with_specifics(refresh_kind),
            hwmon_root,
            primed: false,
        }
    }

    /// Read fans from a different hwmon tree (or none at all)
    pub fn with_hwmon_root(mut self, root: Option<PathBuf>) -> Self {
        self.hwmon_root = root;
        self
    }
}

impl Default for LiveProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareProbe for LiveProbe {
    fn name(&self) -> &str {
        "live"
    }

    fn sample_cpu_and_memory_usage(&mut self) -> Result<RawMetrics, ProbeError> {
        // CPU usage is a delta between two refreshes
        if !self.primed {
            self.system.refresh_cpu_usage();
            std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
            self.primed = true;
        }

        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        if self.system.cpus().is_empty() {
            return Err(ProbeError::unavailable("no CPU statistics available"));
        }

        let total = self.system.total_memory();
        if total == 0 {
            return Err(ProbeError::unavailable("no memory statistics available"));
        }

        let cpu = self.system.global_cpu_usage() as f64;
        let memory = (self.system.used_memory() as f64 / total as f64) * 100.0;

        RawMetrics::sampled(cpu, memory).validate()
    }

    fn sample_fan_speeds(&mut self) -> FanReadings {
        match self.hwmon_root.as_deref() {
            Some(root) => read_hwmon_fans(root),
            None => FanReadings::new(),
        }
    }
}

/// Collect `fan*_input` readings below an hwmon class directory.
///
/// Fans reporting 0 RPM are skipped; many boards expose unpopulated headers
/// that way.
pub fn read_hwmon_fans(root: &Path) -> FanReadings {
    let mut fans = FanReadings::new();

    let chips = match fs::read_dir(root) {
        Ok(chips) => chips,
        Err(_) => return fans,
    };

    for chip in chips.flatten() {
        let chip_path = chip.path();
        let chip_name = read_trimmed(&chip_path.join("name"))
            .unwrap_or_else(|| chip.file_name().to_string_lossy().to_string());

        let entries = match fs::read_dir(&chip_path) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let file_name = entry.file_name().to_string_lossy().to_string();
            let index = match file_name
                .strip_prefix("fan")
                .and_then(|rest| rest.strip_suffix("_input"))
            {
                Some(index) => index.to_string(),
                None => continue,
            };

            let rpm = match read_trimmed(&entry.path()).and_then(|s| s.parse::<f64>().ok()) {
                Some(rpm) if rpm > 0.0 && rpm.is_finite() => rpm,
                _ => continue,
            };

            let mut label = read_trimmed(&chip_path.join(format!("fan{}_label", index)))
                .unwrap_or_else(|| format!("{} fan{}", chip_name, index));
            if fans.contains_key(&label) {
                label = format!("{} {}", chip_name, label);
            }

            log::debug!("hwmon fan {} at {} RPM", label, rpm);
            fans.insert(label, rpm);
        }
    }

    fans
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
