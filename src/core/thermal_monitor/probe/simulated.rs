//! Probes that never touch the OS: a demo random walk and a fixed source.

use std::time::Duration;

use super::{FanReadings, HardwareProbe, RawMetrics};
use crate::core::thermal_monitor::jitter::Jitter;
use crate::error::ProbeError;

const SIM_CPU_START: f64 = 25.8;
const SIM_CPU_STEP: f64 = 5.0;
const SIM_CPU_RANGE: (f64, f64) = (5.0, 95.0);

const SIM_MEMORY_START: f64 = 67.2;
const SIM_MEMORY_STEP: f64 = 3.0;
const SIM_MEMORY_RANGE: (f64, f64) = (20.0, 90.0);

const SIM_FAN_STEP: f64 = 100.0;
const SIM_FAN_RANGE: (f64, f64) = (800.0, 3500.0);

/// Demo probe: utilization and fans wander randomly within plausible ranges
pub struct SimulatedProbe {
    cpu: f64,
    memory: f64,
    fans: FanReadings,
    jitter: Jitter,
}

impl SimulatedProbe {
    pub fn new(jitter: Jitter) -> Self {
        let mut fans = FanReadings::new();
        fans.insert("Fan 1".to_string(), 1800.0);
        fans.insert("Fan 2".to_string(), 1650.0);

        Self {
            cpu: SIM_CPU_START,
            memory: SIM_MEMORY_START,
            fans,
            jitter,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Jitter::seeded(seed))
    }

    fn walk(&mut self, value: f64, step: f64, (lo, hi): (f64, f64)) -> f64 {
        (value + self.jitter.perturb(step)).max(lo).min(hi)
    }
}

impl Default for SimulatedProbe {
    fn default() -> Self {
        Self::new(Jitter::from_entropy())
    }
}

impl HardwareProbe for SimulatedProbe {
    fn name(&self) -> &str {
        "simulated"
    }

    fn sample_cpu_and_memory_usage(&mut self) -> Result<RawMetrics, ProbeError> {
        self.cpu = self.walk(self.cpu, SIM_CPU_STEP, SIM_CPU_RANGE);
        self.memory = self.walk(self.memory, SIM_MEMORY_STEP, SIM_MEMORY_RANGE);
        Ok(RawMetrics::sampled(self.cpu, self.memory))
    }

    fn sample_fan_speeds(&mut self) -> FanReadings {
        let names: Vec<String> = self.fans.keys().cloned().collect();
        for name in names {
            let current = self.fans[&name];
            let next = self.walk(current, SIM_FAN_STEP, SIM_FAN_RANGE);
            self.fans.insert(name, next);
        }
        self.fans.clone()
    }
}

/// Probe returning the same answer every time.
///
/// Useful as a deterministic preview source and for exercising the
/// scheduler's failure and timeout handling.
#[derive(Debug, Clone)]
pub struct FixedProbe {
    outcome: Result<(f64, f64), ProbeError>,
    fans: FanReadings,
    delay: Option<Duration>,
}

impl FixedProbe {
    pub fn new(cpu_usage_pct: f64, memory_usage_pct: f64) -> Self {
        Self {
            outcome: Ok((cpu_usage_pct, memory_usage_pct)),
            fans: FanReadings::new(),
            delay: None,
        }
    }

    /// A probe whose every CPU/memory sample fails
    pub fn failing<S: Into<String>>(reason: S) -> Self {
        Self {
            outcome: Err(ProbeError::unavailable(reason)),
            fans: FanReadings::new(),
            delay: None,
        }
    }

    pub fn with_fans(mut self, fans: FanReadings) -> Self {
        self.fans = fans;
        self
    }

    /// Block for `delay` before answering, like a hung OS call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl HardwareProbe for FixedProbe {
    fn name(&self) -> &str {
        "fixed"
    }

    fn sample_cpu_and_memory_usage(&mut self) -> Result<RawMetrics, ProbeError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        match &self.outcome {
            Ok((cpu, memory)) => RawMetrics::sampled(*cpu, *memory).validate(),
            Err(e) => Err(e.clone()),
        }
    }

    fn sample_fan_speeds(&mut self) -> FanReadings {
        self.fans.clone()
    }
}
