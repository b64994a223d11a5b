//! Watch command handler.
//!
//! Starts the sampling scheduler and prints every published snapshot.

use anyhow::{Context, Result};
use clap::ArgMatches;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use crate::core::config::{MonitorConfig, ProbeMode};
use crate::core::thermal_monitor::{SamplingScheduler, SensorSnapshot};
use crate::ui::sensor_formatters::print_snapshot;

/// Build the effective config: file (explicit or default location), then flags
pub fn resolve_config(matches: &ArgMatches) -> Result<MonitorConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => MonitorConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => MonitorConfig::load().context("Failed to load config")?,
    };

    if matches.get_flag("simulated") {
        config.mode = ProbeMode::Simulated;
    }

    if let Some(&interval) = matches.get_one::<u64>("interval") {
        match config.mode {
            ProbeMode::Live => config.live_interval_ms = interval,
            ProbeMode::Simulated => config.simulated_interval_ms = interval,
        }
    }

    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config.seed = Some(seed);
    }

    config.validate()?;
    Ok(config)
}

/// Execute the watch command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(matches)?;
    let count = matches.get_one::<u64>("count").map(|&n| n as usize);
    if count == Some(0) {
        return Ok(());
    }
    let json_output = matches.get_flag("json");

    log::info!(
        "Watching sensors ({:?} mode, every {:?})",
        config.mode,
        config.interval()
    );

    let scheduler = SamplingScheduler::with_parts(
        config.scheduler_config(),
        config.build_probe(),
        config.jitter(),
        SensorSnapshot::seed(),
    )
    .context("Failed to create sampling scheduler")?;

    let (done_tx, done_rx) = mpsc::channel::<()>();

    let ctrlc_tx = done_tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(());
    })
    .context("Failed to install Ctrl-C handler")?;

    let printed = Arc::new(AtomicUsize::new(0));
    let thresholds = config.thresholds.clone();
    let printed_in_callback = printed.clone();
    scheduler.subscribe(move |snapshot| {
        if let Some(limit) = count {
            if printed_in_callback.load(Ordering::SeqCst) >= limit {
                return;
            }
        }

        if json_output {
            match serde_json::to_string(snapshot.as_ref()) {
                Ok(line) => println!("{}", line),
                Err(e) => log::error!("Failed to serialize snapshot: {}", e),
            }
        } else {
            print_snapshot(snapshot, &thresholds);
        }

        let seen = printed_in_callback.fetch_add(1, Ordering::SeqCst) + 1;
        if count.is_some_and(|limit| seen >= limit) {
            let _ = done_tx.send(());
        }
    });

    scheduler.start();

    // Ctrl-C or --count reached
    let _ = done_rx.recv();
    scheduler.shutdown(Duration::from_secs(1));

    log::info!("Printed {} snapshots", printed.load(Ordering::SeqCst));
    Ok(())
}
