use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

use thermwatch::commands;

fn build_cli() -> Command {
    Command::new("thermwatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Periodically samples CPU, memory and fan sensors and prints thermal snapshots")
        .arg(
            Arg::new("simulated")
                .short('s')
                .long("simulated")
                .help("Use simulated random-walk readings instead of the OS")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("MS")
                .help("Sampling interval in milliseconds")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("count")
                .short('n')
                .long("count")
                .value_name("N")
                .help("Exit after printing N snapshots")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("N")
                .help("Seed the random jitter for reproducible output")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print one JSON object per snapshot")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Read settings from this file instead of the user config directory")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

fn main() -> Result<()> {
    thermwatch::init_logging();

    let matches = build_cli().get_matches();
    commands::watch(&matches)
}
