//! seatbridge - replay raw seat events through the input bridge
//!
//! Runs a TOML script of display-server callbacks through the input
//! device, the dispatcher and the observer fan-out, and prints every
//! delivered message.

use anyhow::{anyhow, Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use seatbridge::config::Config;
use seatbridge::replay::{self, Script};

/// Print help message
fn print_help() {
    println!(
        r#"seatbridge {} - Wayland seat input bridge

USAGE:
    seatbridge [OPTIONS] SCRIPT.toml

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    -c, --config PATH       Use this config file instead of the default search

EXAMPLES:
    seatbridge demos/replay.toml
    RUST_LOG=info seatbridge demos/replay.toml    Also log observer notifications

CONFIG FILE:
    ~/.config/seatbridge/config.toml (or $SEATBRIDGE_CONFIG)
"#,
        env!("CARGO_PKG_VERSION")
    );
}

struct Args {
    config: Option<PathBuf>,
    script: PathBuf,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut config = None;
    let mut script = None;
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a path"))?;
                config = Some(PathBuf::from(path));
            }
            s if s.starts_with("--config=") => {
                config = Some(PathBuf::from(&s["--config=".len()..]));
            }
            s if s.starts_with('-') => return Err(anyhow!("Unknown option: {}", s)),
            s => {
                if script.replace(PathBuf::from(s)).is_some() {
                    return Err(anyhow!("Only one script can be replayed"));
                }
            }
        }
    }
    let script = script.ok_or_else(|| anyhow!("No script given (see --help)"))?;
    Ok(Args { config, script })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    // --help
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // --version
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("seatbridge {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let args = parse_args(&args)?;

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load(),
    };

    let script = Script::load(&args.script)?;
    let base_dir = args.script.parent().unwrap_or(Path::new("."));
    info!(
        "Replaying {} ({} steps)",
        args.script.display(),
        script.steps.len()
    );

    let report = replay::run(&script, base_dir, &config)
        .with_context(|| format!("Replay failed: {}", args.script.display()))?;

    for message in &report.messages {
        println!("#{:<4} {:?}", message.sequence, message.event);
    }
    for line in &report.notifications {
        println!("  -> {}", line);
    }
    Ok(())
}
