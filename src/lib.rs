// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine_args;
pub mod errors;
pub mod logging;
pub mod session;
pub mod splice;
pub mod status;
pub mod supervisor;
pub mod types;
pub mod verify;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, CliCommand};
use crate::config::{load_and_resolve, normalize, save, ConfigRecord, ResolvedConfig};
use crate::session::{InjectionReport, Session};
use crate::status::StatusReporter;

/// High-level entry point used by `main.rs`.
///
/// Dispatches on the subcommand. The config is loaded once per invocation
/// and stays fixed for the whole session.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);

    match args.command {
        CliCommand::Inject { kind, count } => {
            let mut session = Session::new(load_config(&config_path)?);
            for cycle in 1..=count {
                debug!(cycle, count, "starting injection cycle");
                let report = session.inject(kind).await?;
                print_report(&report);
                report.ensure_not_crashed()?;
                if report.interrupted {
                    info!("interrupted; skipping remaining cycles");
                    break;
                }
            }
        }
        CliCommand::Cancel { event_id } => {
            let mut session = Session::new(load_config(&config_path)?);
            let report = session.cancel(event_id).await?;
            print_report(&report);
            report.ensure_not_crashed()?;
        }
        CliCommand::Args { kind } => {
            let mut session = Session::new(load_config(&config_path)?);
            let (command, argv) = session.plan(kind)?;
            println!("# event_id={} kind={kind}", command.event_id);
            println!("{}", argv.join(" "));
        }
        CliCommand::Status => {
            let cfg = load_config(&config_path)?;
            let reporter = StatusReporter::new(&cfg.engine.marker_dir, cfg.summary());
            println!("{}", reporter.snapshot());
        }
        CliCommand::Init { force } => init_config(&config_path, force)?,
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<ResolvedConfig> {
    load_and_resolve(path).with_context(|| format!("loading config {}", path.display()))
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    save(&normalize(ConfigRecord::default()), path)?;
    println!("wrote {}", path.display());
    Ok(())
}

fn print_report(report: &InjectionReport) {
    let cmd = &report.command;
    if cmd.cancel {
        println!("event {}: cancelled", cmd.event_id);
    } else {
        println!(
            "event {}: out_of_network={} immediate={} pts={} duration={}s",
            cmd.event_id,
            cmd.out_of_network,
            cmd.immediate,
            cmd.pts_time
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            cmd.duration_secs(),
        );
    }
    println!("  splice file: {}", report.marker_file.display());
    println!("  engine:      {}", report.final_state);
    println!(
        "  markers:     {} observed{}",
        report.observations.len(),
        if report.marker_seen() { "" } else { " (none seen)" }
    );
    for obs in &report.observations {
        println!("    [{}] {}", obs.keyword, obs.raw_line);
    }
}
