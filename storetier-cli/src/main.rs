//! storetier: entitlement inspector
//!
//! Loads a commerce platform fixture, refreshes the catalog and entitlements,
//! and prints the resolved current subscription.
//!
//! Usage:
//!   storetier --fixture platform.json [--glyphs Projects.json] [--watch]
//!
//! With `--watch` the update listener keeps running, applying live
//! transaction updates, until Ctrl-C.

use std::{path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use storetier_cli::{load_config, load_fixture, Report};
use storetier_engine::{EntitlementEngine, UpdateListener};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "storetier")]
#[command(about = "Resolve the current subscription tier from signed platform records")]
struct Args {
    /// Path to the platform fixture (JSON)
    #[arg(short, long)]
    fixture: PathBuf,

    /// Path to an engine config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the product glyph map (JSON), overrides the config file
    #[arg(short, long)]
    glyphs: Option<PathBuf>,

    /// Platform call timeout in milliseconds, overrides the config file
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Keep listening for transaction updates until Ctrl-C
    #[arg(short, long)]
    watch: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(glyphs) = args.glyphs {
        config.glyph_map_path = Some(glyphs);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.fetch_timeout_ms = timeout_ms;
    }
    config.validate().context("Invalid configuration")?;

    let platform = Arc::new(load_fixture(&args.fixture)?);
    let engine = Arc::new(EntitlementEngine::new(platform, config));

    let report = Report::collect(&engine).await;
    print_report(&report, args.json)?;

    if !args.watch {
        return Ok(());
    }

    let listener = UpdateListener::spawn(engine.clone());
    let mut changes = engine.subscribe();
    info!("Watching for transaction updates, Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = changes.borrow_and_update().clone();
                info!(
                    "Entitlements changed (v{}): {} purchased, highest tier {}",
                    snapshot.version,
                    snapshot.purchased.len(),
                    snapshot.highest_purchased_tier()
                );
            }
        }
    }

    let stats = listener.shutdown().await;
    info!("Processed {} updates, rejected {}", stats.processed, stats.rejected);
    Ok(())
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.render());
    }
    Ok(())
}
