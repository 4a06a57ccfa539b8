mod cli;
mod config;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rttdump_lib::{ExtractOptions, FileEmitter, Snapshot, extract_channels};
use std::process;

use crate::cli::{Cli, merge_config};
use crate::config::RttDumpConfig;

fn run(args: &Cli) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            let config = RttDumpConfig::from_file(path)
                .map_err(|e| anyhow!("Failed to load config file '{}': {}", path, e))?;
            config
                .validate()
                .map_err(|e| anyhow!("Invalid config file '{}': {}", path, e))?;
            Some(config)
        }
        None => None,
    };

    let merged = merge_config(args, config)?;

    let snapshot = Snapshot::load(&merged.snapshot, merged.format)
        .with_context(|| format!("Failed to read snapshot {}", merged.snapshot.display()))?;
    let base_address = merged.base.resolve(snapshot.base_address)?;
    if let Some(recorded) = snapshot.base_address {
        if recorded != base_address {
            tracing::warn!(
                "Base address 0x{:08X} overrides 0x{:08X} recorded in the snapshot",
                base_address,
                recorded
            );
        }
    }
    tracing::info!("Using base address 0x{:08X}", base_address);

    let options = ExtractOptions {
        base_address,
        byte_order: merged.byte_order,
        search: merged.search,
    };
    let mut emitter = FileEmitter::new(&merged.output_dir, merged.prefix.clone());
    let report = extract_channels(&snapshot.data, &options, &mut emitter)
        .context("Failed to extract RTT channels")?;

    for path in emitter.written() {
        println!("{}", path.display());
    }
    tracing::info!(
        "{} up buffer(s) extracted, {} skipped",
        report.emitted(),
        report.skipped()
    );
    Ok(())
}

fn main() {
    // Log level can be controlled by setting the RUST_LOG environment variable, e.g.:
    // RUST_LOG=debug, RUST_LOG=rttdump_lib=trace, RUST_LOG=warn
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    let args = Cli::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
