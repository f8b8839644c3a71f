use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;

use cli::{Cli, Command, TargetArgs};
use config::Config;

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize logging
    let directive = if args.verbose {
        "respatch=debug"
    } else {
        "respatch=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    // Load config
    let config = match Config::load(&args.config) {
        Ok(c) => {
            info!("Loaded config from {:?}", args.config);
            c
        }
        Err(e) => {
            if e
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
            {
                debug!("No config file at {:?}, using defaults", args.config);
            } else {
                warn!("Failed to load config: {:#}, using defaults", e);
            }
            Config::default()
        }
    };

    match args.command {
        Command::Patch(patch_args) => commands::patch::run(&patch_args, &config),
        Command::Scan { file, target } => {
            let resolution = config.resolution(&target)?;
            let table = config.pattern_table(&target)?;
            commands::scan::run(&file, &table, resolution)
        }
        Command::Signatures { export, patterns } => {
            let target = TargetArgs {
                resolution: None,
                patterns,
            };
            let table = config.pattern_table(&target)?;
            commands::signatures::run(&table, export.as_deref())
        }
        Command::Hexdump {
            file,
            offset,
            size,
            ascii,
        } => commands::hexdump::run(&file, &offset, size, ascii),
    }
}
