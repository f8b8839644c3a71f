//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "respatch")]
#[command(about = "Resolution patcher for pre-linked game executables", version)]
pub struct Cli {
    /// Config file with default options
    #[arg(short, long, global = true, default_value = "respatch.toml", env = "RESPATCH_CONFIG")]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Unpack (if possible) and patch a game executable
    Patch(PatchArgs),
    /// List the patches that would be applied, without writing anything
    Scan {
        /// File to scan
        file: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Show the pattern table or export it as JSON
    Signatures {
        /// Write the table to this JSON file
        #[arg(long)]
        export: Option<PathBuf>,
        /// Custom pattern table (JSON) instead of the built-in one
        #[arg(long)]
        patterns: Option<PathBuf>,
    },
    /// Dump bytes of a file, e.g. to check a patched field
    Hexdump {
        /// File to read
        file: PathBuf,
        /// Start offset (hex, with or without 0x)
        offset: String,
        /// Number of bytes
        #[arg(short, long, default_value_t = 64)]
        size: usize,
        /// Show ASCII column
        #[arg(short, long)]
        ascii: bool,
    },
}

/// Resolution and pattern table selection
#[derive(Args, Clone, Default)]
pub struct TargetArgs {
    /// Target resolution: 1080p, 1440p, 4k, or WIDTHxHEIGHT
    #[arg(short, long)]
    pub resolution: Option<String>,

    /// Custom pattern table (JSON) instead of the built-in one
    #[arg(long)]
    pub patterns: Option<PathBuf>,
}

#[derive(Args)]
pub struct PatchArgs {
    /// Game executable
    pub game: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Path to Steamless.CLI.exe (auto-detected when omitted)
    #[arg(long)]
    pub unpacker: Option<PathBuf>,

    /// Skip the unpack step
    #[arg(long)]
    pub no_unpack: bool,

    /// Overwrite the original executable
    #[arg(long)]
    pub replace: bool,

    /// Do not keep a .bak copy when replacing
    #[arg(long)]
    pub no_backup: bool,

    /// Keep the intermediate unpacked file
    #[arg(long)]
    pub keep_unpacked: bool,

    /// Write a JSON report of the applied patches
    #[arg(long)]
    pub report: Option<PathBuf>,
}
