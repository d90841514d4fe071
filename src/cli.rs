use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gardenops", version, about = "Plant health rule engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the configured output format
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one context snapshot (YAML or JSON)
    Evaluate {
        #[arg(short, long, value_enum, default_value_t = Domain::Plant)]
        domain: Domain,
        file: PathBuf,
    },
    /// Evaluate a list of context snapshots concurrently
    Batch {
        #[arg(short, long, value_enum, default_value_t = Domain::Plant)]
        domain: Domain,
        file: PathBuf,
    },
    /// List registered rules
    Rules {
        #[arg(short, long, value_enum)]
        domain: Option<Domain>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Domain {
    Plant,
    Zone,
    Sun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Text,
}
