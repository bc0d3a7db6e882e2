use clap::{Args, Subcommand};

use crate::api::DatasetKind;

/// Serve command arguments
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen address, overrides server.bind
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Start serving persisted data without fetching first
    #[arg(long)]
    pub no_initial_refresh: bool,
}

/// Fetch command arguments
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Dataset to fetch
    #[arg(value_enum, default_value = "all")]
    pub target: FetchTarget,

    /// Do not write the snapshot to the storage directory
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FetchTarget {
    Ofac,
    Eu,
    All,
}

impl FetchTarget {
    pub fn datasets(&self) -> Vec<DatasetKind> {
        match self {
            FetchTarget::Ofac => vec![DatasetKind::Ofac],
            FetchTarget::Eu => vec![DatasetKind::Eu],
            FetchTarget::All => DatasetKind::ALL.to_vec(),
        }
    }
}

/// Search command arguments
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Dataset to search
    #[arg(value_enum)]
    pub dataset: DatasetKind,

    /// Case-insensitive substring to look for
    pub query: String,

    /// Maximum number of results (defaults to search.default_limit)
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Config command arguments
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init,
}
