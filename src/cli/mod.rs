pub mod args;
pub mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{Result, SanctionsError};

/// Sanctions list mirror
#[derive(Parser, Debug)]
#[command(
    name = "sanctions-watch",
    about = "Sanctions list mirror - ingests the OFAC SDN and EU consolidated lists and serves them over a JSON API",
    version,
    author,
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Configuration file (defaults to ~/.sanctions-watch/config.yaml)
    #[arg(short, long, global = true, env = "SANCTIONS_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the HTTP API with periodic refresh
    #[command(alias = "s")]
    Serve(args::ServeArgs),

    /// Fetch a dataset once and persist it
    #[command(alias = "f")]
    Fetch(args::FetchArgs),

    /// Search a persisted dataset
    #[command(alias = "q")]
    Search(args::SearchArgs),

    /// Manage configuration
    #[command(alias = "c")]
    Config(args::ConfigArgs),

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Generate shell completion scripts
    fn generate_completions(shell: Shell) {
        use clap::CommandFactory;
        use clap_complete::generate;
        use std::io;

        let mut cmd = Self::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
    }

    /// Run the CLI application
    pub async fn run() -> Result<()> {
        let cli = Self::parse();

        // The server logs its lifecycle at info; everything else stays quiet
        let default_filter = if cli.verbose {
            "debug"
        } else if matches!(cli.command, None | Some(Commands::Serve(_))) {
            "info"
        } else {
            "warn"
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
            .init();

        let result = cli.dispatch().await;

        // Handle errors with better messaging
        if let Err(e) = &result {
            eprintln!("Error: {}", e);
            if let Some(hint) = e.hint() {
                eprintln!("\nHint: {}", hint);
            }
            if matches!(e, SanctionsError::Parse(_) | SanctionsError::Decode(_)) && !cli.verbose {
                eprintln!("\nRun with --verbose for more details.");
            }
        }
        result
    }

    async fn dispatch(&self) -> Result<()> {
        let command = self
            .command
            .clone()
            .unwrap_or_else(|| Commands::Serve(args::ServeArgs::default()));

        match command {
            Commands::Config(args) => commands::config::execute(args, self.config.as_deref()),
            Commands::Version => {
                commands::version::execute();
                Ok(())
            }
            Commands::Completions { shell } => {
                Self::generate_completions(shell);
                Ok(())
            }
            Commands::Serve(args) => {
                let config = Config::load(self.config.as_deref())?;
                commands::serve::execute(args, &config).await
            }
            Commands::Fetch(args) => {
                let config = Config::load(self.config.as_deref())?;
                commands::fetch::execute(args, &config, self.format, self.verbose).await
            }
            Commands::Search(args) => {
                let config = Config::load(self.config.as_deref())?;
                commands::search::execute(args, &config, self.format).await
            }
        }
    }
}
