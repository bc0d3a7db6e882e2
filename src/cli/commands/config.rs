use std::path::{Path, PathBuf};

use crate::cli::args::{ConfigArgs, ConfigCommand};
use crate::config::Config;
use crate::error::Result;

/// Execute config command
pub fn execute(args: ConfigArgs, path: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load(path)?;
            print!("{}", config.to_yaml()?);
            Ok(())
        }
        ConfigCommand::Path => {
            println!("Configuration file: {}", resolve(path)?.display());
            Ok(())
        }
        ConfigCommand::Init => {
            let file = resolve(path)?;
            if Config::initialize(&file)? {
                println!("✅ Configuration initialized: {}", file.display());
            } else {
                println!("Configuration already exists: {}", file.display());
            }
            println!();
            println!("Environment variables override the file, for example:");
            println!("  SANCTIONS_REFRESH__INTERVAL_SECS=3600");
            println!("  SANCTIONS_SERVER__BIND=0.0.0.0:3000");
            Ok(())
        }
    }
}

fn resolve(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::config_file_path(),
    }
}
