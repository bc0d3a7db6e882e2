use std::sync::Arc;

use crate::api::SourceFactory;
use crate::cache::SnapshotFile;
use crate::cli::args::FetchArgs;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::{Result, SanctionsError};
use crate::output::{self, RefreshSummary};
use crate::progress::{messages, FetchProgress, ProgressManager};
use crate::refresh::Dataset;

/// Execute fetch command: one refresh cycle per selected dataset
pub async fn execute(
    args: FetchArgs,
    config: &Config,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    // Spinners would corrupt machine-readable output
    let progress_manager = Arc::new(ProgressManager::new(format != OutputFormat::Table, verbose));
    let mut rows = Vec::new();

    for kind in args.target.datasets() {
        let store = (!args.no_save).then(|| SnapshotFile::new(config.cache_file(kind)));
        let dataset = Dataset::new(SourceFactory::create(kind, config)?, store);

        let progress = FetchProgress::new(progress_manager.clone(), kind);
        let row = match dataset.refresh().await {
            Ok(snapshot) => {
                progress.finish_with_message(&messages::fetch_complete(kind, snapshot.count()));
                RefreshSummary {
                    dataset: kind.as_str(),
                    count: Some(snapshot.count()),
                    last_updated: snapshot.last_updated(),
                    saved_to: dataset
                        .store()
                        .map(|store| store.path().display().to_string()),
                    error: None,
                }
            }
            Err(e) => {
                progress.fail_with_message(&messages::fetch_failed(kind));
                RefreshSummary {
                    dataset: kind.as_str(),
                    count: None,
                    last_updated: None,
                    saved_to: None,
                    error: Some(e.to_string()),
                }
            }
        };
        rows.push(row);
    }

    println!("{}", output::format_refresh_summary(&rows, format)?);

    let failed = rows.iter().filter(|row| row.error.is_some()).count();
    if failed > 0 {
        return Err(SanctionsError::Other(format!(
            "{} of {} refreshes failed",
            failed,
            rows.len()
        )));
    }
    Ok(())
}
