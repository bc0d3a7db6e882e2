use std::sync::Arc;

use crate::cli::args::SearchArgs;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::{Result, SanctionsError};
use crate::output;
use crate::query::QueryService;
use crate::refresh::Dataset;

/// Execute search command against the persisted snapshot (no network access)
pub async fn execute(args: SearchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let kind = args.dataset;
    let dataset = Arc::new(Dataset::from_config(kind, config)?);

    if !dataset.load_persisted().await {
        return Err(SanctionsError::Unavailable(format!(
            "no persisted {} snapshot at {}; run 'sanctions-watch fetch {}' first",
            kind,
            config.cache_file(kind).display(),
            kind.as_str()
        )));
    }

    let service = QueryService::new(dataset, config.search.default_limit);
    let outcome = service.search(&args.query, args.limit).await?;

    println!(
        "{}",
        output::format_records(kind, &outcome.data, outcome.total, format)?
    );
    Ok(())
}
