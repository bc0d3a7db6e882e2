use log::info;
use std::sync::Arc;

use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::error::Result;
use crate::query::QueryService;
use crate::refresh::{self, RefreshScheduler};
use crate::server;

/// Execute serve command: restore snapshots, refresh, schedule, serve
pub async fn execute(args: ServeArgs, config: &Config) -> Result<()> {
    let datasets = refresh::build_datasets(config)?;

    for dataset in &datasets {
        if dataset.load_persisted().await {
            let snapshot = dataset.snapshot().await;
            info!(
                "Restored {} snapshot: {} records",
                dataset.kind(),
                snapshot.count()
            );
        }
    }

    if args.no_initial_refresh {
        info!("Skipping initial refresh");
    } else {
        refresh::initial_refresh(&datasets).await;
    }

    let scheduler = RefreshScheduler::new(config.refresh_interval());
    let handles: Vec<_> = datasets
        .iter()
        .map(|dataset| scheduler.spawn(dataset.clone()))
        .collect();

    let services: Vec<Arc<QueryService>> = datasets
        .into_iter()
        .map(|dataset| Arc::new(QueryService::new(dataset, config.search.default_limit)))
        .collect();

    let bind = args.bind.as_deref().unwrap_or(&config.server.bind);
    let result = server::serve(bind, server::router(&services)).await;

    for handle in handles {
        handle.shutdown();
    }
    result
}
