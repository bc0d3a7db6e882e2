use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::{DatasetKind, SanctionsSource, SourceFactory};
use crate::cache::{DatasetCache, DatasetSnapshot, SnapshotFile};
use crate::config::Config;
use crate::error::Result;

/// Where a dataset is in its refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshState {
    /// No cycle has run yet
    Idle,
    Fetching,
    /// Last cycle replaced the cache
    Succeeded,
    /// Last cycle failed; the cache kept its previous snapshot
    Failed,
}

/// Observable outcome of the refresh history
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshStatus {
    pub state: RefreshState,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub successes: u64,
    pub failures: u64,
}

impl Default for RefreshStatus {
    fn default() -> Self {
        Self {
            state: RefreshState::Idle,
            last_success: None,
            last_failure: None,
            last_error: None,
            successes: 0,
            failures: 0,
        }
    }
}

/// One sanctions dataset: source, cache and optional snapshot file.
///
/// Runs fetch, parse, replace and save cycles. Cycles of the same dataset
/// never overlap: scheduled ticks skip while one is in flight and on-demand
/// refreshes queue behind it. A failed cycle leaves the cache untouched.
pub struct Dataset {
    kind: DatasetKind,
    source: Arc<dyn SanctionsSource>,
    cache: DatasetCache,
    store: Option<SnapshotFile>,
    in_flight: Mutex<()>,
    status: RwLock<RefreshStatus>,
}

impl Dataset {
    pub fn new(source: Arc<dyn SanctionsSource>, store: Option<SnapshotFile>) -> Self {
        Self {
            kind: source.dataset(),
            source,
            cache: DatasetCache::new(),
            store,
            in_flight: Mutex::new(()),
            status: RwLock::new(RefreshStatus::default()),
        }
    }

    /// Build a dataset from configuration, persisting to the configured data directory
    pub fn from_config(kind: DatasetKind, config: &Config) -> Result<Self> {
        let source = SourceFactory::create(kind, config)?;
        Ok(Self::new(source, Some(SnapshotFile::new(config.cache_file(kind)))))
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    pub fn store(&self) -> Option<&SnapshotFile> {
        self.store.as_ref()
    }

    pub async fn snapshot(&self) -> Arc<DatasetSnapshot> {
        self.cache.get().await
    }

    pub async fn status(&self) -> RefreshStatus {
        self.status.read().await.clone()
    }

    /// Install the persisted snapshot, if a readable one exists
    pub async fn load_persisted(&self) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        match store.load().await {
            Some(snapshot) => {
                self.cache.restore(snapshot).await;
                true
            }
            None => false,
        }
    }

    /// Run a refresh cycle, waiting for any cycle already in flight to finish first
    pub async fn refresh(&self) -> Result<Arc<DatasetSnapshot>> {
        let _guard = self.in_flight.lock().await;
        self.run_cycle().await
    }

    /// Run a refresh cycle only if the cache is still empty once the in-flight
    /// cycle (if any) has finished
    pub async fn refresh_if_empty(&self) -> Result<Arc<DatasetSnapshot>> {
        let _guard = self.in_flight.lock().await;
        let current = self.cache.get().await;
        if !current.is_empty() {
            debug!("{} cache filled while waiting, skipping refresh", self.kind);
            return Ok(current);
        }
        self.run_cycle().await
    }

    /// Run a refresh cycle unless one is already in flight (`None` when skipped)
    pub async fn try_refresh(&self) -> Option<Result<Arc<DatasetSnapshot>>> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("Refresh of {} already in flight, skipping", self.kind);
            return None;
        };
        Some(self.run_cycle().await)
    }

    async fn run_cycle(&self) -> Result<Arc<DatasetSnapshot>> {
        self.status.write().await.state = RefreshState::Fetching;
        let started = Instant::now();

        match self.source.fetch_records().await {
            Ok(records) => {
                let snapshot = self.cache.replace(records).await;
                info!(
                    "Fetched {} {} entries in {:.1}s",
                    snapshot.count(),
                    self.kind,
                    started.elapsed().as_secs_f64()
                );
                if let Some(store) = &self.store {
                    store.save(&snapshot).await;
                }

                let mut status = self.status.write().await;
                status.state = RefreshState::Succeeded;
                status.last_success = snapshot.last_updated();
                status.successes += 1;
                Ok(snapshot)
            }
            Err(e) => {
                error!("Error fetching {} data: {}", self.kind, e);
                if let Some(hint) = e.hint() {
                    debug!("{}", hint);
                }

                let mut status = self.status.write().await;
                status.state = RefreshState::Failed;
                status.last_failure = Some(Utc::now());
                status.last_error = Some(e.to_string());
                status.failures += 1;
                Err(e)
            }
        }
    }
}

/// Build every dataset from configuration
pub fn build_datasets(config: &Config) -> Result<Vec<Arc<Dataset>>> {
    DatasetKind::ALL
        .iter()
        .map(|kind| Dataset::from_config(*kind, config).map(Arc::new))
        .collect()
}

/// Startup refresh of all datasets, concurrently. Failures are logged and
/// the dataset keeps whatever snapshot it already had (possibly empty).
pub async fn initial_refresh(datasets: &[Arc<Dataset>]) {
    let results = join_all(datasets.iter().map(|dataset| dataset.refresh())).await;

    for (dataset, result) in datasets.iter().zip(results) {
        if let Err(e) = result {
            error!("Initial {} data fetch failed: {}", dataset.kind(), e);
            if dataset.cache().is_empty().await {
                warn!(
                    "No {} data available - server starting with empty dataset",
                    dataset.kind()
                );
            }
        }
    }
}

/// Spawns the periodic refresh task of a dataset
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    interval: Duration,
}

impl RefreshScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Start refreshing `dataset` every interval; the first tick fires one interval from now
    pub fn spawn(&self, dataset: Arc<Dataset>) -> SchedulerHandle {
        let period = self.interval;
        let kind = dataset.kind();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                debug!("Scheduled refresh of {}", kind);
                match dataset.try_refresh().await {
                    Some(Ok(_)) => {}
                    Some(Err(e)) => warn!("Scheduled {} refresh failed, keeping cached data: {}", kind, e),
                    None => info!("Skipped scheduled {} refresh: previous refresh still running", kind),
                }
            }
        });

        info!(
            "Scheduled {} refresh every {}s",
            kind,
            period.as_secs()
        );
        SchedulerHandle { dataset: kind, task }
    }
}

/// Handle to a running periodic refresh task
#[derive(Debug)]
pub struct SchedulerHandle {
    dataset: DatasetKind,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn dataset(&self) -> DatasetKind {
        self.dataset
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the periodic task; an in-flight cycle is abandoned
    pub fn shutdown(self) {
        debug!("Stopping {} refresh schedule", self.dataset);
        self.task.abort();
    }
}
