use log::warn;
use std::sync::Arc;

use crate::api::{DatasetKind, SanctionRecord, SearchField};
use crate::cache::DatasetSnapshot;
use crate::error::{Result, SanctionsError};
use crate::refresh::Dataset;

pub const DEFAULT_SEARCH_LIMIT: usize = 100;

const STALE_WARNING: &str = "Failed to fetch fresh data - serving cached data";

/// Snapshot returned by a list request
#[derive(Debug, Clone)]
pub struct ListOutcome {
    pub snapshot: Arc<DatasetSnapshot>,
    /// True when served from the cache rather than a refresh made for this request
    pub cached: bool,
    pub warning: Option<String>,
}

/// Matches returned by a search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub data: Vec<SanctionRecord>,
    /// Number of records in `data`
    pub count: usize,
    /// Size of the whole dataset
    pub total: usize,
}

/// Case-insensitive substring search over `fields`, keeping cache order
pub fn search_records(
    records: &[SanctionRecord],
    query: &str,
    limit: usize,
    fields: &[SearchField],
) -> Vec<SanctionRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| {
            fields
                .iter()
                .any(|field| field.value(record).to_lowercase().contains(&needle))
        })
        .take(limit)
        .cloned()
        .collect()
}

/// Read-only queries over one dataset
pub struct QueryService {
    dataset: Arc<Dataset>,
    default_limit: usize,
}

impl QueryService {
    pub fn new(dataset: Arc<Dataset>, default_limit: usize) -> Self {
        Self {
            dataset,
            default_limit,
        }
    }

    pub fn kind(&self) -> DatasetKind {
        self.dataset.kind()
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Current snapshot, refreshing first when forced or when nothing is cached.
    /// A failed refresh falls back to the last good snapshot with a warning.
    pub async fn list(&self, force: bool) -> Result<ListOutcome> {
        let current = self.dataset.snapshot().await;
        if !force && !current.is_empty() {
            return Ok(ListOutcome {
                snapshot: current,
                cached: true,
                warning: None,
            });
        }

        let refreshed = if force {
            self.dataset.refresh().await
        } else {
            self.dataset.refresh_if_empty().await
        };

        match refreshed {
            Ok(snapshot) => Ok(ListOutcome {
                snapshot,
                cached: false,
                warning: None,
            }),
            Err(e) => {
                let fallback = self.dataset.snapshot().await;
                if fallback.is_empty() {
                    return Err(SanctionsError::Unavailable(format!(
                        "Failed to fetch {} data: {}",
                        self.kind(),
                        e
                    )));
                }
                warn!("Serving cached {} data after refresh failure: {}", self.kind(), e);
                Ok(ListOutcome {
                    snapshot: fallback,
                    cached: true,
                    warning: Some(STALE_WARNING.to_string()),
                })
            }
        }
    }

    /// Search the current snapshot; `limit` defaults to the configured cap
    pub async fn search(&self, query: &str, limit: Option<usize>) -> Result<SearchOutcome> {
        if query.is_empty() {
            return Err(SanctionsError::Validation(
                "Search query is required and must be a string".to_string(),
            ));
        }

        let snapshot = self.dataset.snapshot().await;
        let data = search_records(
            snapshot.records(),
            query,
            limit.unwrap_or(self.default_limit),
            self.kind().search_fields(),
        );

        Ok(SearchOutcome {
            count: data.len(),
            total: snapshot.count(),
            data,
        })
    }
}
