use log::{debug, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::DatasetSnapshot;
use crate::error::{Result, SanctionsError};

/// JSON file holding the last good snapshot of one dataset
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the snapshot, replacing the previous file in one rename
    pub async fn try_save(&self, snapshot: &DatasetSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    SanctionsError::Persistence(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let json = serde_json::to_vec_pretty(snapshot).map_err(|e| {
            SanctionsError::Persistence(format!("Failed to serialize snapshot: {}", e))
        })?;

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, &json).await.map_err(|e| {
            SanctionsError::Persistence(format!("Failed to write {}: {}", temp_path.display(), e))
        })?;
        tokio::fs::rename(&temp_path, &self.path).await.map_err(|e| {
            SanctionsError::Persistence(format!(
                "Failed to move snapshot into {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!("Wrote {} bytes to {}", json.len(), self.path.display());
        Ok(())
    }

    /// Best-effort save; failures are logged and reported as `false`
    pub async fn save(&self, snapshot: &DatasetSnapshot) -> bool {
        match self.try_save(snapshot).await {
            Ok(()) => {
                info!("Cache saved to {}", self.path.display());
                true
            }
            Err(e) => {
                warn!("Error saving cache to file: {}", e);
                false
            }
        }
    }

    /// Read the snapshot; `Ok(None)` when the file does not exist yet
    pub async fn try_load(&self) -> Result<Option<DatasetSnapshot>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SanctionsError::Persistence(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let snapshot: DatasetSnapshot = serde_json::from_slice(&bytes).map_err(|e| {
            SanctionsError::Persistence(format!("Corrupt snapshot {}: {}", self.path.display(), e))
        })?;

        if !snapshot.is_consistent() {
            return Err(SanctionsError::Persistence(format!(
                "Corrupt snapshot {}: count {} does not match {} records",
                self.path.display(),
                snapshot.count(),
                snapshot.records().len()
            )));
        }

        Ok(Some(snapshot))
    }

    /// Recoverable load: missing and corrupt files both yield `None`
    pub async fn load(&self) -> Option<DatasetSnapshot> {
        match self.try_load().await {
            Ok(Some(snapshot)) => {
                info!(
                    "Cache loaded from {} ({} entries)",
                    self.path.display(),
                    snapshot.count()
                );
                Some(snapshot)
            }
            Ok(None) => {
                info!("No cache file found at {}", self.path.display());
                None
            }
            Err(e) => {
                warn!("Ignoring unreadable cache file: {}", e);
                None
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
