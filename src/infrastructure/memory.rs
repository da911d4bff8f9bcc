use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::domain::collection::Collections;
use crate::domain::errors::DomainError;
use crate::domain::ports::RecordStore;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl<T> From<PoisonError<T>> for DomainError {
    fn from(_: PoisonError<T>) -> Self {
        DomainError::Internal("record store lock poisoned".to_string())
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// In-process record store, optionally mirrored to a JSON snapshot file.
pub struct InMemoryStore {
    state: RwLock<Collections>,
    snapshot: Option<PathBuf>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Collections::default()),
            snapshot: None,
        }
    }

    /// Open a store backed by `path`, loading it when the file exists.
    ///
    /// Every successful write rewrites the snapshot.
    pub fn with_snapshot(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let collections = if path.exists() {
            let text = fs::read_to_string(&path)?;
            let collections: Collections = serde_json::from_str(&text)?;
            collections.validate().map_err(|e| {
                DomainError::Internal(format!("snapshot {} rejected: {}", path.display(), e))
            })?;
            log::info!(
                "Loaded snapshot {} ({} products, {} purchase orders, {} sales orders)",
                path.display(),
                collections.products.len(),
                collections.purchase_orders.len(),
                collections.sales_orders.len()
            );
            collections
        } else {
            log::info!("No snapshot at {}, starting empty", path.display());
            Collections::default()
        };

        Ok(Self {
            state: RwLock::new(collections),
            snapshot: Some(path),
        })
    }

    fn persist(&self, collections: &Collections) -> Result<(), DomainError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        write_snapshot(path, collections).map_err(|e| {
            log::error!("Failed to write snapshot {}: {}", path.display(), e);
            e
        })
    }
}

/// Write to a sibling temp file and rename it over the snapshot.
fn write_snapshot(path: &Path, collections: &Collections) -> Result<(), DomainError> {
    let text = serde_json::to_string_pretty(collections)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl RecordStore for InMemoryStore {
    fn read<T>(
        &self,
        f: impl FnOnce(&Collections) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let state = self.state.read()?;
        f(&state)
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut Collections) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut state = self.state.write()?;

        // Work on a copy so a failing operation cannot leave half its changes behind.
        let mut working = state.clone();
        let result = f(&mut working)?;
        self.persist(&working)?;
        *state = working;
        Ok(result)
    }
}
