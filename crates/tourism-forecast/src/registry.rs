//! In-process model registry with optional on-disk snapshots.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::Result;
use crate::model::{ForecastModel, ModelTrainer, TrainingSeries};

/// Shared fitted models keyed by location.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Arc<dyn ForecastModel>>>,
    dir: Option<PathBuf>,
}

impl ModelRegistry {
    /// Registry without a snapshot directory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Registry persisting snapshots under `dir`.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            models: RwLock::default(),
            dir: Some(dir.into()),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn get(&self, location: &str) -> Option<Arc<dyn ForecastModel>> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(location)
            .cloned()
    }

    pub fn insert(&self, location: impl Into<String>, model: Arc<dyn ForecastModel>) {
        self.models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(location.into(), model);
    }

    /// Locations with a registered model, sorted.
    pub fn locations(&self) -> Vec<String> {
        let mut locations: Vec<_> = self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        locations.sort();
        locations
    }

    /// Snapshot file for a location, or `None` without a directory or for a
    /// location that is not a plain file stem.
    fn snapshot_path(&self, location: &str) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        if !is_plain_stem(location) {
            tracing::warn!(location, "Location is not a valid snapshot name");
            return None;
        }
        Some(dir.join(format!("{location}.json")))
    }

    /// Restore a model from its snapshot, refit it and register it.
    ///
    /// Returns `Ok(None)` when there is no snapshot directory or no file for
    /// the location.
    pub async fn load_snapshot(
        &self,
        location: &str,
        trainer: &dyn ModelTrainer,
    ) -> Result<Option<Arc<dyn ForecastModel>>> {
        let Some(path) = self.snapshot_path(location) else {
            return Ok(None);
        };

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let series: TrainingSeries = serde_json::from_str(&raw)?;
        let model = trainer.fit(&series)?;
        self.insert(location, Arc::clone(&model));

        tracing::info!(location, path = %path.display(), "Restored forecast model from snapshot");
        Ok(Some(model))
    }

    /// Write a model's training series to the snapshot directory. A no-op
    /// without a directory.
    pub async fn save_snapshot(&self, series: &TrainingSeries) -> Result<()> {
        let Some(path) = self.snapshot_path(&series.location) else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, serde_json::to_vec(series)?).await?;

        tracing::debug!(location = %series.location, path = %path.display(), "Saved model snapshot");
        Ok(())
    }
}

/// Letters, digits, spaces, `-` and `_` only, starting with a letter or digit.
fn is_plain_stem(location: &str) -> bool {
    location
        .chars()
        .next()
        .is_some_and(char::is_alphanumeric)
        && location
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
}
