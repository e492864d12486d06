use crate::api::models::Hero;
use crate::error::AppError;
use crate::matrix::builder::{Matrix, VsRawMap};
use crate::matrix::topk::TopKMatrix;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

pub const SNAPSHOT_SCHEMA: &str = "matrix-topk/1";

/// Persisted top-K bundle read by the advisor. A snapshot is valid only
/// when both maps are non-empty; anything else is treated as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixSnapshot {
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: String,
    pub top_allies: TopKMatrix,
    pub top_opponents: TopKMatrix,
}

impl MatrixSnapshot {
    pub fn new(source: &str, top_allies: TopKMatrix, top_opponents: TopKMatrix) -> Self {
        MatrixSnapshot {
            schema: SNAPSHOT_SCHEMA.to_string(),
            generated_at: Some(Utc::now()),
            source: source.to_string(),
            top_allies,
            top_opponents,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.top_allies.is_empty() && !self.top_opponents.is_empty()
    }
}

/// Dated raw fetch results, written next to the matrix snapshot for
/// provenance.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot<'a> {
    pub date: String,
    pub heroes: &'a [Hero],
    pub all_vs_raw: &'a VsRawMap,
}

/// Dated full-matrix companion to the top-K snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullMatrixSnapshot<'a> {
    pub date: String,
    pub vs_matrix: &'a Matrix,
    pub with_matrix: &'a Matrix,
    pub top_allies: &'a TopKMatrix,
    pub top_opponents: &'a TopKMatrix,
}

/// Serialize to a temp file in the target directory, then rename into
/// place, so a crash mid-write never leaves a torn snapshot readable.
pub fn save_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read and validate a snapshot file. Empty maps are rejected the same
/// way a malformed file is.
pub fn load_snapshot(path: &Path) -> Result<MatrixSnapshot, AppError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::SnapshotInvalid(format!("{}: {}", path.display(), e)))?;
    let snapshot: MatrixSnapshot = serde_json::from_str(&content)
        .map_err(|e| AppError::SnapshotInvalid(format!("{}: {}", path.display(), e)))?;
    if !snapshot.is_valid() {
        return Err(AppError::SnapshotInvalid(format!(
            "{}: topAllies/topOpponents empty",
            path.display()
        )));
    }
    Ok(snapshot)
}

/// Process-wide snapshot reference. Readers clone the current Arc and
/// always see a whole snapshot or none; a reload swaps the reference
/// only after the new file passed validation, so a failed reload leaves
/// the previous state untouched.
pub struct SnapshotStore {
    path: PathBuf,
    current: RwLock<Option<Arc<MatrixSnapshot>>>,
}

impl SnapshotStore {
    pub fn new(path: PathBuf) -> Self {
        SnapshotStore {
            path,
            current: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Currently published snapshot, if any.
    pub fn current(&self) -> Option<Arc<MatrixSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Load the snapshot file and publish it. On failure the previous
    /// snapshot (or the not-loaded state) is retained.
    pub fn reload(&self) -> Result<Arc<MatrixSnapshot>, AppError> {
        let snapshot = Arc::new(load_snapshot(&self.path)?);
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Current snapshot, lazily loading from disk on first use.
    pub fn get(&self) -> Result<Arc<MatrixSnapshot>, AppError> {
        if let Some(snapshot) = self.current() {
            return Ok(snapshot);
        }
        self.reload().map_err(|_| AppError::SnapshotNotLoaded)
    }

    /// Like `get`, but degrades to `None` so scoring can run without
    /// matrix context instead of failing.
    pub fn try_get(&self) -> Option<Arc<MatrixSnapshot>> {
        self.get().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::topk::TopKEntry;
    use tempfile::tempdir;

    fn topk(id: i32, entries: &[(i32, i64)]) -> TopKMatrix {
        let list = entries
            .iter()
            .map(|&(id, score)| TopKEntry { id, score })
            .collect();
        [(id, list)].into_iter().collect()
    }

    fn valid_snapshot() -> MatrixSnapshot {
        MatrixSnapshot::new(
            "opendota:test",
            topk(1, &[(2, 31)]),
            topk(1, &[(3, -12)]),
        )
    }

    #[test]
    fn snapshot_round_trips_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshots").join("matrix-topk.json");
        save_json_atomic(&path, &valid_snapshot()).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.schema, SNAPSHOT_SCHEMA);
        assert_eq!(loaded.top_allies[&1][0], TopKEntry { id: 2, score: 31 });
        assert_eq!(loaded.top_opponents[&1][0], TopKEntry { id: 3, score: -12 });
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matrix-topk.json");
        save_json_atomic(&path, &valid_snapshot()).unwrap();
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["matrix-topk.json"]);
    }

    #[test]
    fn empty_snapshot_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matrix-topk.json");
        fs::write(&path, r#"{"topAllies":{},"topOpponents":{}}"#).unwrap();

        assert!(matches!(
            load_snapshot(&path),
            Err(AppError::SnapshotInvalid(_))
        ));

        // the store stays in the not-loaded state after the rejection
        let store = SnapshotStore::new(path);
        assert!(matches!(store.get(), Err(AppError::SnapshotNotLoaded)));
        assert!(store.try_get().is_none());
        assert!(store.current().is_none());
    }

    #[test]
    fn snapshot_without_metadata_is_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matrix-topk.json");
        fs::write(
            &path,
            r#"{"topAllies":{"1":[{"id":2,"score":10}]},"topOpponents":{"1":[{"id":3,"score":4}]}}"#,
        )
        .unwrap();
        let loaded = load_snapshot(&path).unwrap();
        assert!(loaded.schema.is_empty());
        assert!(loaded.generated_at.is_none());
        assert!(loaded.is_valid());
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matrix-topk.json");
        save_json_atomic(&path, &valid_snapshot()).unwrap();

        let store = SnapshotStore::new(path.clone());
        let first = store.get().unwrap();

        fs::write(&path, "{not json").unwrap();
        assert!(store.reload().is_err());

        // readers still see the previously published snapshot
        let still = store.get().unwrap();
        assert!(Arc::ptr_eq(&first, &still));
    }

    #[test]
    fn reload_swaps_to_the_new_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matrix-topk.json");
        save_json_atomic(&path, &valid_snapshot()).unwrap();

        let store = SnapshotStore::new(path.clone());
        let first = store.get().unwrap();

        let mut next = valid_snapshot();
        next.source = "opendota:second".to_string();
        save_json_atomic(&path, &next).unwrap();

        let swapped = store.reload().unwrap();
        assert!(!Arc::ptr_eq(&first, &swapped));
        assert_eq!(store.get().unwrap().source, "opendota:second");
    }
}
