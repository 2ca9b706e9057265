//! File-based recording store.
//!
//! Each recording is two files: the payload under `recordings/<id>.<ext>`
//! and a JSON metadata document under `metadata/<id>.json`. Payload bytes
//! are written before metadata on create, so a failed copy never leaves
//! metadata referencing a missing payload.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config;
use crate::domain::{Recording, RecordingDraft, RecordingPatch};
use crate::error::PipelineError;

/// File-based store for recordings (payload + metadata)
pub struct RecordingStore {
    /// Directory holding payload files
    payload_dir: PathBuf,

    /// Directory holding metadata documents
    metadata_dir: PathBuf,
}

impl RecordingStore {
    /// Create a store over explicit directories
    pub fn new(payload_dir: PathBuf, metadata_dir: PathBuf) -> Self {
        Self {
            payload_dir,
            metadata_dir,
        }
    }

    /// Open the store in the default app home
    pub fn open_default() -> Result<Self, PipelineError> {
        let payload_dir = config::recordings_dir()
            .map_err(|e| PipelineError::storage("resolving recordings dir", e))?;
        let metadata_dir = config::metadata_dir()
            .map_err(|e| PipelineError::storage("resolving metadata dir", e))?;
        Ok(Self::new(payload_dir, metadata_dir))
    }

    /// Directory the payload files live in
    pub fn payload_dir(&self) -> &Path {
        &self.payload_dir
    }

    async fn ensure_dirs(&self) -> Result<(), PipelineError> {
        fs::create_dir_all(&self.payload_dir)
            .await
            .map_err(|e| PipelineError::storage("creating payload dir", e))?;
        fs::create_dir_all(&self.metadata_dir)
            .await
            .map_err(|e| PipelineError::storage("creating metadata dir", e))?;
        Ok(())
    }

    fn metadata_path(&self, id: Uuid) -> PathBuf {
        self.metadata_dir.join(format!("{}.json", id))
    }

    /// Payload path for an id, keeping the source file's extension so the
    /// MIME type stays recoverable from the stored uri
    fn payload_path(&self, id: Uuid, source: &Path) -> PathBuf {
        match source.extension() {
            Some(ext) => self
                .payload_dir
                .join(format!("{}.{}", id, ext.to_string_lossy())),
            None => self.payload_dir.join(id.to_string()),
        }
    }

    /// Persist a new recording: payload bytes first, then metadata.
    ///
    /// Returns the stored recording, whose `uri` now points at the
    /// store-owned payload.
    pub async fn create(&self, draft: RecordingDraft) -> Result<Recording, PipelineError> {
        self.ensure_dirs().await?;

        let mut recording = Recording::from_draft(draft);
        let source = PathBuf::from(&recording.uri);
        let dest = self.payload_path(recording.id, &source);

        fs::copy(&source, &dest).await.map_err(|e| {
            PipelineError::storage(format!("copying payload to {}", dest.display()), e)
        })?;
        recording.uri = dest.to_string_lossy().to_string();

        if let Err(e) = self.write_metadata(&recording).await {
            // Roll the payload back rather than keep an unlisted orphan
            let _ = fs::remove_file(&dest).await;
            return Err(e);
        }

        debug!(id = %recording.id, "Recording created");
        Ok(recording)
    }

    async fn write_metadata(&self, recording: &Recording) -> Result<(), PipelineError> {
        let path = self.metadata_path(recording.id);
        let json = serde_json::to_string_pretty(recording)?;
        fs::write(&path, json).await.map_err(|e| {
            PipelineError::storage(format!("writing metadata {}", path.display()), e)
        })?;
        Ok(())
    }

    /// Read a single recording's metadata
    pub async fn get(&self, id: Uuid) -> Result<Recording, PipelineError> {
        let path = self.metadata_path(id);
        if !path.exists() {
            return Err(PipelineError::NotFound(id.to_string()));
        }

        let content = fs::read_to_string(&path).await.map_err(|e| {
            PipelineError::storage(format!("reading metadata {}", path.display()), e)
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// List all recordings, newest first.
    ///
    /// Individually corrupt or unreadable metadata entries are skipped with
    /// a warning; they never fail the whole listing.
    pub async fn list(&self) -> Result<Vec<Recording>, PipelineError> {
        if !self.metadata_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.metadata_dir)
            .await
            .map_err(|e| PipelineError::storage("reading metadata dir", e))?;

        let mut recordings = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PipelineError::storage("reading metadata dir", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable metadata entry");
                    continue;
                }
            };

            match serde_json::from_str::<Recording>(&content) {
                Ok(recording) => recordings.push(recording),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping corrupt metadata entry");
                }
            }
        }

        recordings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(recordings)
    }

    /// Merge a partial update into an existing recording's metadata
    pub async fn update(
        &self,
        id: Uuid,
        patch: RecordingPatch,
    ) -> Result<Recording, PipelineError> {
        let mut recording = self.get(id).await?;
        recording.apply_patch(&patch);
        self.write_metadata(&recording).await?;
        Ok(recording)
    }

    /// Delete a recording's payload and metadata.
    ///
    /// Each removal is independently idempotent: an already-absent file is
    /// success, not an error.
    pub async fn delete(&self, id: Uuid) -> Result<(), PipelineError> {
        // Payload file name carries an unknown extension, so match by stem
        let id_str = id.to_string();
        if self.payload_dir.exists() {
            let mut entries = fs::read_dir(&self.payload_dir)
                .await
                .map_err(|e| PipelineError::storage("reading payload dir", e))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| PipelineError::storage("reading payload dir", e))?
            {
                let path = entry.path();
                let stem = path.file_stem().and_then(|s| s.to_str());
                if stem == Some(id_str.as_str()) {
                    remove_if_present(&path).await?;
                }
            }
        }

        remove_if_present(&self.metadata_path(id)).await?;
        debug!(%id, "Recording deleted");
        Ok(())
    }
}

async fn remove_if_present(path: &Path) -> Result<(), PipelineError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PipelineError::storage(
            format!("removing {}", path.display()),
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn test_store(temp: &TempDir) -> RecordingStore {
        RecordingStore::new(
            temp.path().join("recordings"),
            temp.path().join("metadata"),
        )
    }

    async fn write_source(temp: &TempDir, name: &str) -> PathBuf {
        let path = temp.path().join(name);
        fs::write(&path, b"fake audio bytes").await.unwrap();
        path
    }

    fn draft(uri: &Path, title: &str) -> RecordingDraft {
        RecordingDraft {
            uri: uri.to_string_lossy().to_string(),
            duration: 30_000,
            title: title.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_then_list_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);
        let source = write_source(&temp, "take.aac").await;

        let created = store.create(draft(&source, "Standup")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].title, "Standup");
        assert_eq!(listed[0].duration, 30_000);
        assert!(listed[0].summary.is_none());
        assert!(!listed[0].is_processing);

        // The stored uri points at a store-owned copy, not the source
        assert_ne!(PathBuf::from(&listed[0].uri), source);
        assert!(PathBuf::from(&listed[0].uri).exists());
    }

    #[tokio::test]
    async fn test_create_missing_payload_writes_no_metadata() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        let missing = temp.path().join("nope.aac");
        let result = store.create(draft(&missing, "Ghost")).await;

        assert!(matches!(result, Err(PipelineError::StorageError(_))));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_title_leaves_other_fields() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);
        let source = write_source(&temp, "take.aac").await;

        let created = store.create(draft(&source, "Standup")).await.unwrap();
        store
            .update(created.id, RecordingPatch::title("Planning"))
            .await
            .unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].title, "Planning");
        assert_eq!(listed[0].duration, created.duration);
        assert_eq!(listed[0].created_at, created.created_at);
        assert!(listed[0].summary.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        let result = store
            .update(Uuid::new_v4(), RecordingPatch::title("x"))
            .await;
        assert!(matches!(result, Err(PipelineError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);
        let source = write_source(&temp, "take.aac").await;

        let created = store.create(draft(&source, "Standup")).await.unwrap();
        let payload = PathBuf::from(&created.uri);
        assert!(payload.exists());

        store.delete(created.id).await.unwrap();
        assert!(!payload.exists());
        assert!(store.list().await.unwrap().is_empty());

        // Second delete of the same id is success, not error
        store.delete(created.id).await.unwrap();
        // And so is deleting an id that never existed
        store.delete(Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_skips_corrupt_entries() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);
        let source = write_source(&temp, "take.aac").await;

        store.create(draft(&source, "Good")).await.unwrap();

        // Drop a corrupt document next to the good one
        fs::write(
            temp.path().join("metadata").join("broken.json"),
            b"{ not json",
        )
        .await
        .unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Good");
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);
        let source = write_source(&temp, "take.aac").await;

        let mut old = draft(&source, "Old");
        old.created_at = Utc::now() - chrono::Duration::days(2);
        store.create(old).await.unwrap();
        store.create(draft(&source, "New")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].title, "New");
        assert_eq!(listed[1].title, "Old");
    }
}
