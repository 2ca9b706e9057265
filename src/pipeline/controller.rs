//! Recording lifecycle controller.
//!
//! States per recording:
//! `Idle → Recording → Persisted → Processing → Summarized | Failed`,
//! with `Deleted` terminal from any state. Persistence of the raw audio is
//! decoupled from summarization: a failed or skipped AI call never loses
//! the underlying recording.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::audio::{self, AudioSession};
use crate::domain::{LifecycleState, Recording, RecordingDraft, RecordingPatch};
use crate::error::PipelineError;
use crate::inference::Summarizer;
use crate::store::RecordingStore;

/// Result of stopping a capture.
///
/// The recording is persisted in every non-error case; `state` reports how
/// far the enrichment got.
#[derive(Debug)]
pub struct StopOutcome {
    /// The persisted recording (summary present only on `Summarized`)
    pub recording: Recording,

    /// `Summarized`, `Persisted` (no credential configured), or
    /// `Failed` (summarization failed; audio kept)
    pub state: LifecycleState,
}

/// Orchestrates the recording lifecycle over the store, the audio session
/// and the summarization service.
pub struct RecordingPipeline {
    store: RecordingStore,
    session: Mutex<AudioSession>,

    /// Present only when an API credential is configured
    summarizer: Option<Arc<dyn Summarizer>>,

    /// Ids with a summarization verifiably in flight; a second attempt for
    /// an id in this set is rejected synchronously
    in_flight: Mutex<HashSet<Uuid>>,

    /// Where imported files are staged before the store takes ownership
    staging_dir: PathBuf,
}

impl RecordingPipeline {
    /// Create a pipeline.
    ///
    /// `summarizer` is `None` when no API credential is configured;
    /// recordings are then persisted without enrichment and
    /// `start_recording` is gated.
    pub fn new(
        store: RecordingStore,
        session: AudioSession,
        summarizer: Option<Arc<dyn Summarizer>>,
        staging_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            session: Mutex::new(session),
            summarizer,
            in_flight: Mutex::new(HashSet::new()),
            staging_dir,
        }
    }

    /// Whether summarization is available
    pub fn can_summarize(&self) -> bool {
        self.summarizer.is_some()
    }

    /// All stored recordings, newest first
    pub async fn list(&self) -> Result<Vec<Recording>, PipelineError> {
        self.store.list().await
    }

    /// `Idle → Recording`: begin a capture session.
    ///
    /// Requires a configured credential (`ConfigurationError`) and a granted
    /// microphone permission (`PermissionDenied`).
    #[instrument(skip(self))]
    pub async fn start_recording(&self) -> Result<(), PipelineError> {
        if self.summarizer.is_none() {
            return Err(PipelineError::ConfigurationError);
        }

        let mut session = self.session.lock().await;
        session.ensure_permission().await?;
        session.start_capture().await?;
        info!("Recording started");
        Ok(())
    }

    /// `Recording → Persisted [→ Processing → Summarized | Failed]`.
    ///
    /// The capture is persisted with `is_processing = false` before any
    /// summarization runs; an inference failure is reported through
    /// `StopOutcome::state` and never discards the audio.
    #[instrument(skip(self))]
    pub async fn stop_recording(&self) -> Result<StopOutcome, PipelineError> {
        let capture = {
            let mut session = self.session.lock().await;
            session.stop_capture().await?
        };

        let draft = RecordingDraft::captured(capture.uri, capture.duration);
        let recording = self.store.create(draft).await?;
        info!(id = %recording.id, "Recording persisted");

        if self.summarizer.is_none() {
            return Ok(StopOutcome {
                recording,
                state: LifecycleState::Persisted,
            });
        }

        match self.run_summarization(recording.id).await {
            Ok(updated) => Ok(StopOutcome {
                recording: updated,
                state: LifecycleState::Summarized,
            }),
            Err(e) => {
                warn!(id = %recording.id, error = %e, "Summarization failed; recording kept");
                // Re-read so the outcome reflects the cleared flag
                let recording = self.store.get(recording.id).await?;
                Ok(StopOutcome {
                    state: LifecycleState::Failed {
                        error: e.to_string(),
                    },
                    recording,
                })
            }
        }
    }

    /// Import a user-picked audio file.
    ///
    /// Validates format and size, stages a copy, and persists it. Never
    /// triggers summarization implicitly.
    #[instrument(skip(self), fields(source = %source.display()))]
    pub async fn import(
        &self,
        source: &Path,
        mime_type: Option<&str>,
    ) -> Result<Recording, PipelineError> {
        let draft = audio::import_file(source, mime_type, &self.staging_dir).await?;
        let recording = self.store.create(draft).await?;
        info!(id = %recording.id, title = %recording.title, "Import persisted");
        Ok(recording)
    }

    /// `Persisted | Summarized → Processing → Summarized | Failed`.
    ///
    /// Generates (or regenerates) the summary for a stored recording. A
    /// second call for an id already in flight is rejected synchronously
    /// with `AlreadyProcessing`. On success the previous summary is
    /// overwritten; on failure it is left unchanged and the in-flight flag
    /// is cleared either way.
    #[instrument(skip(self))]
    pub async fn summarize(&self, id: Uuid) -> Result<Recording, PipelineError> {
        if self.summarizer.is_none() {
            return Err(PipelineError::ConfigurationError);
        }
        self.run_summarization(id).await
    }

    async fn run_summarization(&self, id: Uuid) -> Result<Recording, PipelineError> {
        let summarizer = self
            .summarizer
            .as_ref()
            .ok_or(PipelineError::ConfigurationError)?;

        {
            let mut in_flight = self.in_flight.lock().await;
            if !in_flight.insert(id) {
                return Err(PipelineError::AlreadyProcessing(id.to_string()));
            }
        }

        let result = self.summarize_inner(summarizer.as_ref(), id).await;

        self.in_flight.lock().await.remove(&id);
        result
    }

    async fn summarize_inner(
        &self,
        summarizer: &dyn Summarizer,
        id: Uuid,
    ) -> Result<Recording, PipelineError> {
        let recording = self
            .store
            .update(id, RecordingPatch::processing(true))
            .await?;

        let uri = PathBuf::from(&recording.uri);
        let mime = audio::mime_for_path(&uri);

        match summarizer.summarize(&uri, mime).await {
            Ok(summary) => {
                let updated = self
                    .store
                    .update(id, RecordingPatch::summarized(summary))
                    .await?;
                info!(%id, "Summary stored");
                Ok(updated)
            }
            Err(e) => {
                // Restore the at-rest invariant before surfacing the error
                if let Err(clear_err) = self
                    .store
                    .update(id, RecordingPatch::processing(false))
                    .await
                {
                    error!(%id, error = %clear_err, "Failed to clear in-flight flag");
                }
                Err(e)
            }
        }
    }

    /// Edit a recording's title
    pub async fn rename(&self, id: Uuid, title: impl Into<String>) -> Result<Recording, PipelineError> {
        self.store.update(id, RecordingPatch::title(title.into())).await
    }

    /// Play a recording, stopping whatever was playing first
    pub async fn play(&self, id: Uuid) -> Result<(), PipelineError> {
        let recording = self.store.get(id).await?;
        let mut session = self.session.lock().await;
        session.play(id, &recording.uri).await
    }

    /// Stop playback if anything is playing
    pub async fn stop_playback(&self) -> Result<(), PipelineError> {
        self.session.lock().await.stop_playback().await
    }

    /// Transition to terminal `Deleted`: stop the recording's playback if
    /// active, then remove payload and metadata. Idempotent.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), PipelineError> {
        {
            let mut session = self.session.lock().await;
            if session.playing() == Some(id) {
                session.stop_playback().await?;
            }
        }

        self.store.delete(id).await?;
        info!(%id, "Recording deleted");
        Ok(())
    }
}
