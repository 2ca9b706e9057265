//! The Recording entity and its lifecycle state machine.
//!
//! A Recording pairs a binary audio payload with its metadata and, once
//! inference has run, a generated meeting summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored recording.
///
/// Serialized field names match the persisted metadata format
/// (`id, uri, duration, createdAt, title, summary?, isProcessing?`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    /// Unique identifier, assigned at creation, immutable
    pub id: Uuid,

    /// Locator for the binary audio payload, owned by the store
    pub uri: String,

    /// Duration in milliseconds (estimate for imported files)
    pub duration: u64,

    /// When the recording was created, immutable
    pub created_at: DateTime<Utc>,

    /// User-editable display title
    pub title: String,

    /// Generated meeting summary; absent until inference succeeds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// True strictly while an inference call is in flight for this id
    #[serde(default)]
    pub is_processing: bool,
}

impl Recording {
    /// Create a recording from a producer's draft, with a fresh id.
    ///
    /// The `uri` still points at the producer's asset; the store rewrites
    /// it when it takes ownership of the payload.
    pub fn from_draft(draft: RecordingDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            uri: draft.uri,
            duration: draft.duration,
            created_at: draft.created_at,
            title: draft.title,
            summary: None,
            is_processing: false,
        }
    }

    /// Merge a partial update into this recording.
    ///
    /// Only fields set in the patch change; `id`, `uri`, `duration` and
    /// `created_at` are immutable through this path.
    pub fn apply_patch(&mut self, patch: &RecordingPatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref summary) = patch.summary {
            self.summary = Some(summary.clone());
        }
        if let Some(is_processing) = patch.is_processing {
            self.is_processing = is_processing;
        }
    }
}

/// Partial update for a recording
#[derive(Debug, Clone, Default)]
pub struct RecordingPatch {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub is_processing: Option<bool>,
}

impl RecordingPatch {
    /// Patch that only sets the title
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Patch that sets or clears the in-flight flag
    pub fn processing(is_processing: bool) -> Self {
        Self {
            is_processing: Some(is_processing),
            ..Self::default()
        }
    }

    /// Patch written after a successful inference call
    pub fn summarized(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            is_processing: Some(false),
            ..Self::default()
        }
    }
}

/// The uniform descriptor both producers (capture and import) emit
#[derive(Debug, Clone)]
pub struct RecordingDraft {
    /// Locator of the source asset (handed off to the store)
    pub uri: String,

    /// Duration in milliseconds
    pub duration: u64,

    /// Initial display title
    pub title: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl RecordingDraft {
    /// Draft for a freshly captured recording
    pub fn captured(uri: impl Into<String>, duration: u64) -> Self {
        let now = Utc::now();
        Self {
            uri: uri.into(),
            duration,
            title: format!("Recording {}", now.format("%Y-%m-%d")),
            created_at: now,
        }
    }
}

/// Per-recording lifecycle state.
///
/// `Idle → Recording → Persisted → Processing → Summarized | Failed`,
/// with `Deleted` terminal from any state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    /// No capture underway
    Idle,

    /// Capture in progress
    Recording,

    /// Audio persisted, no summarization running
    Persisted,

    /// Inference call in flight
    Processing,

    /// Summary stored
    Summarized,

    /// Last summarization attempt failed (audio is kept)
    Failed { error: String },

    /// Payload and metadata removed
    Deleted,
}

impl LifecycleState {
    /// Derive the at-rest state of a stored recording
    pub fn of(recording: &Recording) -> Self {
        if recording.is_processing {
            Self::Processing
        } else if recording.summary.is_some() {
            Self::Summarized
        } else {
            Self::Persisted
        }
    }
}
