//! meeting-minutes - recording-to-summary pipeline
//!
//! The library behind a meeting-recorder app: it takes a raw audio capture
//! (or an imported file) through persistent storage, upload to a remote
//! summarization service, and back into a searchable summary record, with
//! consistent handling of partial failure at every step.
//!
//! # Architecture
//!
//! - Recordings persist as two independently addressable artifacts per id
//!   (payload + JSON metadata), so corruption of one never takes the other
//!   down and listing self-heals by skipping bad entries
//! - Summarization is best-effort enrichment: a failed or skipped AI call
//!   never loses the underlying audio
//! - The remote protocol is encapsulated behind the `Summarizer` trait and
//!   decoded once, phase by phase, at the boundary
//!
//! # Modules
//!
//! - `audio`: capture/import producers behind the device boundary
//! - `store`: recording and settings persistence
//! - `inference`: the remote summarization client
//! - `pipeline`: the lifecycle controller (state machine + failure policy)
//! - `query`: in-memory search and date-range filtering

pub mod audio;
pub mod config;
pub mod domain;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod query;
pub mod store;

// Re-export main types at crate root for convenience
pub use audio::{AudioBackend, AudioSession, CaptureResult};
pub use domain::{
    AppSettings, LifecycleState, Recording, RecordingDraft, RecordingPatch, ThemePreference,
};
pub use error::{InferencePhase, PipelineError};
pub use inference::{GeminiClient, Summarizer};
pub use pipeline::{RecordingPipeline, StopOutcome};
pub use query::{filter, DateRange};
pub use store::{RecordingStore, SettingsStore};
