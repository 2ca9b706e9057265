//! Error taxonomy for the recording-to-summary pipeline.
//!
//! Every fallible operation in the crate surfaces one of these variants.
//! Storage and inference failures are caught at the pipeline boundary and
//! reported; they never escape as panics.

use thiserror::Error;

/// Phase of the remote inference protocol where a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferencePhase {
    /// Negotiating the resumable upload session
    Negotiate,

    /// Transferring audio bytes to the negotiated endpoint
    Transfer,

    /// Requesting summary generation against the uploaded asset
    Generate,
}

impl std::fmt::Display for InferencePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Negotiate => "negotiate",
            Self::Transfer => "transfer",
            Self::Generate => "generate",
        };
        f.write_str(name)
    }
}

/// Errors that can occur anywhere in the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Microphone permission denied")]
    PermissionDenied,

    #[error("No API credential configured")]
    ConfigurationError,

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Audio file too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Inference failed during {phase}{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    InferenceError {
        phase: InferencePhase,
        status: Option<u16>,
        message: String,
    },

    #[error("Recording not found: {0}")]
    NotFound(String),

    #[error("A capture session is already active")]
    CaptureInProgress,

    #[error("Capture session lost before stop was called")]
    CaptureSessionLost,

    #[error("Summarization already in flight for recording {0}")]
    AlreadyProcessing(String),
}

impl PipelineError {
    /// Build a storage error with context about the failed operation
    pub fn storage(context: impl std::fmt::Display, source: impl std::fmt::Display) -> Self {
        Self::StorageError(format!("{}: {}", context, source))
    }

    /// Build an inference error for a given protocol phase
    pub fn inference(
        phase: InferencePhase,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::InferenceError {
            phase,
            status,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::StorageError(format!("serialization: {}", err))
    }
}
