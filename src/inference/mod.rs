//! Remote summarization boundary.
//!
//! The pipeline only sees the [`Summarizer`] trait: audio in, summary text
//! out, typed failure on any protocol step. The concrete client
//! ([`GeminiClient`]) encapsulates the vendor's three-phase upload/generate
//! protocol.

pub mod gemini;

use std::path::Path;

use async_trait::async_trait;

use crate::error::PipelineError;

pub use gemini::GeminiClient;

/// Trait for the external summarization service.
///
/// The textual output is inherently non-deterministic; callers rely only on
/// the structural contract (success yields a non-empty summary, failure
/// yields an `InferenceError` and no partial text).
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Upload the audio asset and return the generated meeting summary
    async fn summarize(&self, audio_path: &Path, mime_type: &str)
        -> Result<String, PipelineError>;
}
