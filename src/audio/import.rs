//! Audio file import with validation.
//!
//! Imported files are validated against a MIME allow-list and the upstream
//! 20 MB size ceiling, then copied into the app's private storage before a
//! draft is returned. Exact duration is unavailable without decoding, so
//! imports carry a fixed estimate.

use std::path::Path;

use chrono::Utc;
use tokio::fs;
use tracing::info;

use crate::domain::RecordingDraft;
use crate::error::PipelineError;

/// MIME types accepted for import
pub const SUPPORTED_MIME_TYPES: &[&str] = &[
    "audio/wav",
    "audio/mp3",
    "audio/mpeg",
    "audio/aac",
    "audio/ogg",
    "audio/flac",
    "audio/aiff",
    "audio/mp4",
    "audio/m4a",
];

/// Upstream size ceiling for AI processing (20 MB)
pub const MAX_IMPORT_BYTES: u64 = 20 * 1024 * 1024;

/// Placeholder duration for imports (exact value needs native decoding)
const ESTIMATED_DURATION_MS: u64 = 60_000;

/// Guess a MIME type from the file extension; `audio/aac` when unknown
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp3") => "audio/mp3",
        Some("wav") => "audio/wav",
        Some("m4a") | Some("aac") => "audio/aac",
        Some("mp4") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("aiff") => "audio/aiff",
        _ => "audio/aac",
    }
}

/// Validate and stage a user-picked audio file.
///
/// On success the file has been copied into `staging_dir` and the returned
/// draft points at the copy. Validation failures produce no copy and no
/// stored record.
pub async fn import_file(
    source: &Path,
    mime_type: Option<&str>,
    staging_dir: &Path,
) -> Result<RecordingDraft, PipelineError> {
    let mime = mime_type.unwrap_or_else(|| mime_for_path(source));
    if !SUPPORTED_MIME_TYPES.contains(&mime) {
        return Err(PipelineError::UnsupportedFormat(mime.to_string()));
    }

    let metadata = fs::metadata(source)
        .await
        .map_err(|e| PipelineError::storage(format!("reading {}", source.display()), e))?;
    if metadata.len() > MAX_IMPORT_BYTES {
        return Err(PipelineError::FileTooLarge {
            size: metadata.len(),
            limit: MAX_IMPORT_BYTES,
        });
    }

    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio".to_string());

    fs::create_dir_all(staging_dir)
        .await
        .map_err(|e| PipelineError::storage("creating staging dir", e))?;

    let staged = staging_dir.join(format!(
        "imported_{}_{}",
        Utc::now().timestamp_millis(),
        file_name
    ));
    fs::copy(source, &staged)
        .await
        .map_err(|e| PipelineError::storage(format!("staging {}", source.display()), e))?;

    info!(file = %file_name, mime, size = metadata.len(), "Audio file imported");

    Ok(RecordingDraft {
        uri: staged.to_string_lossy().to_string(),
        duration: ESTIMATED_DURATION_MS,
        title: file_name,
        created_at: Utc::now(),
    })
}
