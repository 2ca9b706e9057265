//! Gemini API client for audio summarization.
//!
//! Three-phase protocol: negotiate a resumable upload session, transfer the
//! raw bytes, then request generation against the uploaded asset. Files at
//! or under the inline threshold skip the upload and embed their bytes
//! directly in the generation request; callers never observe the
//! difference. Any non-success response at any phase aborts the whole call
//! with a phase-tagged error, and there is no automatic retry.

use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{InferencePhase, PipelineError};

use super::Summarizer;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const UPLOAD_PATH: &str = "/upload/v1beta/files";
const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

/// Files at or under this size are inlined into the generation request
const INLINE_THRESHOLD_BYTES: u64 = 15 * 1024 * 1024;

const SUMMARY_PROMPT: &str = "Please analyze this audio recording and create comprehensive meeting minutes. Include:\n\n\
1. **Meeting Summary**: Brief overview of the main topics discussed\n\
2. **Key Discussion Points**: Main topics and decisions made\n\
3. **Action Items**: Any tasks, assignments, or follow-ups mentioned\n\
4. **Important Notes**: Critical information or deadlines\n\
5. **Participants**: If mentioned, list who was involved\n\
6. **Next Steps**: Any planned future actions or meetings\n\n\
Format the response in a clear, professional manner suitable for sharing with colleagues.";

const EMPTY_SUMMARY_FALLBACK: &str = "No summary generated";

/// Gemini API client
pub struct GeminiClient {
    /// API credential
    api_key: String,
    /// Service base URL (overridable for testing)
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

// ---- wire types, decoded once at the boundary ----

#[derive(Debug, Serialize)]
struct StartUploadRequest<'a> {
    file: DisplayName<'a>,
}

#[derive(Debug, Serialize)]
struct DisplayName<'a> {
    display_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: Option<UploadedFile>,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    uri: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

// Untagged: each variant's single field becomes the JSON key
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    FileData { file_data: FileData<'a> },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct FileData<'a> {
    mime_type: &'a str,
    file_uri: &'a str,
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

/// How the audio reaches the generation request
enum AudioRef {
    /// Out-of-band upload, referenced by file uri
    Uploaded(String),
    /// Bytes embedded directly, base64-encoded
    Inline(String),
}

impl GeminiClient {
    /// Create a client with the default service endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client against a custom endpoint
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn upload_url(&self) -> String {
        format!("{}{}?key={}", self.base_url, UPLOAD_PATH, self.api_key)
    }

    fn generate_url(&self) -> String {
        format!("{}{}?key={}", self.base_url, GENERATE_PATH, self.api_key)
    }

    /// Phase 1: negotiate a resumable upload session sized for the payload.
    ///
    /// Returns the upload endpoint from the `X-Goog-Upload-Url` header.
    async fn start_upload(
        &self,
        file_size: u64,
        mime_type: &str,
        display_name: &str,
    ) -> Result<String, PipelineError> {
        let response = self
            .client
            .post(self.upload_url())
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", file_size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&StartUploadRequest {
                file: DisplayName { display_name },
            })
            .send()
            .await
            .map_err(|e| PipelineError::inference(InferencePhase::Negotiate, None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::inference(
                InferencePhase::Negotiate,
                Some(status.as_u16()),
                format!("Failed to start resumable upload: {}", body),
            ));
        }

        response
            .headers()
            .get("X-Goog-Upload-Url")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                PipelineError::inference(
                    InferencePhase::Negotiate,
                    Some(status.as_u16()),
                    "No upload URL in negotiation response",
                )
            })
    }

    /// Phase 2: transfer the raw bytes and finalize the upload.
    ///
    /// Returns the uploaded asset's file uri.
    async fn transfer(
        &self,
        upload_endpoint: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<String, PipelineError> {
        let size = bytes.len();
        let response = self
            .client
            .post(upload_endpoint)
            .header("Content-Length", size.to_string())
            .header("Content-Type", mime_type)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await
            .map_err(|e| PipelineError::inference(InferencePhase::Transfer, None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::inference(
                InferencePhase::Transfer,
                Some(status.as_u16()),
                format!("Failed to upload audio data: {}", body),
            ));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::inference(InferencePhase::Transfer, None, e.to_string()))?;

        decode_uploaded_uri(upload)
    }

    /// Phase 3: request generation against the audio
    async fn generate(&self, audio: AudioRef, mime_type: &str) -> Result<String, PipelineError> {
        let audio_part = match &audio {
            AudioRef::Uploaded(uri) => Part::FileData {
                file_data: FileData {
                    mime_type,
                    file_uri: uri,
                },
            },
            AudioRef::Inline(data) => Part::InlineData {
                inline_data: InlineData {
                    mime_type,
                    data: data.clone(),
                },
            },
        };

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: SUMMARY_PROMPT,
                }, audio_part],
            }],
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::inference(InferencePhase::Generate, None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::inference(
                InferencePhase::Generate,
                Some(status.as_u16()),
                format!("Failed to generate content: {}", body),
            ));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::inference(InferencePhase::Generate, None, e.to_string()))?;

        Ok(extract_summary(generated))
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    #[instrument(skip(self), fields(mime = mime_type))]
    async fn summarize(
        &self,
        audio_path: &Path,
        mime_type: &str,
    ) -> Result<String, PipelineError> {
        let bytes = tokio::fs::read(audio_path).await.map_err(|e| {
            PipelineError::inference(
                InferencePhase::Negotiate,
                None,
                format!("Audio file unreadable: {}", e),
            )
        })?;
        let size = bytes.len() as u64;

        let display_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());

        let audio = if size <= INLINE_THRESHOLD_BYTES {
            debug!(size, "Inlining audio into generation request");
            AudioRef::Inline(base64::engine::general_purpose::STANDARD.encode(&bytes))
        } else {
            debug!(size, "Uploading audio out-of-band");
            let endpoint = self.start_upload(size, mime_type, &display_name).await?;
            let file_uri = self.transfer(&endpoint, bytes, mime_type).await?;
            AudioRef::Uploaded(file_uri)
        };

        self.generate(audio, mime_type).await
    }
}

/// Decode the finalized upload's file uri
fn decode_uploaded_uri(upload: UploadResponse) -> Result<String, PipelineError> {
    upload.file.and_then(|f| f.uri).ok_or_else(|| {
        PipelineError::inference(
            InferencePhase::Transfer,
            None,
            "No file URI returned from upload",
        )
    })
}

/// Join candidate parts into the final summary, falling back when empty
fn extract_summary(response: GenerateResponse) -> String {
    let text = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    let trimmed = text.trim();
    if trimmed.is_empty() {
        EMPTY_SUMMARY_FALLBACK.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_carry_key_and_paths() {
        let client = GeminiClient::new("KEY");
        assert_eq!(
            client.upload_url(),
            "https://generativelanguage.googleapis.com/upload/v1beta/files?key=KEY"
        );
        assert!(client.generate_url().contains("gemini-2.5-flash:generateContent"));
        assert!(client.generate_url().ends_with("?key=KEY"));
    }

    #[test]
    fn test_generate_request_shape_with_file_data() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: SUMMARY_PROMPT,
                    },
                    Part::FileData {
                        file_data: FileData {
                            mime_type: "audio/aac",
                            file_uri: "files/abc",
                        },
                    },
                ],
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert!(parts[0]["text"].as_str().unwrap().contains("Action Items"));
        assert_eq!(parts[1]["file_data"]["mime_type"], "audio/aac");
        assert_eq!(parts[1]["file_data"]["file_uri"], "files/abc");
    }

    #[test]
    fn test_generate_request_shape_with_inline_data() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::InlineData {
                    inline_data: InlineData {
                        mime_type: "audio/mp3",
                        data: "QUJD".to_string(),
                    },
                }],
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        let part = &json["contents"][0]["parts"][0];
        assert_eq!(part["inline_data"]["mime_type"], "audio/mp3");
        assert_eq!(part["inline_data"]["data"], "QUJD");
    }

    #[test]
    fn test_decode_uploaded_uri() {
        let ok: UploadResponse =
            serde_json::from_str(r#"{"file": {"uri": "files/xyz"}}"#).unwrap();
        assert_eq!(decode_uploaded_uri(ok).unwrap(), "files/xyz");

        let missing: UploadResponse = serde_json::from_str(r#"{"file": {}}"#).unwrap();
        let err = decode_uploaded_uri(missing).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InferenceError {
                phase: InferencePhase::Transfer,
                ..
            }
        ));
    }

    #[test]
    fn test_extract_summary_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r###"{"candidates": [{"content": {"parts": [{"text": "## Summary"}, {"text": "Budget review"}]}}]}"###,
        )
        .unwrap();
        assert_eq!(extract_summary(response), "## Summary\nBudget review");
    }

    #[test]
    fn test_extract_summary_empty_falls_back() {
        let no_candidates: GenerateResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(extract_summary(no_candidates), EMPTY_SUMMARY_FALLBACK);

        let blank: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_summary(blank), EMPTY_SUMMARY_FALLBACK);
    }

    #[test]
    fn test_inline_threshold_is_under_import_ceiling() {
        assert!(INLINE_THRESHOLD_BYTES < crate::audio::MAX_IMPORT_BYTES);
    }
}
