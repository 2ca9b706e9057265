//! Device boundary for capture and playback.
//!
//! The platform implementation (microphone, speaker) lives outside this
//! crate. [`AudioSession`] wraps a backend and enforces the session rules
//! with explicit state checks: at most one active capture and one active
//! playback per session, capture only behind a granted permission.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::error::PipelineError;

/// What a stopped capture yields
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// Locator of the captured asset
    pub uri: String,

    /// Captured duration in milliseconds
    pub duration: u64,
}

/// Trait for the platform audio device
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Ask the platform for microphone permission; `false` means refused
    async fn request_permission(&self) -> Result<bool, PipelineError>;

    /// Begin capturing audio
    async fn start_capture(&self) -> Result<(), PipelineError>;

    /// Stop capturing and hand back the recorded asset
    async fn stop_capture(&self) -> Result<CaptureResult, PipelineError>;

    /// Begin playing the asset at `uri`
    async fn start_playback(&self, uri: &str) -> Result<(), PipelineError>;

    /// Stop any active playback
    async fn stop_playback(&self) -> Result<(), PipelineError>;
}

/// A session owning at most one active capture and one active playback.
///
/// Explicitly constructed and handed to the pipeline; there is no global
/// shared handle.
pub struct AudioSession {
    backend: Arc<dyn AudioBackend>,
    capturing: bool,
    playing: Option<Uuid>,
}

impl AudioSession {
    /// Create a session over a backend
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self {
            backend,
            capturing: false,
            playing: None,
        }
    }

    /// Whether a capture is currently active
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// The recording currently playing, if any
    pub fn playing(&self) -> Option<Uuid> {
        self.playing
    }

    /// Request microphone permission; refusal is `PermissionDenied`
    pub async fn ensure_permission(&self) -> Result<(), PipelineError> {
        if self.backend.request_permission().await? {
            Ok(())
        } else {
            Err(PipelineError::PermissionDenied)
        }
    }

    /// Start a capture session.
    ///
    /// Fails with `CaptureInProgress` if one is already active.
    pub async fn start_capture(&mut self) -> Result<(), PipelineError> {
        if self.capturing {
            return Err(PipelineError::CaptureInProgress);
        }

        self.backend.start_capture().await?;
        self.capturing = true;
        debug!("Capture started");
        Ok(())
    }

    /// Stop the active capture and get the recorded asset.
    ///
    /// Stopping with no active capture means the session was interrupted
    /// before `stop`; that is an unrecoverable `CaptureSessionLost`.
    pub async fn stop_capture(&mut self) -> Result<CaptureResult, PipelineError> {
        if !self.capturing {
            return Err(PipelineError::CaptureSessionLost);
        }

        // The session is over either way; a backend failure means the
        // asset is gone, not that capture continues.
        self.capturing = false;
        let result = self.backend.stop_capture().await?;
        debug!(duration_ms = result.duration, "Capture stopped");
        Ok(result)
    }

    /// Play a recording, stopping whatever was playing first
    pub async fn play(&mut self, id: Uuid, uri: &str) -> Result<(), PipelineError> {
        if self.playing.is_some() {
            self.stop_playback().await?;
        }

        self.backend.start_playback(uri).await?;
        self.playing = Some(id);
        Ok(())
    }

    /// Stop playback if anything is playing
    pub async fn stop_playback(&mut self) -> Result<(), PipelineError> {
        if self.playing.take().is_some() {
            self.backend.stop_playback().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Backend stub with scriptable permission and call counters
    struct StubBackend {
        permission: AtomicBool,
        captures_started: AtomicUsize,
        playbacks_stopped: AtomicUsize,
    }

    impl StubBackend {
        fn granted() -> Self {
            Self {
                permission: AtomicBool::new(true),
                captures_started: AtomicUsize::new(0),
                playbacks_stopped: AtomicUsize::new(0),
            }
        }

        fn refused() -> Self {
            let stub = Self::granted();
            stub.permission.store(false, Ordering::SeqCst);
            stub
        }
    }

    #[async_trait]
    impl AudioBackend for StubBackend {
        async fn request_permission(&self) -> Result<bool, PipelineError> {
            Ok(self.permission.load(Ordering::SeqCst))
        }

        async fn start_capture(&self) -> Result<(), PipelineError> {
            self.captures_started.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn stop_capture(&self) -> Result<CaptureResult, PipelineError> {
            Ok(CaptureResult {
                uri: "/tmp/capture.aac".to_string(),
                duration: 12_500,
            })
        }

        async fn start_playback(&self, _uri: &str) -> Result<(), PipelineError> {
            Ok(())
        }

        async fn stop_playback(&self) -> Result<(), PipelineError> {
            self.playbacks_stopped.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_permission_refusal_is_permission_denied() {
        let session = AudioSession::new(Arc::new(StubBackend::refused()));
        let result = session.ensure_permission().await;
        assert!(matches!(result, Err(PipelineError::PermissionDenied)));
    }

    #[tokio::test]
    async fn test_only_one_capture_at_a_time() {
        let mut session = AudioSession::new(Arc::new(StubBackend::granted()));

        session.start_capture().await.unwrap();
        let second = session.start_capture().await;
        assert!(matches!(second, Err(PipelineError::CaptureInProgress)));

        let result = session.stop_capture().await.unwrap();
        assert_eq!(result.duration, 12_500);
        assert!(!session.is_capturing());
    }

    #[tokio::test]
    async fn test_stop_without_capture_is_session_lost() {
        let mut session = AudioSession::new(Arc::new(StubBackend::granted()));
        let result = session.stop_capture().await;
        assert!(matches!(result, Err(PipelineError::CaptureSessionLost)));
    }

    #[tokio::test]
    async fn test_play_stops_previous_playback() {
        let backend = Arc::new(StubBackend::granted());
        let mut session = AudioSession::new(backend.clone());

        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        session.play(a, "/tmp/a.aac").await.unwrap();
        assert_eq!(session.playing(), Some(a));
        assert_eq!(backend.playbacks_stopped.load(Ordering::SeqCst), 0);

        session.play(b, "/tmp/b.aac").await.unwrap();
        assert_eq!(session.playing(), Some(b));
        assert_eq!(backend.playbacks_stopped.load(Ordering::SeqCst), 1);

        session.stop_playback().await.unwrap();
        assert_eq!(session.playing(), None);

        // Stopping again is a no-op, not a second backend call
        session.stop_playback().await.unwrap();
        assert_eq!(backend.playbacks_stopped.load(Ordering::SeqCst), 2);
    }
}
