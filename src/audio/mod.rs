//! Audio producers: live capture and file import.
//!
//! Both paths yield the same [`RecordingDraft`](crate::domain::RecordingDraft)
//! descriptor, consumed uniformly downstream. The device itself sits behind
//! the [`AudioBackend`] trait; this crate only enforces the session rules
//! (permission gate, one capture and one playback at a time).

pub mod backend;
pub mod import;

pub use backend::{AudioBackend, AudioSession, CaptureResult};
pub use import::{import_file, mime_for_path, MAX_IMPORT_BYTES, SUPPORTED_MIME_TYPES};
