//! Domain types for the recording pipeline.
//!
//! This module contains the core data structures:
//! - Recording: the central entity (payload locator + metadata + summary)
//! - RecordingDraft/RecordingPatch: creation and partial-update inputs
//! - LifecycleState: per-recording state machine
//! - AppSettings/ThemePreference: process-wide configuration

pub mod recording;
pub mod settings;

// Re-export commonly used types
pub use recording::{LifecycleState, Recording, RecordingDraft, RecordingPatch};
pub use settings::{AppSettings, ThemePreference};
