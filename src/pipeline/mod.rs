//! Orchestration of the recording lifecycle.
//!
//! The controller sequences capture/import → persist → (optional)
//! summarize → persist-update, with explicit handling of partial failure
//! at every step.

pub mod controller;

pub use controller::{RecordingPipeline, StopOutcome};
