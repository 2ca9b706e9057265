//! Persistence for recordings and app settings.
//!
//! Metadata and payload are stored as two independently addressable
//! artifacts keyed by the same id, so corruption of one never silently
//! corrupts the other and listing can self-heal by skipping bad entries.
//! Settings live in a separate flat store, decoupled from per-recording
//! storage.

pub mod recordings;
pub mod settings;

pub use recordings::RecordingStore;
pub use settings::SettingsStore;
