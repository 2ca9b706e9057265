//! Filesystem layout for the pipeline's persisted state.
//!
//! Path resolution (highest priority first):
//! 1. `MEETING_MINUTES_HOME` environment variable
//! 2. Default (`~/.meeting-minutes`)
//!
//! Layout under the home directory:
//! - `recordings/`: binary audio payloads, one file per recording id
//! - `metadata/`: one JSON document per recording id
//! - `settings.json`: app settings (API credential, contact email)
//! - `theme`: scalar theme preference

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Get the app home directory (`$MEETING_MINUTES_HOME` or `~/.meeting-minutes`)
pub fn app_home() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("MEETING_MINUTES_HOME") {
        return Ok(PathBuf::from(home));
    }

    let home = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home.join(".meeting-minutes"))
}

/// Directory holding binary audio payloads
pub fn recordings_dir() -> Result<PathBuf> {
    Ok(app_home()?.join("recordings"))
}

/// Directory holding per-recording metadata documents
pub fn metadata_dir() -> Result<PathBuf> {
    Ok(app_home()?.join("metadata"))
}

/// Path to the persisted app settings
pub fn settings_path() -> Result<PathBuf> {
    Ok(app_home()?.join("settings.json"))
}

/// Path to the persisted theme preference
pub fn theme_path() -> Result<PathBuf> {
    Ok(app_home()?.join("theme"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_paths_live_under_home() {
        let home = app_home().unwrap();
        assert_eq!(recordings_dir().unwrap(), home.join("recordings"));
        assert_eq!(metadata_dir().unwrap(), home.join("metadata"));
        assert_eq!(settings_path().unwrap(), home.join("settings.json"));
        assert_eq!(theme_path().unwrap(), home.join("theme"));
    }
}
