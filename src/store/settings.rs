//! Flat key-value store for app settings and the theme preference.
//!
//! Both live outside the per-recording storage: `settings.json` holds the
//! serialized [`AppSettings`], `theme` holds a bare scalar. Missing files
//! read as defaults.

use std::path::PathBuf;

use tokio::fs;

use crate::config;
use crate::domain::{AppSettings, ThemePreference};
use crate::error::PipelineError;

/// Store for app settings and the theme scalar
pub struct SettingsStore {
    settings_path: PathBuf,
    theme_path: PathBuf,
}

impl SettingsStore {
    /// Create a store over explicit paths
    pub fn new(settings_path: PathBuf, theme_path: PathBuf) -> Self {
        Self {
            settings_path,
            theme_path,
        }
    }

    /// Open the store in the default app home
    pub fn open_default() -> Result<Self, PipelineError> {
        let settings_path = config::settings_path()
            .map_err(|e| PipelineError::storage("resolving settings path", e))?;
        let theme_path = config::theme_path()
            .map_err(|e| PipelineError::storage("resolving theme path", e))?;
        Ok(Self::new(settings_path, theme_path))
    }

    /// Load the settings; a missing file reads as defaults
    pub async fn load(&self) -> Result<AppSettings, PipelineError> {
        if !self.settings_path.exists() {
            return Ok(AppSettings::default());
        }

        let content = fs::read_to_string(&self.settings_path)
            .await
            .map_err(|e| PipelineError::storage("reading settings", e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the settings
    pub async fn save(&self, settings: &AppSettings) -> Result<(), PipelineError> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::storage("creating settings dir", e))?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.settings_path, json)
            .await
            .map_err(|e| PipelineError::storage("writing settings", e))?;
        Ok(())
    }

    /// Load the theme preference; missing or unrecognized values read as light
    pub async fn load_theme(&self) -> Result<ThemePreference, PipelineError> {
        if !self.theme_path.exists() {
            return Ok(ThemePreference::default());
        }

        let content = fs::read_to_string(&self.theme_path)
            .await
            .map_err(|e| PipelineError::storage("reading theme", e))?;
        Ok(ThemePreference::from_scalar(&content))
    }

    /// Save the theme preference
    pub async fn save_theme(&self, theme: ThemePreference) -> Result<(), PipelineError> {
        if let Some(parent) = self.theme_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::storage("creating settings dir", e))?;
        }

        fs::write(&self.theme_path, theme.as_scalar())
            .await
            .map_err(|e| PipelineError::storage("writing theme", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store(temp: &TempDir) -> SettingsStore {
        SettingsStore::new(
            temp.path().join("settings.json"),
            temp.path().join("theme"),
        )
    }

    #[tokio::test]
    async fn test_missing_settings_read_as_defaults() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        let settings = store.load().await.unwrap();
        assert!(settings.gemini_api_key.is_none());
        assert!(settings.user_email.is_none());
    }

    #[tokio::test]
    async fn test_settings_save_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        let settings = AppSettings {
            gemini_api_key: Some("AIza-test".to_string()),
            user_email: Some("alex@example.com".to_string()),
        };
        store.save(&settings).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.gemini_api_key.as_deref(), Some("AIza-test"));
        assert_eq!(loaded.user_email.as_deref(), Some("alex@example.com"));
    }

    #[tokio::test]
    async fn test_theme_defaults_to_light() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        assert_eq!(store.load_theme().await.unwrap(), ThemePreference::Light);

        store.save_theme(ThemePreference::Dark).await.unwrap();
        assert_eq!(store.load_theme().await.unwrap(), ThemePreference::Dark);
    }
}
