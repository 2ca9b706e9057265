//! Process-wide app settings.

use serde::{Deserialize, Serialize};

/// App settings, loaded once at startup and saved only explicitly.
///
/// Persisted as JSON (`{ geminiApiKey?, userEmail? }`), independent of any
/// recording.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// API credential for the summarization service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,

    /// Optional contact email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

impl AppSettings {
    /// Whether summarization is enabled (a credential is configured)
    pub fn has_credential(&self) -> bool {
        self.gemini_api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Theme preference, stored as a separate scalar next to the settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    /// Parse the persisted scalar; anything but `"dark"` reads as `Light`
    pub fn from_scalar(value: &str) -> Self {
        if value.trim() == "dark" {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// The scalar form written to disk
    pub fn as_scalar(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}
