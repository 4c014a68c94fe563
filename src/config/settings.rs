//! Configuration settings for gymbot.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub bookings: BookingSettings,
    pub agent: AgentSettings,
    pub calendar: CalendarSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.gymbot".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Booking store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingSettings {
    /// Path to the JSON bookings document.
    pub path: String,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            path: "~/.gymbot/bookings.json".to_string(),
        }
    }
}

/// Chat agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Chat completion model.
    pub model: String,
    /// Maximum model calls per user message.
    pub max_iterations: usize,
    /// Messages kept in chat history (system prompt excluded).
    pub max_history: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_iterations: 10,
            max_history: 30,
        }
    }
}

/// Calendar provider type.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CalendarProviderKind {
    /// Google Calendar v3.
    #[default]
    Google,
}

impl std::str::FromStr for CalendarProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" | "gcal" => Ok(CalendarProviderKind::Google),
            _ => Err(format!("Unknown calendar provider: {}", s)),
        }
    }
}

impl std::fmt::Display for CalendarProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalendarProviderKind::Google => write!(f, "google"),
        }
    }
}

/// Calendar integration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Expose calendar tools to the agent.
    pub enabled: bool,
    /// Calendar provider.
    pub provider: CalendarProviderKind,
    /// Calendar to operate on.
    pub calendar_id: String,
    /// IANA timezone for created events.
    pub timezone: String,
    /// OAuth client secrets downloaded from the Google Cloud Console.
    pub credentials_path: String,
    /// Saved OAuth token.
    pub token_path: String,
    /// Default number of events to list.
    pub max_results: u32,
    /// Upcoming events searched when deleting by title.
    pub delete_search_window: u32,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: CalendarProviderKind::Google,
            calendar_id: "primary".to_string(),
            timezone: "Europe/Madrid".to_string(),
            credentials_path: "~/.gymbot/credentials.json".to_string(),
            token_path: "~/.gymbot/token.json".to_string(),
            max_results: 10,
            delete_search_window: 50,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::GymError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gymbot")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded bookings document path.
    pub fn bookings_path(&self) -> PathBuf {
        Self::expand_path(&self.bookings.path)
    }

    /// Get the expanded OAuth client secrets path.
    pub fn credentials_path(&self) -> PathBuf {
        Self::expand_path(&self.calendar.credentials_path)
    }

    /// Get the expanded OAuth token path.
    pub fn token_path(&self) -> PathBuf {
        Self::expand_path(&self.calendar.token_path)
    }
}
