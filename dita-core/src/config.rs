//! Configuration at ~/.config/dita/config.toml

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::category::EventCategory;
use crate::constants::{
    CACHE_NAME, DEFAULT_NOTIFY_HOUR, DEFAULT_NOTIFY_MINUTE, DEFAULT_WORKER_PORT, SHELL_ASSETS,
};
use crate::dataset::Dataset;
use crate::error::{DitaError, DitaResult};
use crate::locale::{Language, Locale};

/// State of a host permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    /// Not asked yet.
    #[default]
    Prompt,
}

impl Permission {
    pub fn is_granted(self) -> bool {
        self == Permission::Granted
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub permission: Permission,
    pub periodic_wake: Permission,
    pub hour: u32,
    pub minute: u32,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            permission: Permission::Prompt,
            periodic_wake: Permission::Prompt,
            hour: DEFAULT_NOTIFY_HOUR,
            minute: DEFAULT_NOTIFY_MINUTE,
        }
    }
}

impl NotificationConfig {
    /// Local wall-clock time of the daily notification.
    pub fn time(&self) -> DitaResult<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).ok_or_else(|| {
            DitaError::Config(format!(
                "Invalid notification time {:02}:{:02}",
                self.hour, self.minute
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub port: u16,
    pub cache_name: String,
    /// Directory or http(s) URL the shell assets are fetched from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub assets: Vec<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            port: DEFAULT_WORKER_PORT,
            cache_name: CACHE_NAME.to_string(),
            origin: None,
            assets: SHELL_ASSETS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DitaConfig {
    pub language: Language,
    pub default_category: EventCategory,
    /// Dataset file replacing the built-in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<PathBuf>,
    pub notifications: NotificationConfig,
    pub worker: WorkerConfig,
}

impl DitaConfig {
    pub fn config_path() -> DitaResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DitaError::Config("Could not determine config directory".into()))?
            .join("dita");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config, writing a commented-out default first if none exists.
    pub fn load() -> DitaResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> DitaResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| DitaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| DitaError::Config(e.to_string()))
    }

    pub fn save(&self) -> DitaResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> DitaResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| DitaError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DitaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, content)
            .map_err(|e| DitaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> DitaResult<()> {
        let contents = format!(
            "\
# dita configuration

# Interface language (\"sq\" or \"en\"):
# language = \"sq\"

# Category shown on start (all, historical, literary, holiday):
# default_category = \"all\"

# Dataset file replacing the built-in events (TOML or JSON):
# dataset = \"~/dita/events.toml\"

# [notifications]
# permission = \"prompt\"
# periodic_wake = \"prompt\"
# hour = {DEFAULT_NOTIFY_HOUR}
# minute = {DEFAULT_NOTIFY_MINUTE}

# [worker]
# port = {DEFAULT_WORKER_PORT}
# cache_name = \"{CACHE_NAME}\"
# origin = \"~/dita/public\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DitaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| DitaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// The configured dataset, or the built-in one.
    pub fn dataset(&self) -> DitaResult<Dataset> {
        match &self.dataset {
            Some(path) => Dataset::load(&expand_path(path)),
            None => Dataset::builtin(),
        }
    }

    pub fn locale(&self) -> Locale {
        Locale::new(self.language)
    }

    /// Worker origin with `~` expanded, if it is a filesystem path.
    pub fn origin(&self) -> Option<String> {
        self.worker.origin.as_ref().map(|origin| {
            if origin.starts_with("http://") || origin.starts_with("https://") {
                origin.clone()
            } else {
                shellexpand::tilde(origin).into_owned()
            }
        })
    }
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dita/config.toml");

        DitaConfig::create_default_config(&path).unwrap();
        let config = DitaConfig::load_from(&path).unwrap();

        assert_eq!(config, DitaConfig::default());
        assert_eq!(config.notifications.hour, 12);
        assert_eq!(config.worker.assets.len(), SHELL_ASSETS.len());
    }

    #[test]
    fn test_save_and_reload_permission() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = DitaConfig::default();
        config.notifications.permission = Permission::Granted;
        config.language = Language::En;
        config.save_to(&path).unwrap();

        let reloaded = DitaConfig::load_from(&path).unwrap();
        assert!(reloaded.notifications.permission.is_granted());
        assert_eq!(reloaded.language, Language::En);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_category = \"holiday\"\n[notifications]\nhour = 9\n").unwrap();

        let config = DitaConfig::load_from(&path).unwrap();
        assert_eq!(config.default_category, EventCategory::Holiday);
        assert_eq!(config.notifications.hour, 9);
        assert_eq!(config.notifications.minute, 0);
        assert_eq!(config.worker.port, DEFAULT_WORKER_PORT);
    }

    #[test]
    fn test_invalid_notification_time() {
        let notifications = NotificationConfig {
            hour: 25,
            ..Default::default()
        };
        assert!(notifications.time().is_err());
    }

    #[test]
    fn test_http_origin_is_not_expanded() {
        let mut config = DitaConfig::default();
        config.worker.origin = Some("https://dita.example/".to_string());
        assert_eq!(config.origin().as_deref(), Some("https://dita.example/"));
    }
}
