//! Persistent defaults for the command-line tool

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.toml";
const APP_NAME: &str = "reportspool";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Printer recorded with spooled jobs when the CLI gives none.
    #[serde(default)]
    pub default_printer: String,

    /// Page size override applied when the CLI gives none.
    #[serde(default = "default_page_size")]
    pub default_page_size: String,

    /// Paper source (tray) index applied when the CLI gives none.
    #[serde(default)]
    pub paper_source_index: usize,

    /// Root directory the offline renderer resolves report paths under.
    #[serde(default = "default_render_root")]
    pub render_root: PathBuf,

    /// Directory spooled pages are written into.
    #[serde(default = "default_spool_dir")]
    pub spool_dir: PathBuf,

    /// Log file path.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_page_size() -> String {
    "Force 8.5 X 11".to_string()
}

fn default_render_root() -> PathBuf {
    PathBuf::from("pages")
}

fn default_spool_dir() -> PathBuf {
    PathBuf::from("spool")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("reportspool.log")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            default_printer: String::new(),
            default_page_size: default_page_size(),
            paper_source_index: 0,
            render_root: default_render_root(),
            spool_dir: default_spool_dir(),
            log_file: default_log_file(),
        }
    }
}

fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

impl Settings {
    /// Load settings from the config directory, creating the file with
    /// defaults on first run. Any problem falls back to defaults.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = preferred_config_path() else {
            warn!("Could not determine config directory, using default settings");
            return Self::default();
        };

        if path.exists() {
            return Self::load_from_path(&path);
        }

        info!("Settings file not found, creating with defaults at {path:?}");
        let settings = Self::default();
        settings.save_to_path(&path);
        settings
    }

    /// Load from a specific file, falling back to defaults on any error.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Self>(&content) {
                Ok(mut settings) => {
                    debug!("Loaded settings from {path:?}");
                    if settings.version < CURRENT_VERSION {
                        settings.migrate();
                        settings.save_to_path(path);
                    }
                    settings
                }
                Err(e) => {
                    error!("Failed to parse settings file {path:?}: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read settings file {path:?}: {e}");
                Self::default()
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    error!("Failed to create config directory {parent:?}: {e}");
                    return;
                }
            }
        }

        match toml::to_string_pretty(self) {
            Ok(content) => match fs::write(path, content) {
                Ok(()) => debug!("Saved settings to {path:?}"),
                Err(e) => error!("Failed to save settings to {path:?}: {e}"),
            },
            Err(e) => error!("Failed to serialize settings: {e}"),
        }
    }

    fn migrate(&mut self) {
        info!(
            "Migrating settings from v{} to v{}",
            self.version, CURRENT_VERSION
        );

        // Future migrations go here.

        self.version = CURRENT_VERSION;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.default_printer = "Accounting LaserJet".to_string();
        settings.paper_source_index = 2;
        settings.save_to_path(&path);

        let loaded = Settings::load_from_path(&path);
        assert_eq!(loaded.default_printer, "Accounting LaserJet");
        assert_eq!(loaded.paper_source_index, 2);
        assert_eq!(loaded.default_page_size, "Force 8.5 X 11");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_printer = \"Front Desk\"\n").unwrap();

        let loaded = Settings::load_from_path(&path);
        assert_eq!(loaded.default_printer, "Front Desk");
        assert_eq!(loaded.version, CURRENT_VERSION);
        assert_eq!(loaded.spool_dir, PathBuf::from("spool"));
    }

    #[test]
    fn unparseable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not = [valid").unwrap();

        let loaded = Settings::load_from_path(&path);
        assert_eq!(loaded.default_printer, "");
    }
}
