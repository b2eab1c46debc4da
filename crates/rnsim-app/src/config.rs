//! Settings parser for .rnsim/config.toml
//!
//! Every field has a default so a missing or partial file still yields a
//! working configuration. Settings are resolved once at startup and
//! passed into components at construction time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use rnsim_core::prelude::*;

const CONFIG_FILENAME: &str = "config.toml";
const RNSIM_DIR: &str = ".rnsim";

/// Application settings (.rnsim/config.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Settings {
    /// The platform build tool the command lines are built around
    #[serde(default = "default_build_tool")]
    pub build_tool: String,

    /// Device family accepted by iOS discovery (first token of a line)
    #[serde(default = "default_ios_device_prefix")]
    pub ios_device_prefix: String,

    /// Substring used to grep the installed-package list on Android
    #[serde(default = "default_package_filter")]
    pub package_filter: String,

    /// Activity started after a successful Android build
    #[serde(default = "default_main_activity")]
    pub main_activity: String,

    /// Upper bound on one emulator boot attempt
    #[serde(default = "default_boot_timeout_secs")]
    pub boot_timeout_secs: u64,

    /// Whether raw command errors are echoed to the diagnostic sink
    #[serde(default = "default_display_command_errors")]
    pub display_command_errors: bool,

    /// Override for the session record file location
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            build_tool: default_build_tool(),
            ios_device_prefix: default_ios_device_prefix(),
            package_filter: default_package_filter(),
            main_activity: default_main_activity(),
            boot_timeout_secs: default_boot_timeout_secs(),
            display_command_errors: default_display_command_errors(),
            session_file: None,
        }
    }
}

fn default_build_tool() -> String {
    "react-native".to_string()
}

fn default_ios_device_prefix() -> String {
    "iPhone".to_string()
}

fn default_package_filter() -> String {
    "example".to_string()
}

fn default_main_activity() -> String {
    "MainActivity".to_string()
}

fn default_boot_timeout_secs() -> u64 {
    300
}

fn default_display_command_errors() -> bool {
    true
}

impl Settings {
    pub fn boot_timeout(&self) -> Duration {
        Duration::from_secs(self.boot_timeout_secs)
    }
}

/// Load settings from `<project>/.rnsim/config.toml`, falling back to
/// defaults when the file does not exist.
pub fn load_settings(project_path: &Path) -> Result<Settings> {
    let config_path = project_path.join(RNSIM_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("no config at {:?}, using defaults", config_path);
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(&config_path)?;
    toml::from_str(&content)
        .map_err(|e| Error::config(format!("failed to parse {}: {}", config_path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.build_tool, "react-native");
        assert_eq!(settings.ios_device_prefix, "iPhone");
        assert_eq!(settings.main_activity, "MainActivity");
        assert_eq!(settings.boot_timeout(), Duration::from_secs(300));
        assert!(settings.display_command_errors);
        assert!(settings.session_file.is_none());
    }

    #[test]
    fn test_load_settings_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = load_settings(temp.path()).unwrap();
        assert_eq!(settings.build_tool, "react-native");
    }

    #[test]
    fn test_load_settings_partial_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(RNSIM_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(CONFIG_FILENAME),
            "package_filter = \"acme\"\nboot_timeout_secs = 60\n",
        )
        .unwrap();

        let settings = load_settings(temp.path()).unwrap();
        assert_eq!(settings.package_filter, "acme");
        assert_eq!(settings.boot_timeout(), Duration::from_secs(60));
        // Unspecified fields keep their defaults
        assert_eq!(settings.build_tool, "react-native");
    }

    #[test]
    fn test_load_settings_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(RNSIM_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILENAME), "build_tool = [not toml").unwrap();

        let err = load_settings(temp.path()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
