//! Domain types shared across all rnsim crates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Target platform for a build session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            other => Err(Error::config(format!(
                "unknown platform '{}' (expected 'ios' or 'android')",
                other
            ))),
        }
    }
}

/// A discovered device target (simulator or emulator image)
///
/// Identity is `(platform, identifier)`. Devices are parsed from raw
/// discovery-tool output and are not persisted themselves; the session
/// record only keeps the identifier string.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Device {
    /// Human-readable name shown in listings and embedded in session keys
    pub display_name: String,

    /// Identifier understood by the platform toolchain
    /// (AVD name for Android, simulator name for iOS)
    pub identifier: String,

    /// Platform this device belongs to
    pub platform: Platform,
}

impl Device {
    /// Check if device matches a device specifier.
    ///
    /// The specifier can be the exact identifier or a case-insensitive
    /// substring of the display name.
    pub fn matches(&self, specifier: &str) -> bool {
        let spec_lower = specifier.to_lowercase();

        if self.identifier.to_lowercase() == spec_lower {
            return true;
        }

        self.display_name.to_lowercase().contains(&spec_lower)
    }
}

/// Everything needed to dispatch one platform build
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub platform: Platform,

    /// Build environment name (e.g. "dev", "stage", "prod"); may be empty
    pub environment: String,

    /// Debug build (with debug tooling) vs standalone release build
    pub debug: bool,

    /// Android build variant (e.g. "devDebug"); ignored on iOS
    pub variant: String,

    pub device: Device,
}

impl BuildRequest {
    /// Session key: `{device display name}-{environment}-{debug|standalone}`
    pub fn session_key(&self) -> String {
        let mode = if self.debug { "debug" } else { "standalone" };
        format!("{}-{}-{}", self.device.display_name, self.environment, mode)
    }

    /// Environment file argument. An empty environment degrades to the
    /// default `.env` with no trailing segment.
    pub fn env_file(&self) -> String {
        if self.environment.is_empty() {
            ".env".to_string()
        } else {
            format!(".env.{}", self.environment)
        }
    }
}

/// Derive the Android build variant from environment and build mode.
///
/// `("dev", true)` -> `"devDebug"`, `("stage", false)` -> `"stageRelease"`.
/// An empty environment degrades to plain `"Debug"` / `"Release"`.
pub fn derive_variant(environment: &str, debug: bool) -> String {
    let mode = if debug { "Debug" } else { "Release" };
    format!("{}{}", environment, mode)
}

/// Terminal classification of one emulator boot attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    /// A boot-completion or device-bridge-connected marker was observed
    Success,

    /// The runtime refused to start because another instance of the same
    /// image is already running
    ConflictSharedInstance { message: String },

    /// Anything the error stream emitted, or no marker before the deadline
    BootFailure { message: String },
}

impl BootOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BootOutcome::Success)
    }
}

/// A persisted build invocation, keyed for replay
///
/// Keys are unique per stored session; saving an existing key overwrites
/// the previous record.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionRecord {
    pub key: String,

    /// The full command line that was dispatched
    pub command: String,

    pub platform: Platform,

    /// Device identifier (used to boot the emulator again on replay)
    pub device: String,

    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel_4() -> Device {
        Device {
            display_name: "Pixel 4".to_string(),
            identifier: "Pixel_4".to_string(),
            platform: Platform::Android,
        }
    }

    #[test]
    fn test_platform_parse_and_display() {
        assert_eq!("ios".parse::<Platform>().unwrap(), Platform::Ios);
        assert_eq!("Android".parse::<Platform>().unwrap(), Platform::Android);
        assert!("windows".parse::<Platform>().is_err());

        assert_eq!(Platform::Ios.to_string(), "ios");
        assert_eq!(Platform::Android.to_string(), "android");
    }

    #[test]
    fn test_session_key_derivation() {
        let request = BuildRequest {
            platform: Platform::Android,
            environment: "dev".to_string(),
            debug: true,
            variant: "devDebug".to_string(),
            device: pixel_4(),
        };

        assert_eq!(request.session_key(), "Pixel 4-dev-debug");
    }

    #[test]
    fn test_session_key_standalone() {
        let request = BuildRequest {
            platform: Platform::Android,
            environment: "prod".to_string(),
            debug: false,
            variant: "prodRelease".to_string(),
            device: pixel_4(),
        };

        assert_eq!(request.session_key(), "Pixel 4-prod-standalone");
    }

    #[test]
    fn test_env_file_with_environment() {
        let mut request = BuildRequest {
            platform: Platform::Ios,
            environment: "stage".to_string(),
            debug: true,
            variant: "stageDebug".to_string(),
            device: pixel_4(),
        };

        assert_eq!(request.env_file(), ".env.stage");

        request.environment = String::new();
        assert_eq!(request.env_file(), ".env");
    }

    #[test]
    fn test_derive_variant() {
        assert_eq!(derive_variant("dev", true), "devDebug");
        assert_eq!(derive_variant("dev", false), "devRelease");
        assert_eq!(derive_variant("stage", false), "stageRelease");
        assert_eq!(derive_variant("", true), "Debug");
    }

    #[test]
    fn test_device_matches() {
        let device = pixel_4();

        assert!(device.matches("Pixel_4"));
        assert!(device.matches("pixel_4"));
        assert!(device.matches("pixel 4"));
        assert!(device.matches("Pixel"));
        assert!(!device.matches("Nexus"));
    }

    #[test]
    fn test_boot_outcome_is_success() {
        assert!(BootOutcome::Success.is_success());
        assert!(!BootOutcome::BootFailure {
            message: "boom".into()
        }
        .is_success());
        assert!(!BootOutcome::ConflictSharedInstance {
            message: "conflict".into()
        }
        .is_success());
    }

    #[test]
    fn test_session_record_json_roundtrip() {
        let record = SessionRecord {
            key: "Pixel 4-dev-debug".to_string(),
            command: "ENVFILE=.env.dev react-native run-android --variant=devDebug".to_string(),
            platform: Platform::Android,
            device: "Pixel_4".to_string(),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: SessionRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, record);
        assert!(json.contains("\"android\""));
    }
}
