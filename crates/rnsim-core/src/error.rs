//! Application error types with stage classification

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by pipeline stage
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Session store error: {message}")]
    Store { message: String },

    #[error("Failed to spawn process: {reason}")]
    ProcessSpawn { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Device Discovery Errors
    // ─────────────────────────────────────────────────────────────
    #[error("{tool} not found. Ensure '{tool}' is in your PATH.")]
    BinaryNotFound { tool: String },

    #[error("Failed to fetch devices: {message}")]
    DeviceFetchFailed { message: String },

    #[error("No {platform} devices available")]
    NoDevicesAvailable { platform: String },

    // ─────────────────────────────────────────────────────────────
    // Boot Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Emulator already running with this AVD: {message}")]
    SharedInstanceConflict { message: String },

    #[error("Device boot failed: {message}")]
    BootFailed { message: String },

    // ─────────────────────────────────────────────────────────────
    // Build/Launch Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Build failed: {message}")]
    BuildFailed { message: String },

    #[error("App launch failed: {message}")]
    AppLaunchFailed { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn binary_not_found(tool: impl Into<String>) -> Self {
        Self::BinaryNotFound { tool: tool.into() }
    }

    pub fn device_fetch(message: impl Into<String>) -> Self {
        Self::DeviceFetchFailed {
            message: message.into(),
        }
    }

    pub fn no_devices(platform: impl Into<String>) -> Self {
        Self::NoDevicesAvailable {
            platform: platform.into(),
        }
    }

    pub fn boot_failed(message: impl Into<String>) -> Self {
        Self::BootFailed {
            message: message.into(),
        }
    }

    pub fn build_failed(message: impl Into<String>) -> Self {
        Self::BuildFailed {
            message: message.into(),
        }
    }

    pub fn app_launch(message: impl Into<String>) -> Self {
        Self::AppLaunchFailed {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error.
    ///
    /// `AppLaunchFailed` is the only stage failure that leaves the session
    /// usable: the build already succeeded and the record stays persisted.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::AppLaunchFailed { .. })
    }

    /// The orchestration stage this error belongs to, if any.
    ///
    /// Infrastructure errors (IO, config, store) return `None`.
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Error::BinaryNotFound { .. }
            | Error::DeviceFetchFailed { .. }
            | Error::NoDevicesAvailable { .. } => Some("device discovery"),
            Error::SharedInstanceConflict { .. }
            | Error::BootFailed { .. }
            | Error::ProcessSpawn { .. } => Some("device boot"),
            Error::BuildFailed { .. } => Some("build"),
            Error::AppLaunchFailed { .. } => Some("app launch"),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
