//! # rnsim-core - Core Domain Types
//!
//! Foundation crate for rnsim. Provides domain types, error handling,
//! and the logging bootstrap.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Platform`] - Target platform (iOS / Android)
//! - [`Device`] - A discovered simulator/emulator target
//! - [`BuildRequest`] - One requested platform build
//! - [`BootOutcome`] - Terminal classification of an emulator boot attempt
//! - [`SessionRecord`] - A persisted build invocation, keyed for replay
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with per-stage classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use rnsim_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod types;

/// Prelude for common imports used throughout all rnsim crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use types::{derive_variant, BootOutcome, BuildRequest, Device, Platform, SessionRecord};
