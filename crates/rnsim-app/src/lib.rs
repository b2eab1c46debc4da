//! # rnsim-app - Orchestration and Persistence
//!
//! Application layer for rnsim: configuration, the session store, build
//! dispatch, and the orchestrator that composes the end-to-end flow.
//!
//! ## Public API
//!
//! ### Configuration (`config`)
//! - [`Settings`] - Application settings from `.rnsim/config.toml`
//! - [`load_settings()`] - Load settings with per-field defaults
//!
//! ### Session Persistence (`store`)
//! - [`SessionStore`] - Load/save/clear interface for session records
//! - [`FileSessionStore`] - Locked, atomically-replaced JSON file backend
//!
//! ### Build Dispatch (`dispatch`)
//! - [`BuildDispatcher`] - Command construction, record-then-run dispatch
//! - [`BuildOutcome`] - Persisted record plus optional launch warning
//!
//! ### Orchestration (`orchestrator`)
//! - [`Orchestrator`] - discovery -> boot -> build -> launch, new & replay

pub mod config;
pub mod dispatch;
pub mod orchestrator;
pub mod store;

// Public API re-exports
pub use config::{load_settings, Settings};
pub use dispatch::{build_command, parse_command_env, BuildDispatcher, BuildOutcome};
pub use orchestrator::Orchestrator;
pub use store::{FileSessionStore, SessionStore};
