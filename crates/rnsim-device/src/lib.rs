//! # rnsim-device - Device Discovery and Emulator Lifecycle
//!
//! Manages the external toolchain: command execution, device discovery,
//! emulator boot monitoring, and on-device app launch.
//!
//! Depends on [`rnsim_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Command Execution
//! - [`CommandRunner`] - Run shell command lines, captured or streaming
//! - [`CommandResult`] - Captured output plus returned (never raised) failure
//! - [`StreamingChild`], [`StreamEvent`] - Line events from a spawned process
//!
//! ### Device Discovery
//! - [`list_android_devices()`] - List AVDs via `emulator -list-avds`
//! - [`list_ios_devices()`] - List simulators via `instruments -s devices`
//!
//! ### Boot Monitoring
//! - [`boot_device()`] - Boot an AVD and classify its streamed output
//!
//! ### Platform Utilities
//! - [`ToolAvailability`] - Probe for the emulator/instruments binaries
//! - [`launch_app()`] - Start the built app on the device via adb

pub mod android;
pub mod boot;
pub mod ios;
pub mod runner;
pub mod tools;

// Public API re-exports
pub use android::{
    kill_all_emulators, launch_app, list_android_devices, parse_android_device_list,
    select_package, KILL_ALL_EMULATORS_CMD,
};
pub use boot::{boot_device, DEFAULT_BOOT_TIMEOUT};
pub use ios::{list_ios_devices, parse_ios_device_list};
pub use runner::{CommandResult, CommandRunner, StreamEvent, StreamingChild};
pub use tools::ToolAvailability;
