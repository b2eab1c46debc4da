//! Android emulator boot monitoring
//!
//! Boots an AVD and classifies the emulator's streamed output to decide
//! whether the device came up. Each observed line is classified
//! independently and the first match wins; once a terminal state is
//! reached the monitor stops reading both streams, leaving the emulator
//! process itself running (it is the build target and must outlive us).

use std::path::Path;
use std::time::Duration;

use tokio::time::timeout;

use rnsim_core::prelude::*;
use rnsim_core::BootOutcome;

use crate::android;
use crate::runner::{CommandRunner, StreamEvent, StreamingChild};
use crate::tools::ToolAvailability;

/// Marker emitted once the device runtime has fully booted
const BOOT_COMPLETED_MARKER: &str = "boot completed";

/// Alternative success marker: the device bridge connected first
const ADB_CONNECTED_MARKER: &str = "Adb connected";

/// The same AVD image is already running somewhere else
const SHARED_INSTANCE_MARKER: &str = "ERROR: Running multiple emulators with the same AVD";

const BOOT_ERROR_MESSAGE: &str = "ERROR: Booting Emulator";

/// Boot lines arrive asynchronously over real time; the default deadline
/// leaves room for a cold boot.
pub const DEFAULT_BOOT_TIMEOUT: Duration = Duration::from_secs(300);

/// The emulator boot invocation for an AVD identifier
pub fn boot_command(emulator: &Path, identifier: &str) -> String {
    format!(
        "{} -avd {} -verbose -no-boot-anim -accel auto -gpu auto -netdelay none -netspeed full",
        emulator.display(),
        identifier
    )
}

/// Boot an Android virtual device and wait for a terminal classification.
///
/// Any already-running emulator instances are force-killed first; that
/// teardown is non-fatal to the boot attempt. The returned outcome is the
/// first classifying line from either output stream, or a `BootFailure`
/// when the deadline passes without one.
pub async fn boot_device(
    identifier: &str,
    tools: &ToolAvailability,
    runner: &CommandRunner,
    deadline: Duration,
) -> Result<BootOutcome> {
    let emulator = tools.require_emulator()?;

    android::kill_all_emulators(runner).await;

    let child = runner.spawn_streaming(&boot_command(emulator, identifier))?;
    info!("booting {} (pid {:?})", identifier, child.pid());

    let outcome = match timeout(deadline, classify_boot_stream(child)).await {
        Ok(outcome) => outcome,
        Err(_) => BootOutcome::BootFailure {
            message: format!("no boot marker within {}s", deadline.as_secs()),
        },
    };

    match &outcome {
        BootOutcome::Success => info!("{} booted", identifier),
        BootOutcome::ConflictSharedInstance { message } => {
            warn!("{} boot conflict: {}", identifier, message)
        }
        BootOutcome::BootFailure { message } => warn!("{} boot failed: {}", identifier, message),
    }

    Ok(outcome)
}

/// Resolve with the first classifying line from either stream.
///
/// Returning drops the receiver, which stops both reader tasks on their
/// next send; the emulator process is not touched.
async fn classify_boot_stream(mut child: StreamingChild) -> BootOutcome {
    while let Some(event) = child.events.recv().await {
        match event {
            StreamEvent::Stdout(line) => {
                if let Some(outcome) = classify_line(&line) {
                    return outcome;
                }
            }
            StreamEvent::Stderr(line) => {
                // Markers classify the same on either stream; any other
                // error-stream emission is terminal.
                if let Some(outcome) = classify_line(&line) {
                    return outcome;
                }
                return BootOutcome::BootFailure {
                    message: BOOT_ERROR_MESSAGE.to_string(),
                };
            }
            StreamEvent::StreamError(_) => {
                return BootOutcome::BootFailure {
                    message: BOOT_ERROR_MESSAGE.to_string(),
                };
            }
        }
    }

    BootOutcome::BootFailure {
        message: "emulator output ended before boot completed".to_string(),
    }
}

/// Classify a single stdout line. Conflict takes precedence over success.
fn classify_line(line: &str) -> Option<BootOutcome> {
    if line.contains(SHARED_INSTANCE_MARKER) {
        Some(BootOutcome::ConflictSharedInstance {
            message: SHARED_INSTANCE_MARKER.to_string(),
        })
    } else if line.contains(BOOT_COMPLETED_MARKER) || line.contains(ADB_CONNECTED_MARKER) {
        Some(BootOutcome::Success)
    } else {
        None
    }
}
