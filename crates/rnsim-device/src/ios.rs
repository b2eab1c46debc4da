//! iOS simulator discovery
//!
//! Listing goes through `instruments -s devices`, filtered to the
//! configured device family. Simulators boot implicitly as part of the
//! build tool invocation, so there is no iOS boot step.

use rnsim_core::prelude::*;
use rnsim_core::{Device, Platform};

use crate::runner::CommandRunner;
use crate::tools::ToolAvailability;

/// List available iOS simulators matching the device family prefix
pub async fn list_ios_devices(
    tools: &ToolAvailability,
    runner: &CommandRunner,
    family_prefix: &str,
) -> Result<Vec<Device>> {
    let instruments = tools.require_instruments()?;

    let result = runner
        .run(&format!(
            "{} -s devices | grep \"{}\"",
            instruments.display(),
            family_prefix
        ))
        .await;
    if result.exit_failed {
        return Err(Error::device_fetch(result.error_text()));
    }

    let devices = parse_ios_device_list(&result.stdout, family_prefix);
    if devices.is_empty() {
        return Err(Error::no_devices(Platform::Ios.as_str()));
    }

    info!("discovered {} iOS simulators", devices.len());
    Ok(devices)
}

/// Parse `instruments -s devices` output.
///
/// A line qualifies only if its first whitespace token equals the device
/// family prefix. The identifier is the portion before the first `" ("`
/// delimiter; the display name keeps the full raw line. Ordering and
/// duplicates mirror the raw tool output.
pub fn parse_ios_device_list(output: &str, family_prefix: &str) -> Vec<Device> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }

            let first_token = line.split_whitespace().next()?;
            if first_token != family_prefix {
                return None;
            }

            let identifier = line
                .split(" (")
                .next()
                .expect("split always yields a first segment");

            Some(Device {
                display_name: line.to_string(),
                identifier: identifier.to_string(),
                platform: Platform::Ios,
            })
        })
        .collect()
}
