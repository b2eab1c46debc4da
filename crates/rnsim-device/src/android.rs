//! Android device discovery, emulator teardown, and app launch
//!
//! Device listing uses `emulator -list-avds`; the app-launch step goes
//! through `adb`. The parsing rules here mirror the raw tool output and
//! are the compatibility contract: whitespace-separated AVD names, one
//! installed package per `pm list packages` line.

use rnsim_core::prelude::*;
use rnsim_core::{Device, Platform};

use crate::runner::CommandRunner;
use crate::tools::ToolAvailability;

/// The target platform allows at most one active emulator instance
/// system-wide, so every running instance is killed before a boot.
pub const KILL_ALL_EMULATORS_CMD: &str =
    "adb devices | grep emulator | cut -f1 | while read line; do adb -s $line emu kill; done";

/// List available Android virtual devices
pub async fn list_android_devices(
    tools: &ToolAvailability,
    runner: &CommandRunner,
) -> Result<Vec<Device>> {
    let emulator = tools.require_emulator()?;

    let result = runner
        .run(&format!("{} -list-avds", emulator.display()))
        .await;
    if result.exit_failed {
        return Err(Error::device_fetch(result.error_text()));
    }

    let devices = parse_android_device_list(&result.stdout);
    if devices.is_empty() {
        return Err(Error::no_devices(Platform::Android.as_str()));
    }

    info!("discovered {} Android devices", devices.len());
    Ok(devices)
}

/// Parse `emulator -list-avds` output.
///
/// Every whitespace-separated token is a device identifier; the display
/// name replaces underscores with spaces. Source ordering is preserved
/// and duplicates are kept, mirroring the raw tool output.
pub fn parse_android_device_list(output: &str) -> Vec<Device> {
    output
        .split_whitespace()
        .map(|token| Device {
            display_name: token.replace('_', " "),
            identifier: token.to_string(),
            platform: Platform::Android,
        })
        .collect()
}

/// Kill every running emulator instance.
///
/// Failures are logged and swallowed: a failed teardown must not abort
/// the boot attempt that follows.
pub async fn kill_all_emulators(runner: &CommandRunner) {
    let result = runner.run(KILL_ALL_EMULATORS_CMD).await;
    if result.exit_failed {
        warn!("emulator teardown failed: {}", result.error_text().trim());
    }
}

/// Select the installed package matching the environment.
///
/// Returns `(package, main_package)` where the main package is the
/// package with its `.{environment}` suffix stripped. First match wins.
pub fn select_package(listing: &str, environment: &str) -> Option<(String, String)> {
    for token in listing.split_whitespace() {
        if token.contains(environment) {
            let pkg = token.trim_start_matches("package:").to_string();
            let pkg_main = if environment.is_empty() {
                pkg.clone()
            } else {
                pkg.replacen(&format!(".{}", environment), "", 1)
            };
            return Some((pkg, pkg_main));
        }
    }
    None
}

/// The `am start` command for a selected package pair
pub fn launch_command(pkg: &str, pkg_main: &str, activity: &str) -> String {
    format!("adb shell am start -n {}/{}.{}", pkg, pkg_main, activity)
}

/// Start the app on the booted device.
///
/// Inspects installed packages filtered by `package_filter`, picks the
/// one matching the environment, and starts its main activity.
pub async fn launch_app(
    environment: &str,
    package_filter: &str,
    main_activity: &str,
    runner: &CommandRunner,
) -> Result<()> {
    let listing = runner
        .run(&format!(
            "adb shell pm list packages | grep {}",
            package_filter
        ))
        .await;
    if listing.exit_failed {
        return Err(Error::app_launch(format!(
            "failed to list installed packages: {}",
            listing.error_text().trim()
        )));
    }

    let (pkg, pkg_main) = select_package(&listing.stdout, environment).ok_or_else(|| {
        Error::app_launch(format!(
            "no installed package matches environment '{}'",
            environment
        ))
    })?;

    info!("launching {}/{}.{}", pkg, pkg_main, main_activity);

    let start = runner
        .run(&launch_command(&pkg, &pkg_main, main_activity))
        .await;
    if start.exit_failed {
        return Err(Error::app_launch(start.error_text().trim().to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_android_device_list() {
        let output = "Pixel_4 Nexus_5X_API_29\nMy_Custom_AVD\n";
        let devices = parse_android_device_list(output);

        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].identifier, "Pixel_4");
        assert_eq!(devices[0].display_name, "Pixel 4");
        assert_eq!(devices[1].identifier, "Nexus_5X_API_29");
        assert_eq!(devices[1].display_name, "Nexus 5X API 29");
        assert_eq!(devices[2].display_name, "My Custom AVD");
        assert!(devices.iter().all(|d| d.platform == Platform::Android));
    }

    #[test]
    fn test_parse_android_device_list_empty() {
        assert!(parse_android_device_list("").is_empty());
        assert!(parse_android_device_list("  \n \n").is_empty());
    }

    #[test]
    fn test_parse_android_device_list_preserves_order_and_duplicates() {
        let devices = parse_android_device_list("B A B");
        let ids: Vec<&str> = devices.iter().map(|d| d.identifier.as_str()).collect();
        assert_eq!(ids, vec!["B", "A", "B"]);
    }

    #[test]
    fn test_select_package_by_environment() {
        let listing = "package:com.example.stage\npackage:com.example\n";
        let (pkg, pkg_main) = select_package(listing, "stage").unwrap();

        assert_eq!(pkg, "com.example.stage");
        assert_eq!(pkg_main, "com.example");
    }

    #[test]
    fn test_select_package_first_match_wins() {
        let listing = "package:com.other\npackage:com.example.dev\npackage:com.fallback.dev";
        let (pkg, _) = select_package(listing, "dev").unwrap();
        assert_eq!(pkg, "com.example.dev");
    }

    #[test]
    fn test_select_package_no_match() {
        let listing = "package:com.example\npackage:com.other";
        assert!(select_package(listing, "stage").is_none());
    }

    #[test]
    fn test_select_package_empty_environment_keeps_package() {
        let listing = "package:com.example";
        let (pkg, pkg_main) = select_package(listing, "").unwrap();
        assert_eq!(pkg, "com.example");
        assert_eq!(pkg_main, "com.example");
    }

    #[test]
    fn test_launch_command_shape() {
        assert_eq!(
            launch_command("com.example.stage", "com.example", "MainActivity"),
            "adb shell am start -n com.example.stage/com.example.MainActivity"
        );
    }

    #[tokio::test]
    async fn test_list_android_devices_requires_emulator() {
        let tools = ToolAvailability::default();
        let runner = CommandRunner::new(std::env::temp_dir()).with_error_display(false);

        let err = list_android_devices(&tools, &runner).await.unwrap_err();
        assert!(matches!(err, Error::BinaryNotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_android_devices_with_fake_emulator() {
        // `echo -list-avds` prints nothing useful, so stand in a printf
        // that ignores its argument and emits two AVD names.
        let tools = ToolAvailability {
            emulator_path: Some("printf 'Pixel_4\\nPixel_7_Pro\\n' #".into()),
            instruments_path: None,
        };
        let runner = CommandRunner::new(std::env::temp_dir()).with_error_display(false);

        let devices = list_android_devices(&tools, &runner).await.unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].display_name, "Pixel 4");
        assert_eq!(devices[1].display_name, "Pixel 7 Pro");
    }

    #[tokio::test]
    async fn test_list_android_devices_empty_output_is_unavailable() {
        let tools = ToolAvailability {
            emulator_path: Some("true #".into()),
            instruments_path: None,
        };
        let runner = CommandRunner::new(std::env::temp_dir()).with_error_display(false);

        let err = list_android_devices(&tools, &runner).await.unwrap_err();
        assert!(matches!(err, Error::NoDevicesAvailable { .. }));
    }
}
