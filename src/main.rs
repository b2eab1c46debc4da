//! rnsim - A command-line session runner for React Native device builds
//!
//! This is the binary entry point. All logic lives in the workspace crates.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use rnsim_app::{load_settings, BuildOutcome, FileSessionStore, Orchestrator};
use rnsim_core::prelude::*;
use rnsim_core::{derive_variant, BuildRequest, Platform};
use rnsim_device::{CommandRunner, ToolAvailability};

/// rnsim - build React Native apps on simulators/emulators and replay
/// successful invocations
#[derive(Parser, Debug)]
#[command(name = "rnsim")]
#[command(about = "Session runner for React Native device builds", long_about = None)]
struct Args {
    /// Path to the app project (defaults to the current directory)
    #[arg(long, value_name = "PATH", global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available device targets for a platform
    Devices {
        /// Target platform: ios or android
        #[arg(value_name = "PLATFORM")]
        platform: String,
    },

    /// Build and run on a device (new session)
    Run {
        /// Target platform: ios or android
        #[arg(value_name = "PLATFORM")]
        platform: String,

        /// Build environment (e.g. dev, stage, prod)
        #[arg(long, default_value = "")]
        env: String,

        /// Standalone release build instead of a debug build
        #[arg(long)]
        release: bool,

        /// Android build variant (defaults to the derived {env}{Debug|Release})
        #[arg(long)]
        variant: Option<String>,

        /// Device specifier: exact identifier or part of the display name
        /// (defaults to the first discovered target)
        #[arg(long)]
        device: Option<String>,
    },

    /// List stored sessions, most recent first
    Sessions,

    /// Replay a stored session by key
    Replay {
        /// Session key as shown by `rnsim sessions`
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Delete all stored sessions
    Clear,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    rnsim_core::logging::init()?;

    let args = Args::parse();

    let project_path = args
        .project
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    info!("project: {}", project_path.display());

    let settings = load_settings(&project_path)?;
    let runner =
        CommandRunner::new(&project_path).with_error_display(settings.display_command_errors);
    let store = FileSessionStore::new(
        settings
            .session_file
            .clone()
            .unwrap_or_else(FileSessionStore::default_path),
    );
    let tools = ToolAvailability::check();
    let orchestrator = Orchestrator::new(settings, tools, runner, store);

    match args.command {
        Command::Devices { platform } => {
            let platform: Platform = platform.parse()?;
            let devices = orchestrator.list_devices(platform).await?;
            for device in &devices {
                println!("{}  [{}]", device.display_name, device.identifier);
            }
            Ok(())
        }

        Command::Run {
            platform,
            env,
            release,
            variant,
            device,
        } => {
            let platform: Platform = platform.parse()?;
            let debug = !release;

            let devices = orchestrator.list_devices(platform).await?;
            let selected = match &device {
                Some(specifier) => devices.iter().find(|d| d.matches(specifier)).cloned(),
                None => devices.first().cloned(),
            };
            let Some(selected) = selected else {
                eprintln!("❌ No device matches '{}'", device.unwrap_or_default());
                std::process::exit(1);
            };

            eprintln!("📱 Target: {}", selected.display_name);

            let request = BuildRequest {
                platform,
                variant: variant.unwrap_or_else(|| derive_variant(&env, debug)),
                environment: env,
                debug,
                device: selected,
            };

            finish(orchestrator.run_new(&request).await)
        }

        Command::Sessions => {
            let sessions = orchestrator.sessions()?;
            if sessions.is_empty() {
                eprintln!("No stored sessions. Run `rnsim run <platform>` first.");
                return Ok(());
            }
            for record in &sessions {
                println!(
                    "{}  [{}]  {}",
                    record.key,
                    record.platform,
                    record.timestamp.format("%Y-%m-%d %H:%M")
                );
            }
            Ok(())
        }

        Command::Replay { key } => {
            let record = orchestrator.find_session(&key)?;
            eprintln!("🔁 Replaying: {}", record.command);
            finish(orchestrator.replay(&record).await)
        }

        Command::Clear => {
            orchestrator.clear_sessions()?;
            eprintln!("Cleared all sessions.");
            Ok(())
        }
    }
}

/// Print the outcome of a build flow and map failures to exit code 1
fn finish(result: Result<BuildOutcome>) -> color_eyre::Result<()> {
    match result {
        Ok(outcome) => {
            println!("✅ Simulator Active 🚀  (session '{}')", outcome.record.key);
            if let Some(warning) = outcome.launch_warning {
                eprintln!("⚠️  {} (session kept)", warning);
            }
            Ok(())
        }
        Err(e) => {
            match e.stage() {
                Some(stage) => eprintln!("❌ {} failed: {}", stage, e),
                None => eprintln!("❌ {}", e),
            }
            std::process::exit(1);
        }
    }
}
