//! End-to-end session orchestration
//!
//! Drives discovery -> boot (Android) -> build -> app launch, stopping at
//! the first failed stage. Supports the full "new" flow and replay of a
//! stored session record.

use chrono::Utc;

use rnsim_core::prelude::*;
use rnsim_core::{BootOutcome, BuildRequest, Device, Platform, SessionRecord};
use rnsim_device::{android, boot, ios, CommandRunner, ToolAvailability};

use crate::config::Settings;
use crate::dispatch::{parse_command_env, BuildDispatcher, BuildOutcome};
use crate::store::SessionStore;

/// Composes discovery, boot, dispatch, and the session store into one
/// flow. Exactly one orchestration runs per invocation; every stage
/// returns a typed outcome and the first failure stops the sequence.
pub struct Orchestrator<S: SessionStore> {
    settings: Settings,
    tools: ToolAvailability,
    runner: CommandRunner,
    store: S,
}

impl<S: SessionStore> Orchestrator<S> {
    pub fn new(settings: Settings, tools: ToolAvailability, runner: CommandRunner, store: S) -> Self {
        Self {
            settings,
            tools,
            runner,
            store,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// List available device targets for a platform
    pub async fn list_devices(&self, platform: Platform) -> Result<Vec<Device>> {
        match platform {
            Platform::Android => android::list_android_devices(&self.tools, &self.runner).await,
            Platform::Ios => {
                ios::list_ios_devices(&self.tools, &self.runner, &self.settings.ios_device_prefix)
                    .await
            }
        }
    }

    /// Bring up the emulator for an Android target.
    ///
    /// iOS simulators boot implicitly via the build tool and skip this.
    async fn boot_stage(&self, identifier: &str) -> Result<()> {
        let outcome = boot::boot_device(
            identifier,
            &self.tools,
            &self.runner,
            self.settings.boot_timeout(),
        )
        .await?;

        match outcome {
            BootOutcome::Success => Ok(()),
            BootOutcome::ConflictSharedInstance { message } => {
                Err(Error::SharedInstanceConflict { message })
            }
            BootOutcome::BootFailure { message } => Err(Error::boot_failed(message)),
        }
    }

    /// Full flow for a new session: boot the device when the platform
    /// needs it, then dispatch the build.
    pub async fn run_new(&self, request: &BuildRequest) -> Result<BuildOutcome> {
        if request.platform == Platform::Android {
            self.boot_stage(&request.device.identifier).await?;
        }

        BuildDispatcher::new(&self.settings, &self.store, &self.runner)
            .dispatch(request)
            .await
    }

    /// Re-run a stored session's command verbatim.
    ///
    /// Android targets are booted first; on success the record is
    /// re-persisted with a fresh timestamp and the app is launched using
    /// the environment recovered from the stored command line.
    pub async fn replay(&self, record: &SessionRecord) -> Result<BuildOutcome> {
        if record.platform == Platform::Android {
            self.boot_stage(&record.device).await?;
        }

        info!("replaying session '{}'", record.key);

        let result = self.runner.run(&record.command).await;
        if result.exit_failed {
            return Err(Error::build_failed(result.error_text().trim().to_string()));
        }

        let refreshed = SessionRecord {
            timestamp: Utc::now(),
            ..record.clone()
        };
        self.store.save(&refreshed)?;

        let environment = parse_command_env(&record.command);
        let launch_warning = BuildDispatcher::new(&self.settings, &self.store, &self.runner)
            .launch_after_build(record.platform, &environment)
            .await;

        Ok(BuildOutcome {
            record: refreshed,
            launch_warning,
        })
    }

    /// Stored sessions, most recent first
    pub fn sessions(&self) -> Result<Vec<SessionRecord>> {
        self.store.load()
    }

    /// Look up a stored session by key
    pub fn find_session(&self, key: &str) -> Result<SessionRecord> {
        self.store
            .load()?
            .into_iter()
            .find(|record| record.key == key)
            .ok_or_else(|| Error::store(format!("no session named '{}'", key)))
    }

    pub fn clear_sessions(&self) -> Result<()> {
        self.store.clear_all()
    }
}
