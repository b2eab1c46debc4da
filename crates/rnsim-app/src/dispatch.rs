//! Build command construction and dispatch
//!
//! The command-line shapes built here are the compatibility contract
//! with the platform build tool and must not drift.

use chrono::Utc;

use rnsim_core::prelude::*;
use rnsim_core::{BuildRequest, Platform, SessionRecord};
use rnsim_device::{android, CommandRunner};

use crate::config::Settings;
use crate::store::SessionStore;

/// Result of a successful dispatch
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// The record persisted for this invocation
    pub record: SessionRecord,

    /// Set when the build succeeded but the app launch did not; the
    /// session is still considered successful and stays persisted.
    pub launch_warning: Option<String>,
}

/// Builds the platform command line and runs it, recording the session
pub struct BuildDispatcher<'a, S: SessionStore> {
    settings: &'a Settings,
    store: &'a S,
    runner: &'a CommandRunner,
}

impl<'a, S: SessionStore> BuildDispatcher<'a, S> {
    pub fn new(settings: &'a Settings, store: &'a S, runner: &'a CommandRunner) -> Self {
        Self {
            settings,
            store,
            runner,
        }
    }

    /// Run the build for a request.
    ///
    /// The session record is persisted before the command runs, so a
    /// crash mid-build still leaves a replayable record; a later success
    /// with the same key overwrites it.
    pub async fn dispatch(&self, request: &BuildRequest) -> Result<BuildOutcome> {
        let command = build_command(request, self.settings);
        let record = SessionRecord {
            key: request.session_key(),
            command: command.clone(),
            platform: request.platform,
            device: request.device.identifier.clone(),
            timestamp: Utc::now(),
        };

        self.store.save(&record)?;

        info!(
            "building {} '{}' ({})",
            request.platform, request.device.display_name, request.environment
        );

        let result = self.runner.run(&command).await;
        if result.exit_failed {
            return Err(Error::build_failed(result.error_text().trim().to_string()));
        }

        let launch_warning = self.launch_after_build(request.platform, &request.environment).await;

        Ok(BuildOutcome {
            record,
            launch_warning,
        })
    }

    /// Android needs an explicit app start after the build; iOS simulators
    /// surface the app as part of the build tool itself.
    pub(crate) async fn launch_after_build(
        &self,
        platform: Platform,
        environment: &str,
    ) -> Option<String> {
        if platform != Platform::Android {
            return None;
        }

        match android::launch_app(
            environment,
            &self.settings.package_filter,
            &self.settings.main_activity,
            self.runner,
        )
        .await
        {
            Ok(()) => None,
            Err(e) => {
                warn!("app launch failed (session kept): {}", e);
                Some(e.to_string())
            }
        }
    }
}

/// The full build invocation for a request
pub fn build_command(request: &BuildRequest, settings: &Settings) -> String {
    let env_file = request.env_file();

    match request.platform {
        Platform::Ios => {
            let mut command = format!(
                "ENVFILE={} {} run-ios --scheme {} --simulator=\"{}\"",
                env_file, settings.build_tool, request.environment, request.device.identifier
            );
            if !request.debug {
                command.push_str(" --configuration Release");
            }
            command
        }
        Platform::Android => format!(
            "ENVFILE={} {} run-android --variant={}",
            env_file, settings.build_tool, request.variant
        ),
    }
}

/// Recover the environment from a stored command's `ENVFILE=` token.
///
/// `ENVFILE=.env.stage ...` -> `"stage"`; the default `.env` -> `""`.
pub fn parse_command_env(command: &str) -> String {
    for token in command.split_whitespace() {
        if let Some(env_file) = token.strip_prefix("ENVFILE=") {
            return env_file
                .strip_prefix(".env.")
                .unwrap_or_default()
                .to_string();
        }
    }
    String::new()
}
