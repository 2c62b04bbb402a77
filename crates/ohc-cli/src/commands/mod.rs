//! Command handler modules for the `ohc` binary.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod list;
pub mod upload;

use std::process::ExitCode;

use anyhow::Context;
use ohc_api::{OhcClient, OhcClientOptions};
use ohc_config::{
    report_unused_keys, ConfigMode, LoadedConfig, OhcSettings, ResolvedSecrets, UnusedKeyPolicy,
};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Exit status
// ---------------------------------------------------------------------------

/// Process exit code contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// No local records, nothing pending, or an accepted submit.
    Ok,
    /// Pending exceeded capacity and was written to the overflow file.
    Overflow,
    Config,
    /// The service answered with HTTP >= 400 or `success != true`.
    Rejected,
    Transport,
    /// Input files or the overflow file.
    LocalIo,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Ok => 0,
            ExitStatus::Overflow => 1,
            ExitStatus::Config => 2,
            ExitStatus::Rejected => 3,
            ExitStatus::Transport => 4,
            ExitStatus::LocalIo => 5,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(s: ExitStatus) -> Self {
        ExitCode::from(s.code())
    }
}

/// A failed command: the error to print plus the exit status it maps to.
#[derive(Debug)]
pub struct CommandError {
    pub status: ExitStatus,
    pub error: anyhow::Error,
}

impl CommandError {
    pub fn new(status: ExitStatus, error: impl Into<anyhow::Error>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }
}

/// Tag any error with the exit status it should produce.
pub trait OrExit<T> {
    fn or_exit(self, status: ExitStatus) -> Result<T, CommandError>;
}

impl<T, E: Into<anyhow::Error>> OrExit<T> for Result<T, E> {
    fn or_exit(self, status: ExitStatus) -> Result<T, CommandError> {
        self.map_err(|e| CommandError::new(status, e))
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Everything a command needs from configuration, already validated.
pub struct CommandConfig {
    pub loaded: LoadedConfig,
    pub settings: OhcSettings,
    pub secrets: ResolvedSecrets,
}

/// Load layered config for `mode`, report unused keys, resolve the API key.
/// All failures here are configuration errors.
pub fn load_command_config(
    config_paths: &[String],
    mode: ConfigMode,
    strict: bool,
) -> Result<CommandConfig, CommandError> {
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = ohc_config::load_layered_yaml(&path_refs).or_exit(ExitStatus::Config)?;

    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report =
        report_unused_keys(mode, &loaded.config_json, policy).or_exit(ExitStatus::Config)?;
    if !report.is_clean() {
        warn!(
            mode = %report.mode,
            unused_leaf_keys = report.unused_leaf_pointers.len(),
            "CONFIG_UNUSED_KEYS"
        );
        for p in report.unused_leaf_pointers.iter().take(50) {
            warn!(unused = %p, "unused config key");
        }
    }

    let settings = OhcSettings::from_config_json(&loaded.config_json).or_exit(ExitStatus::Config)?;
    let secrets = ohc_config::resolve_api_key(&loaded.config_json).or_exit(ExitStatus::Config)?;

    info!(
        mode = mode.as_str(),
        config_hash = %loaded.config_hash,
        layers = config_paths.len(),
        api_key_env = %secrets.api_key_env,
        "config loaded"
    );

    Ok(CommandConfig {
        loaded,
        settings,
        secrets,
    })
}

pub fn build_client(cfg: &CommandConfig) -> Result<OhcClient, CommandError> {
    OhcClient::new(
        cfg.secrets.api_key.clone(),
        OhcClientOptions {
            base_url: cfg.settings.base_url.clone(),
            algo_mode: cfg.settings.algo_mode,
            list_timeout: cfg.settings.list_timeout,
            submit_timeout: cfg.settings.submit_timeout,
        },
    )
    .context("http client init failed")
    .or_exit(ExitStatus::Transport)
}

/// `ohc config-hash`: no secrets needed, nothing sent.
pub fn config_hash(paths: &[String]) -> Result<ExitStatus, CommandError> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = ohc_config::load_layered_yaml(&path_refs).or_exit(ExitStatus::Config)?;
    println!("config_hash={}", loaded.config_hash);
    println!("{}", loaded.canonical_json);
    Ok(ExitStatus::Ok)
}
