//! Typed view of the merged config, with defaults.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use ohc_execution::{AGREE_TERMS, DEFAULT_LIST_TIMEOUT, DEFAULT_SUBMIT_TIMEOUT};
use serde_json::Value;

use crate::secrets::DEFAULT_API_KEY_ENV;

// Defaults owned by the crates that enforce them.
pub use ohc_execution::{DEFAULT_ALGO_MODE, DEFAULT_BASE_URL};
pub use ohc_reconcile::{DEFAULT_CAPACITY, DEFAULT_COMMENT_MARKER};

pub const DEFAULT_INPUT_EXTENSION: &str = "hc22000";
pub const DEFAULT_OVERFLOW_PATH: &str = "ohc_overflow_hashes.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OhcSettings {
    pub base_url: String,
    pub api_key_env: String,
    pub algo_mode: u64,
    pub list_timeout: Duration,
    pub submit_timeout: Duration,
    pub capacity: usize,
    pub input_extension: String,
    pub comment_marker: String,
    pub overflow_path: PathBuf,
}

impl Default for OhcSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            algo_mode: DEFAULT_ALGO_MODE,
            list_timeout: DEFAULT_LIST_TIMEOUT,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            capacity: DEFAULT_CAPACITY,
            input_extension: DEFAULT_INPUT_EXTENSION.to_string(),
            comment_marker: DEFAULT_COMMENT_MARKER.to_string(),
            overflow_path: PathBuf::from(DEFAULT_OVERFLOW_PATH),
        }
    }
}

fn read_str(config: &Value, pointer: &str) -> Result<Option<String>> {
    match config.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => {
            bail!("CONFIG_INVALID key={pointer}: must not be blank")
        }
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => bail!("CONFIG_INVALID key={pointer}: expected a string"),
    }
}

fn read_u64(config: &Value, pointer: &str) -> Result<Option<u64>> {
    match config.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => match v.as_u64() {
            Some(n) => Ok(Some(n)),
            None => bail!("CONFIG_INVALID key={pointer}: expected a non-negative integer"),
        },
    }
}

impl OhcSettings {
    /// Overlay config values on the defaults and validate them.
    pub fn from_config_json(config: &Value) -> Result<Self> {
        let mut s = Self::default();

        if let Some(terms) = read_str(config, "/api/agree_terms")? {
            if terms != AGREE_TERMS {
                bail!("CONFIG_INVALID key=/api/agree_terms: must always be \"{AGREE_TERMS}\"");
            }
        }

        if let Some(v) = read_str(config, "/api/base_url")? {
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                bail!("CONFIG_INVALID key=/api/base_url: expected an http(s) url");
            }
            s.base_url = v;
        }
        if let Some(v) = read_str(config, "/api/keys_env/api_key")? {
            s.api_key_env = v;
        }
        if let Some(v) = read_u64(config, "/api/algo_mode")? {
            s.algo_mode = v;
        }
        if let Some(v) = read_u64(config, "/api/list_timeout_secs")? {
            s.list_timeout = positive_secs("/api/list_timeout_secs", v)?;
        }
        if let Some(v) = read_u64(config, "/api/submit_timeout_secs")? {
            s.submit_timeout = positive_secs("/api/submit_timeout_secs", v)?;
        }
        if let Some(v) = read_u64(config, "/submit/capacity")? {
            if v == 0 {
                bail!("CONFIG_INVALID key=/submit/capacity: must be at least 1");
            }
            s.capacity = usize::try_from(v)
                .map_err(|_| anyhow::anyhow!("CONFIG_INVALID key=/submit/capacity: too large"))?;
        }
        if let Some(v) = read_str(config, "/input/extension")? {
            s.input_extension = v.trim_start_matches('.').to_string();
            if s.input_extension.is_empty() {
                bail!("CONFIG_INVALID key=/input/extension: must not be just '.'");
            }
        }
        if let Some(v) = read_str(config, "/input/comment_marker")? {
            s.comment_marker = v;
        }
        if let Some(v) = read_str(config, "/overflow/path")? {
            s.overflow_path = PathBuf::from(v);
        }

        Ok(s)
    }
}

fn positive_secs(pointer: &str, v: u64) -> Result<Duration> {
    if v == 0 {
        bail!("CONFIG_INVALID key={pointer}: must be at least 1 second");
    }
    Ok(Duration::from_secs(v))
}
