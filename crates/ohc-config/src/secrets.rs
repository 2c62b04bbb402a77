//! API key resolution.
//!
//! # Contract
//! - Config stores only the env var NAME (`api.keys_env.api_key`).
//! - The key is resolved once at startup and passed into the transport.
//! - `Debug` redacts the value; errors name the variable, never the value.

use anyhow::{bail, Result};
use serde_json::Value;

pub const DEFAULT_API_KEY_ENV: &str = "OHC_API_KEY";

/// Value shipped in the sample script header; never a real key.
const PLACEHOLDER_PREFIX: &str = "sk_XXX";

/// Secrets for one run. **Values are redacted in `Debug` output.**
#[derive(Clone)]
pub struct ResolvedSecrets {
    pub api_key_env: String,
    pub api_key: String,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field("api_key_env", &self.api_key_env)
            .field("api_key", &"<REDACTED>")
            .finish()
    }
}

fn api_key_env_name(config_json: &Value) -> String {
    config_json
        .pointer("/api/keys_env/api_key")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_API_KEY_ENV)
        .to_string()
}

/// Resolve the API key from the process environment.
pub fn resolve_api_key(config_json: &Value) -> Result<ResolvedSecrets> {
    resolve_api_key_with(config_json, |name| std::env::var(name).ok())
}

/// Resolve the API key through `lookup` (env access injected for tests).
///
/// # Errors
/// SECRETS_MISSING when the variable is unset or blank, SECRETS_PLACEHOLDER
/// when it still holds the sample value.
pub fn resolve_api_key_with<F>(config_json: &Value, lookup: F) -> Result<ResolvedSecrets>
where
    F: Fn(&str) -> Option<String>,
{
    let name = api_key_env_name(config_json);

    let value = match lookup(&name) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => bail!(
            "SECRETS_MISSING: required env var '{}' (api key) is not set or empty",
            name
        ),
    };

    if value.starts_with(PLACEHOLDER_PREFIX) {
        bail!(
            "SECRETS_PLACEHOLDER: env var '{}' still holds the placeholder api key",
            name
        );
    }

    Ok(ResolvedSecrets {
        api_key_env: name,
        api_key: value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_env_name_used_when_not_configured() {
        let s = resolve_api_key_with(&json!({}), |n| {
            (n == "OHC_API_KEY").then(|| "sk_real_value_1234".to_string())
        })
        .unwrap();
        assert_eq!(s.api_key_env, "OHC_API_KEY");
        assert_eq!(s.api_key, "sk_real_value_1234");
    }

    #[test]
    fn configured_env_name_is_used() {
        let cfg = json!({"api": {"keys_env": {"api_key": "MY_OHC_KEY"}}});
        let s = resolve_api_key_with(&cfg, |n| {
            (n == "MY_OHC_KEY").then(|| "  sk_abc_0001  ".to_string())
        })
        .unwrap();
        assert_eq!(s.api_key, "sk_abc_0001");
    }

    #[test]
    fn missing_or_blank_key_names_the_variable() {
        let err = resolve_api_key_with(&json!({}), |_| None).unwrap_err();
        assert!(err.to_string().contains("SECRETS_MISSING"));
        assert!(err.to_string().contains("OHC_API_KEY"));

        let err = resolve_api_key_with(&json!({}), |_| Some("   ".into())).unwrap_err();
        assert!(err.to_string().contains("SECRETS_MISSING"));
    }

    #[test]
    fn placeholder_key_rejected_without_leaking_value() {
        let err = resolve_api_key_with(&json!({}), |_| Some("sk_XXXXXX".into())).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("SECRETS_PLACEHOLDER"));
        assert!(!msg.contains("sk_XXXXXX"));
    }

    #[test]
    fn debug_redacts_key() {
        let s = ResolvedSecrets {
            api_key_env: "OHC_API_KEY".into(),
            api_key: "sk_secret_value".into(),
        };
        let dbg = format!("{s:?}");
        assert!(dbg.contains("<REDACTED>"));
        assert!(!dbg.contains("sk_secret_value"));
    }
}
