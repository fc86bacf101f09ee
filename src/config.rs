use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Enables the authorization gate. Same variable the plugin host deploys with.
pub const AUTH_ENABLED_VAR: &str = "PLUGIN_GRPC_SERVER_AUTH_ENABLED";

/// Older name for `AUTH_ENABLED_VAR`, read only when that one is unset.
pub const AUTH_ENABLED_ALIAS: &str = "CHAT_FILTER_AUTH_ENABLED";

/// Default validation-context refresh period, in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 600;

/// Default FilterBulk deadline, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Secrets
/// (the IAM client secret) only ever come from the environment.
#[derive(Clone)]
pub struct Config {
    /// Whether calls must carry a valid bearer credential.
    pub auth_enabled: bool,
    /// How often the validation context is refetched.
    pub refresh_interval: Duration,
    /// Custom dictionary merged over the built-in one, if any.
    pub dictionary_path: Option<PathBuf>,
    /// Deadline for a single FilterBulk call.
    pub request_timeout: Duration,
    /// IAM service base URL (AB_BASE_URL).
    pub iam_base_url: String,
    pub iam_client_id: String,
    pub iam_client_secret: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_enabled: false,
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            dictionary_path: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            iam_base_url: String::new(),
            iam_client_id: String::new(),
            iam_client_secret: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default; auth stays off unless explicitly enabled.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let auth_enabled = lookup(AUTH_ENABLED_VAR)
            .or_else(|| lookup(AUTH_ENABLED_ALIAS))
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let refresh_secs = parse_secs(&lookup, "REFRESH_INTERVAL", DEFAULT_REFRESH_INTERVAL_SECS)?;
        let timeout_secs = parse_secs(
            &lookup,
            "CHAT_FILTER_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        let dictionary_path = lookup("CHAT_FILTER_DICTIONARY_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            auth_enabled,
            refresh_interval: Duration::from_secs(refresh_secs),
            dictionary_path,
            request_timeout: Duration::from_secs(timeout_secs),
            iam_base_url: lookup("AB_BASE_URL").unwrap_or_default(),
            iam_client_id: lookup("AB_CLIENT_ID").unwrap_or_default(),
            iam_client_secret: lookup("AB_CLIENT_SECRET").unwrap_or_default(),
        })
    }

    /// Check that the IAM backend is configured.
    /// Call this before enabling the authorization gate.
    pub fn require_iam(&self) -> Result<()> {
        for (name, value) in [
            ("AB_BASE_URL", &self.iam_base_url),
            ("AB_CLIENT_ID", &self.iam_client_id),
            ("AB_CLIENT_SECRET", &self.iam_client_secret),
        ] {
            if value.is_empty() {
                anyhow::bail!(
                    "{name} not set, but {AUTH_ENABLED_VAR}=true.\n\
                     Add it to your .env file. See .env.example for the required variables."
                );
            }
        }
        Ok(())
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a whole number of seconds, got {raw:?}"))?;
    if secs == 0 {
        anyhow::bail!("{key} must be greater than zero");
    }
    Ok(secs)
}
