//! Process configuration loaded via OrthoConfig.
//!
//! Values come from `PORTFOLIO_*` environment variables or a configuration
//! file. Accessors fill in defaults and validate URLs so the DI root only
//! sees well-formed values.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::outbound::cache::{DEFAULT_DIRECTORY_TTL, DEFAULT_SWEEP_INTERVAL};

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Which implementation backs the three remote source ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteMode {
    /// Cookie-authenticated HTTP clients.
    Http,
    /// JSON dataset read from `fixture_path`.
    Fixture,
}

impl FromStr for RemoteMode {
    type Err = SettingsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "fixture" => Ok(Self::Fixture),
            other => Err(SettingsError::InvalidRemoteMode(other.to_owned())),
        }
    }
}

/// Configuration problems detected after loading.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(String),
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("unknown remote mode {0:?}; expected \"http\" or \"fixture\"")]
    InvalidRemoteMode(String),
    #[error("setting {key} is not a valid URL: {source}")]
    InvalidUrl {
        key: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Base URL and credential for one remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    pub base_url: Url,
    pub credential: String,
}

/// Settings for the portfolio process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTFOLIO")]
pub struct PortfolioSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub pool_size: u32,
    /// `http` (default) or `fixture`.
    pub remote_mode: Option<String>,
    /// Dataset used when `remote_mode` is `fixture`.
    pub fixture_path: Option<PathBuf>,
    pub presence_url: Option<String>,
    /// Value of the presence service's `r_session` cookie.
    pub presence_session: Option<String>,
    pub directory_url: Option<String>,
    /// Value of the directory service's `access_token` cookie.
    pub directory_token: Option<String>,
    pub calendar_url: Option<String>,
    /// Value of the calendar service's `session` cookie.
    pub calendar_session: Option<String>,
    /// Per-request timeout for the remote services, in milliseconds.
    pub http_timeout_ms: Option<u64>,
    /// Lifetime of the cached directory listing, in seconds.
    pub directory_cache_ttl_secs: Option<u64>,
    /// Interval between expired-entry sweeps, in seconds.
    pub directory_cache_sweep_secs: Option<u64>,
}

fn required<'a>(value: Option<&'a str>, key: &'static str) -> Result<&'a str, SettingsError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(SettingsError::Missing(key)),
    }
}

fn endpoint(
    url: Option<&str>,
    url_key: &'static str,
    credential: Option<&str>,
    credential_key: &'static str,
) -> Result<RemoteEndpoint, SettingsError> {
    let base_url = Url::parse(required(url, url_key)?)
        .map_err(|source| SettingsError::InvalidUrl { key: url_key, source })?;
    Ok(RemoteEndpoint {
        base_url,
        credential: required(credential, credential_key)?.to_owned(),
    })
}

impl PortfolioSettings {
    /// Load from the environment and configuration files only; command-line
    /// arguments belong to the calling binary.
    pub fn load_from_env() -> Result<Self, SettingsError> {
        Self::load_from_iter([OsString::from("portfolio")])
            .map_err(|err| SettingsError::Load(err.to_string()))
    }

    pub fn database_url(&self) -> Result<&str, SettingsError> {
        required(self.database_url.as_deref(), "PORTFOLIO_DATABASE_URL")
    }

    pub fn remote_mode(&self) -> Result<RemoteMode, SettingsError> {
        self.remote_mode
            .as_deref()
            .map_or(Ok(RemoteMode::Http), RemoteMode::from_str)
    }

    pub fn fixture_path(&self) -> Result<&Path, SettingsError> {
        self.fixture_path
            .as_deref()
            .ok_or(SettingsError::Missing("PORTFOLIO_FIXTURE_PATH"))
    }

    pub fn presence(&self) -> Result<RemoteEndpoint, SettingsError> {
        endpoint(
            self.presence_url.as_deref(),
            "PORTFOLIO_PRESENCE_URL",
            self.presence_session.as_deref(),
            "PORTFOLIO_PRESENCE_SESSION",
        )
    }

    pub fn directory(&self) -> Result<RemoteEndpoint, SettingsError> {
        endpoint(
            self.directory_url.as_deref(),
            "PORTFOLIO_DIRECTORY_URL",
            self.directory_token.as_deref(),
            "PORTFOLIO_DIRECTORY_TOKEN",
        )
    }

    pub fn calendar(&self) -> Result<RemoteEndpoint, SettingsError> {
        endpoint(
            self.calendar_url.as_deref(),
            "PORTFOLIO_CALENDAR_URL",
            self.calendar_session.as_deref(),
            "PORTFOLIO_CALENDAR_SESSION",
        )
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout_ms
            .map_or(DEFAULT_HTTP_TIMEOUT, Duration::from_millis)
    }

    pub fn directory_cache_ttl(&self) -> Duration {
        self.directory_cache_ttl_secs
            .map_or(DEFAULT_DIRECTORY_TTL, Duration::from_secs)
    }

    pub fn directory_cache_sweep(&self) -> Duration {
        self.directory_cache_sweep_secs
            .map_or(DEFAULT_SWEEP_INTERVAL, Duration::from_secs)
    }
}
