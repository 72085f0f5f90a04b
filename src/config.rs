//! Dashboard configuration parsed from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STATE_DIR: &str = ".qrmenu";
pub const DEFAULT_LOGOUT_REDIRECT_MS: u64 = 1000;
pub const DEFAULT_UPLOAD_FOLDER: &str = "qr-menu";

const SESSION_FILE: &str = "session.json";
const COOKIE_FILE: &str = "cookies.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The API base URL is not an absolute http(s) URL.
    #[error("invalid API base URL '{0}' (expected http:// or https://)")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl HttpTimeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Image host settings. Present only when uploads are configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub endpoint: String,
    pub upload_preset: String,
    pub folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub timeouts: HttpTimeouts,
    pub state_dir: PathBuf,
    pub logout_redirect_delay: Duration,
    pub upload: Option<UploadConfig>,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `QRMENU_API_BASE_URL`: default `http://localhost:5000`
    /// - `QRMENU_REQUEST_TIMEOUT_SECS`: default 30
    /// - `QRMENU_CONNECT_TIMEOUT_SECS`: default 10
    /// - `QRMENU_STATE_DIR`: default `.qrmenu`
    /// - `QRMENU_LOGOUT_REDIRECT_MS`: default 1000
    /// - `QRMENU_UPLOAD_CLOUD_NAME` / `QRMENU_UPLOAD_URL`, `QRMENU_UPLOAD_PRESET`,
    ///   `QRMENU_UPLOAD_FOLDER` (default `qr-menu`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the base URL is not http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url =
            normalize_base_url(&env_nonempty("QRMENU_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned()))?;
        let timeouts = HttpTimeouts {
            request_secs: env_parse("QRMENU_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("QRMENU_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let state_dir = PathBuf::from(env_nonempty("QRMENU_STATE_DIR").unwrap_or_else(|| DEFAULT_STATE_DIR.to_owned()));
        let logout_redirect_delay =
            Duration::from_millis(env_parse("QRMENU_LOGOUT_REDIRECT_MS", DEFAULT_LOGOUT_REDIRECT_MS));

        Ok(Self { api_base_url, timeouts, state_dir, logout_redirect_delay, upload: upload_from_env() })
    }

    /// Override the API base URL (e.g. from a CLI flag).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL is not http(s).
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_base_url = normalize_base_url(raw)?;
        Ok(self)
    }

    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE)
    }

    #[must_use]
    pub fn cookie_file(&self) -> PathBuf {
        self.state_dir.join(COOKIE_FILE)
    }
}

fn upload_from_env() -> Option<UploadConfig> {
    let upload_preset = env_nonempty("QRMENU_UPLOAD_PRESET")?;
    let endpoint = match env_nonempty("QRMENU_UPLOAD_URL") {
        Some(url) => url,
        None => cloudinary_endpoint(&env_nonempty("QRMENU_UPLOAD_CLOUD_NAME")?),
    };
    let folder = env_nonempty("QRMENU_UPLOAD_FOLDER").unwrap_or_else(|| DEFAULT_UPLOAD_FOLDER.to_owned());
    Some(UploadConfig { endpoint, upload_preset, folder })
}

#[must_use]
pub fn cloudinary_endpoint(cloud_name: &str) -> String {
    format!("https://api.cloudinary.com/v1_1/{cloud_name}/image/upload")
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidBaseUrl(raw.to_owned()))
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_owned()),
        _ => None,
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
