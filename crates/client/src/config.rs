//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults target a local backend.
//!
//! - `TANGELO_API_BASE_URL` - Backend API base URL
//!   (default: `http://localhost:3000/api/v1`)
//! - `TANGELO_REQUEST_TIMEOUT_SECS` - Per-request timeout in seconds
//!   (default: 30)
//! - `TANGELO_STATE_DIR` - Directory for durable client state such as the
//!   persisted session (default: `.tangelo`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api/v1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STATE_DIR: &str = ".tangelo";

/// File name of the persisted session inside the state directory.
///
/// The fixed name is the contract with older client versions; changing it
/// silently logs everyone out.
const SESSION_FILE_NAME: &str = "session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Failed to construct HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API base URL, including the version prefix.
    pub api_base_url: Url,
    /// Timeout applied to every outbound request.
    pub request_timeout: Duration,
    /// Directory holding durable client state.
    pub state_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_env_or_default("TANGELO_API_BASE_URL", DEFAULT_API_BASE_URL)
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TANGELO_API_BASE_URL".to_owned(), e.to_string())
            })?;

        let timeout_secs = match std::env::var("TANGELO_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("TANGELO_REQUEST_TIMEOUT_SECS".to_owned(), e.to_string())
            })?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let state_dir = PathBuf::from(get_env_or_default("TANGELO_STATE_DIR", DEFAULT_STATE_DIR));

        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            state_dir,
        })
    }

    /// Path of the persisted session file.
    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE_NAME)
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
