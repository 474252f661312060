//! Store connection settings loaded via OrthoConfig.
//!
//! Values come from `WHISKY_*` environment variables or a config file. The
//! store URL and anon key have no defaults; [`StoreSettings::connection`]
//! rejects settings that lack them.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_IMPORT_REGION: &str = "Japan";

/// Errors raised while turning settings into a usable connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// No store URL was configured.
    #[error("store URL is not configured (set WHISKY_STORE_URL)")]
    MissingStoreUrl,
    /// No anon key was configured.
    #[error("anon key is not configured (set WHISKY_ANON_KEY)")]
    MissingAnonKey,
    /// The store URL did not parse.
    #[error("store URL is invalid: {message}")]
    InvalidStoreUrl {
        /// Parser message.
        message: String,
    },
    /// The timeout was zero.
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

/// Settings for reaching the hosted store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WHISKY")]
pub struct StoreSettings {
    /// Base URL of the hosted store, e.g. `https://abc.supabase.co`.
    pub store_url: Option<String>,
    /// Public anon key sent as `apikey`.
    pub anon_key: Option<String>,
    /// Access token of the signed-in user. Requests fall back to the anon
    /// key when absent.
    pub access_token: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Region assigned to imported distilleries.
    pub import_region: Option<String>,
    /// Emit JSON log lines.
    #[ortho_config(default = false)]
    pub log_json: bool,
}

/// Validated connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConnection {
    /// Base URL of the store.
    pub base_url: Url,
    /// Public anon key.
    pub anon_key: String,
    /// Bearer token for user-scoped requests.
    pub access_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl StoreSettings {
    /// Configured timeout, falling back to ten seconds.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Configured import region, falling back to `Japan`.
    pub fn import_region(&self) -> &str {
        self.import_region
            .as_deref()
            .map(str::trim)
            .filter(|region| !region.is_empty())
            .unwrap_or(DEFAULT_IMPORT_REGION)
    }

    /// Validate the settings into connection parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the URL or key is missing, the URL does
    /// not parse, or the timeout is zero.
    pub fn connection(&self) -> Result<StoreConnection, SettingsError> {
        let raw_url = non_blank(self.store_url.as_deref()).ok_or(SettingsError::MissingStoreUrl)?;
        let anon_key = non_blank(self.anon_key.as_deref()).ok_or(SettingsError::MissingAnonKey)?;
        let base_url = Url::parse(raw_url).map_err(|error| SettingsError::InvalidStoreUrl {
            message: error.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SettingsError::InvalidStoreUrl {
                message: format!("{raw_url} cannot be used as a base URL"),
            });
        }
        let timeout = self.request_timeout();
        if timeout.is_zero() {
            return Err(SettingsError::ZeroTimeout);
        }

        Ok(StoreConnection {
            base_url,
            anon_key: anon_key.to_owned(),
            access_token: non_blank(self.access_token.as_deref()).map(str::to_owned),
            timeout,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
