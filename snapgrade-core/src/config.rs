// File: src/config.rs

use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};
use url::Url;

use snapgrade_ai::ProviderConfig;

use crate::error::ConfigError;
use crate::ledger::LedgerLimits;

pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_GEMINI_API_BASE: &str = "GEMINI_API_BASE";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_BASIC_API_URL: &str = "API_URL";
pub const ENV_BASIC_BACKEND: &str = "SNAPGRADE_BASIC_BACKEND";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "SNAPGRADE_REQUEST_TIMEOUT_SECS";
pub const ENV_GUEST_SCAN_LIMIT: &str = "SNAPGRADE_GUEST_SCAN_LIMIT";
pub const ENV_FREE_DAILY_LIMIT: &str = "SNAPGRADE_FREE_DAILY_LIMIT";
pub const ENV_PAID_CREDITS: &str = "SNAPGRADE_PAID_CREDITS";

/// Placeholders shipped in sample configs; treated as "not configured".
const PLACEHOLDERS: &[&str] = &["YOUR_API_KEY_HERE", "YOUR_API_GATEWAY_URL_HERE"];

/// Where basic (non-AI) scans are answered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BasicBackendChoice {
    /// POST the image to a hosted endpoint.
    Remote(Url),
    /// Read format and dimensions in-process.
    Local,
    /// Canned report after a short delay.
    #[default]
    Fallback,
}

/// Everything the scan service needs from the environment.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// `None` when no API key is set; full analysis then fails with a
    /// configuration message.
    pub gemini: Option<ProviderConfig>,
    pub basic_backend: BasicBackendChoice,
    pub request_timeout: Option<Duration>,
    pub limits: LedgerLimits,
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            info!("Loaded environment overrides from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty() && !PLACEHOLDERS.contains(&v.as_str()))
        };

        let gemini = match get(ENV_API_KEY) {
            Some(key) => {
                let mut cfg = ProviderConfig::new(key);
                if let Some(base) = get(ENV_GEMINI_API_BASE) {
                    parse_url(ENV_GEMINI_API_BASE, &base)?;
                    cfg = cfg.with_api_base(base);
                }
                if let Some(model) = get(ENV_GEMINI_MODEL) {
                    cfg = cfg.with_model(model);
                }
                Some(cfg)
            }
            None => {
                warn!("{} environment variable not set. Full AI analysis is unavailable.", ENV_API_KEY);
                None
            }
        };

        let endpoint = get(ENV_BASIC_API_URL)
            .map(|raw| parse_url(ENV_BASIC_API_URL, &raw))
            .transpose()?;
        let basic_backend = match get(ENV_BASIC_BACKEND).map(|v| v.to_lowercase()).as_deref() {
            None => match endpoint {
                Some(url) => BasicBackendChoice::Remote(url),
                None => {
                    warn!("{} is not configured. Basic scans use the built-in report.", ENV_BASIC_API_URL);
                    BasicBackendChoice::Fallback
                }
            },
            Some("remote") => match endpoint {
                Some(url) => BasicBackendChoice::Remote(url),
                None => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_BASIC_BACKEND,
                        value: "remote".to_string(),
                        reason: format!("{} is not set", ENV_BASIC_API_URL),
                    });
                }
            },
            Some("local") => BasicBackendChoice::Local,
            Some("fallback") => BasicBackendChoice::Fallback,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: ENV_BASIC_BACKEND,
                    value: other.to_string(),
                    reason: "expected remote, local or fallback".to_string(),
                });
            }
        };

        let request_timeout = get(ENV_REQUEST_TIMEOUT_SECS)
            .map(|raw| parse_number::<u64>(ENV_REQUEST_TIMEOUT_SECS, &raw))
            .transpose()?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let defaults = LedgerLimits::default();
        let limit = |key: &'static str, default: u32| -> Result<u32, ConfigError> {
            get(key).map_or(Ok(default), |raw| parse_number(key, &raw))
        };
        let limits = LedgerLimits {
            guest_scan_limit: limit(ENV_GUEST_SCAN_LIMIT, defaults.guest_scan_limit)?,
            free_daily_limit: limit(ENV_FREE_DAILY_LIMIT, defaults.free_daily_limit)?,
            paid_starting_credits: limit(ENV_PAID_CREDITS, defaults.paid_starting_credits)?,
        };

        Ok(Self {
            gemini,
            basic_backend,
            request_timeout,
            limits,
        })
    }
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
