use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_WIDTH: u32 = 1024;
const DEFAULT_QUALITY: f32 = 0.8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is not a valid URL: {source}")]
    InvalidUrl {
        key: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("{key} has an invalid value: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("HTTP client could not be built: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Recompression applied to uploads before they are sent for prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionConfig {
    pub max_width: u32,
    pub quality: f32,
}

/// Process-wide endpoint configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub prediction_url: Option<Url>,
    pub advice_url: Option<Url>,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub compression: Option<CompressionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prediction_url: None,
            advice_url: None,
            api_key: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            compression: None,
        }
    }
}

impl Config {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset.
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let prediction_url = get("MODEL_API_URL")
            .map(|raw| parse_url("MODEL_API_URL", &raw))
            .transpose()?;
        let advice_url = get("ADVICE_API_URL")
            .map(|raw| parse_url("ADVICE_API_URL", &raw))
            .transpose()?;

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or(ConfigError::InvalidValue {
                        key: "REQUEST_TIMEOUT_SECS",
                        value: raw.clone(),
                    })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let compression = match get("UPLOAD_COMPRESS").as_deref() {
            Some("true") | Some("1") => {
                let max_width = match get("UPLOAD_MAX_WIDTH") {
                    Some(raw) => raw.parse::<u32>().ok().filter(|w| *w > 0).ok_or(
                        ConfigError::InvalidValue {
                            key: "UPLOAD_MAX_WIDTH",
                            value: raw.clone(),
                        },
                    )?,
                    None => DEFAULT_MAX_WIDTH,
                };
                let quality = match get("UPLOAD_QUALITY") {
                    Some(raw) => raw
                        .parse::<f32>()
                        .ok()
                        .filter(|q| (0.0..=1.0).contains(q))
                        .ok_or(ConfigError::InvalidValue {
                            key: "UPLOAD_QUALITY",
                            value: raw.clone(),
                        })?,
                    None => DEFAULT_QUALITY,
                };
                Some(CompressionConfig { max_width, quality })
            }
            Some("false") | Some("0") | None => None,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "UPLOAD_COMPRESS",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            prediction_url,
            advice_url,
            api_key: get("API_KEY"),
            request_timeout,
            compression,
        })
    }

    /// Predictions are simulated whenever no model endpoint is configured.
    pub fn is_demo_mode(&self) -> bool {
        self.prediction_url.is_none()
    }

    /// Advice is simulated unless both endpoints are configured.
    pub fn is_advice_demo_mode(&self) -> bool {
        self.prediction_url.is_none() || self.advice_url.is_none()
    }
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { key, source })
}
