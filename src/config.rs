use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid PORT value {value:?}: {source}")]
    InvalidPort {
        value: String,
        source: std::num::ParseIntError,
    },
}

/// Credentials and addresses for the WhatsApp channel. Only constructed when
/// all four values are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub visitors_file: PathBuf,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub base_url: Option<String>,
    pub force_https: bool,
    pub twilio: Option<TwilioConfig>,
    pub twilio_api_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Build a config from an arbitrary set of key/value pairs. Empty values
    /// count as unset.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        let get = |key: &str| vars.get(key).cloned();

        let port = match get("PORT") {
            Some(value) => value
                .parse()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => DEFAULT_PORT,
        };

        let twilio = match (
            get("TWILIO_ACCOUNT_SID"),
            get("TWILIO_AUTH_TOKEN"),
            get("TWILIO_WHATSAPP_NUMBER"),
            get("HOST_WHATSAPP_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from), Some(to)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                from,
                to,
            }),
            _ => {
                info!("WhatsApp credentials not configured, notifications disabled");
                None
            }
        };

        let force_https =
            get("VERCEL").is_some() || get("NODE_ENV").as_deref() == Some("production");

        Ok(Self {
            port,
            visitors_file: get("VISITORS_FILE")
                .unwrap_or_else(|| "visitors.json".to_string())
                .into(),
            upload_dir: get("UPLOAD_DIR")
                .unwrap_or_else(|| "uploads".to_string())
                .into(),
            static_dir: get("STATIC_DIR")
                .unwrap_or_else(|| "static".to_string())
                .into(),
            base_url: get("BASE_URL"),
            force_https,
            twilio,
            twilio_api_base: get("TWILIO_API_BASE")
                .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
        })
    }
}
