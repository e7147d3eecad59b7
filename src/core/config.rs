use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stand-in for secrets missing from the environment. Calls made with it fail at the provider.
pub const PLACEHOLDER: &str = "*****";

pub const DEFAULT_GOLD_BASE_URL: &str = "https://www.goldapi.io/api";
pub const DEFAULT_EXCHANGE_BASE_URL: &str = "https://v6.exchangerate-api.com/v6";
pub const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_LEDGER_PATH: &str = "market_data.csv";
pub const DEFAULT_LOCAL_CURRENCY: &str = "EGP";

#[derive(Clone, PartialEq, Eq)]
pub struct Secrets {
    pub gold_api_key: String,
    pub exchange_api_key: String,
    pub email_sender: String,
    pub email_password: String,
    pub email_receiver: String,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("gold_api_key", &redact(&self.gold_api_key))
            .field("exchange_api_key", &redact(&self.exchange_api_key))
            .field("email_sender", &self.email_sender)
            .field("email_password", &redact(&self.email_password))
            .field("email_receiver", &self.email_receiver)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret == PLACEHOLDER {
        "<unset>"
    } else {
        "<redacted>"
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    pub gold: Option<ProviderConfig>,
    pub exchange_rate: Option<ProviderConfig>,
    pub coingecko: Option<ProviderConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        SmtpConfig {
            host: "smtp.gmail.com".to_string(),
            port: 465,
        }
    }
}

/// Optional YAML settings. Secrets only come from the environment.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SettingsFile {
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub smtp: Option<SmtpConfig>,
    pub ledger_path: Option<PathBuf>,
    pub local_currency: Option<String>,
}

impl SettingsFile {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let settings: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded settings file");
        Ok(settings)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub secrets: Secrets,
    pub gold_base_url: String,
    pub exchange_base_url: String,
    pub coingecko_base_url: String,
    pub smtp: SmtpConfig,
    pub ledger_path: PathBuf,
    pub local_currency: String,
}

impl AppConfig {
    /// Builds the configuration from the process environment and an optional settings file.
    pub fn load(settings_path: Option<&Path>) -> Result<Self> {
        debug!("Loading config from environment");
        Self::from_lookup(|key| std::env::var(key).ok(), settings_path)
    }

    /// Same as [`AppConfig::load`] with a custom variable lookup.
    pub fn from_lookup<F>(lookup: F, settings_path: Option<&Path>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = |key: &str| lookup(key).unwrap_or_else(|| PLACEHOLDER.to_string());
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let settings = match settings_path {
            Some(path) => SettingsFile::load_from_path(path)?,
            None => SettingsFile::default(),
        };
        let ProvidersConfig {
            gold,
            exchange_rate,
            coingecko,
        } = settings.providers;

        Ok(AppConfig {
            secrets: Secrets {
                gold_api_key: secret("GOLD_API_KEY"),
                exchange_api_key: secret("EXCHANGE_API_KEY"),
                email_sender: secret("EMAIL_SENDER"),
                email_password: secret("EMAIL_PASSWORD"),
                email_receiver: secret("EMAIL_RECEIVER"),
            },
            gold_base_url: gold
                .map(|p| p.base_url)
                .unwrap_or_else(|| or_default("GOLD_API_BASE_URL", DEFAULT_GOLD_BASE_URL)),
            exchange_base_url: exchange_rate
                .map(|p| p.base_url)
                .unwrap_or_else(|| or_default("EXCHANGE_API_BASE_URL", DEFAULT_EXCHANGE_BASE_URL)),
            coingecko_base_url: coingecko
                .map(|p| p.base_url)
                .unwrap_or_else(|| or_default("COINGECKO_BASE_URL", DEFAULT_COINGECKO_BASE_URL)),
            smtp: settings.smtp.unwrap_or_default(),
            ledger_path: settings
                .ledger_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_PATH)),
            local_currency: settings
                .local_currency
                .unwrap_or_else(|| DEFAULT_LOCAL_CURRENCY.to_string()),
        })
    }
}
