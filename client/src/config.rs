use crate::{BetPolicy, CallOptions, SessionConfig};
use commonware_codec::DecodeExt;
use commonware_cryptography::ed25519::PrivateKey;
use commonware_utils::from_hex_formatted;
use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::Level;

/// Configuration shared by the command-line tools.
#[derive(Debug, Deserialize, Serialize)]
pub struct ClientConfig {
    pub url: String,
    pub private_key: String,

    #[serde(default)]
    pub bet_policy: BetPolicy,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("private_key must be hex: {value}")]
    InvalidHex { value: String },
    #[error("private_key is invalid: {0}")]
    InvalidKey(#[source] commonware_codec::Error),
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("timeout_ms must be > 0")]
    InvalidTimeout,
}

/// A [ClientConfig] whose fields have been parsed and checked.
pub struct ValidatedConfig {
    pub url: String,
    pub signer: PrivateKey,
    pub session: SessionConfig,
    pub timeout: Option<Duration>,
    pub log_level: Level,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ClientConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn parse_signer(&self) -> Result<PrivateKey, ConfigError> {
        let bytes =
            from_hex_formatted(&self.private_key).ok_or_else(|| ConfigError::InvalidHex {
                value: self.private_key.clone(),
            })?;
        PrivateKey::decode(bytes.as_slice()).map_err(ConfigError::InvalidKey)
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let signer = self.parse_signer()?;
        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;
        let timeout = match self.timeout_ms {
            Some(0) => return Err(ConfigError::InvalidTimeout),
            Some(ms) => Some(Duration::from_millis(ms)),
            None => None,
        };

        Ok(ValidatedConfig {
            url: self.url,
            signer,
            session: SessionConfig {
                bet_policy: self.bet_policy,
            },
            timeout,
            log_level,
        })
    }
}

impl ValidatedConfig {
    /// Options for one call, with the configured timeout starting now.
    pub fn call_options(&self) -> CallOptions {
        match self.timeout {
            Some(timeout) => CallOptions::new().with_timeout(timeout),
            None => CallOptions::new(),
        }
    }
}
