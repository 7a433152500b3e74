//! Configuration for the payment-settlement client.
//!
//! Values missing from the config file fall back to environment variables,
//! then to hardcoded defaults, during deserialization. Defaults are resolved
//! once when the configuration is loaded — never re-derived per call.

use alloy_primitives::Address;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use url::Url;

/// Client configuration.
///
/// `relay_api_key` and `price_feed_api_key` are optional: the corresponding
/// operations (gasless submission, price quotes) fail fast with a
/// configuration error when the credential is absent, before any network call.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsConfig {
    /// EIP-155 chain id of the target network.
    pub chain_id: u64,
    /// JSON-RPC endpoint for contract calls.
    pub rpc_url: Url,
    /// Address of the marketplace token contract.
    pub token_address: Address,
    /// Address of the payment processing contract.
    pub processor_address: Address,
    /// Token precision used for decimal <-> base-unit conversion.
    #[serde(default = "config_defaults::default_token_decimals")]
    pub token_decimals: u8,
    /// EIP-712 domain name of the token's meta-transaction domain.
    #[serde(default = "config_defaults::default_eip712_name")]
    pub eip712_name: String,
    /// EIP-712 domain version of the token's meta-transaction domain.
    #[serde(default = "config_defaults::default_eip712_version")]
    pub eip712_version: String,
    /// Relay credential for the gasless path. Absent means gasless operations
    /// are not configured.
    #[serde(default = "config_defaults::default_relay_api_key")]
    pub relay_api_key: Option<String>,
    /// JSON-RPC endpoint of the gasless relay. Falls back to `rpc_url` when
    /// unset.
    #[serde(default)]
    pub relay_url: Option<Url>,
    /// API key for the external price-quote service.
    #[serde(default = "config_defaults::default_price_feed_api_key")]
    pub price_feed_api_key: Option<String>,
    /// Base URL of the price-quote service.
    #[serde(default = "config_defaults::default_quote_url")]
    pub quote_url: Url,
}

pub mod config_defaults {
    use std::env;
    use url::Url;

    pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;
    pub const DEFAULT_QUOTE_URL: &str = "https://api.coingecko.com/api/v3/";

    /// Default precision: $STORPAY_TOKEN_DECIMALS env var -> 18
    pub fn default_token_decimals() -> u8 {
        env::var("STORPAY_TOKEN_DECIMALS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_DECIMALS)
    }

    pub fn default_eip712_name() -> String {
        env::var("STORPAY_EIP712_NAME").unwrap_or_else(|_| "StorageMarketToken".to_string())
    }

    pub fn default_eip712_version() -> String {
        env::var("STORPAY_EIP712_VERSION").unwrap_or_else(|_| "1".to_string())
    }

    pub fn default_relay_api_key() -> Option<String> {
        env::var("STORPAY_RELAY_API_KEY").ok()
    }

    pub fn default_price_feed_api_key() -> Option<String> {
        env::var("STORPAY_PRICE_FEED_API_KEY").ok()
    }

    pub fn default_quote_url() -> Url {
        env::var("STORPAY_QUOTE_URL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| {
                DEFAULT_QUOTE_URL
                    .parse()
                    .expect("default quote URL is valid")
            })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl PaymentsConfig {
    /// Load configuration from a JSON file. Values not present in the file are
    /// resolved via environment variables or defaults during deserialization.
    pub fn load_from_path(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::FileRead(path, e))?;
        let config: PaymentsConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}
