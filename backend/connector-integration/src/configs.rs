//! Merchant-side configuration for the Postfinance connector.

use std::path::PathBuf;

use hyperswitch_masking::{PeekInterface, Secret};
use serde::Deserialize;
use url::Url;

/// Prefix for environment overrides, e.g. `POSTFINANCE__SHA_IN_KEY`.
const ENV_PREFIX: &str = "POSTFINANCE";

const DEFAULT_CONFIG_PATH: &str = "config/postfinance.toml";

/// Postfinance e-payment test environment; production deployments override
/// this with the live order-standard endpoint.
const DEFAULT_PAYMENT_LINK: &str = "https://e-payment.postfinance.ch/ncol/test/orderstandard.asp";

#[derive(Clone, Debug, Deserialize)]
pub struct PostfinanceConfig {
    /// Merchant/affiliation id in the gateway's system.
    pub pspid: Secret<String>,
    /// Secret signing the outbound request parameters.
    pub sha_in_key: Secret<String>,
    /// Secret the gateway signs its callbacks with.
    pub sha_out_key: Secret<String>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Hosted payment page the customer is redirected to.
    #[serde(default = "default_payment_link")]
    pub payment_link: Url,
}

fn default_language() -> String {
    "en_US".to_string()
}

fn default_payment_link() -> Url {
    Url::parse(DEFAULT_PAYMENT_LINK).expect("default payment link is a valid url")
}

impl PostfinanceConfig {
    /// Builds the configuration from the default file location plus
    /// environment overrides.
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::new_with_config_path(None)
    }

    pub fn new_with_config_path(
        explicit_config_path: Option<PathBuf>,
    ) -> Result<Self, config::ConfigError> {
        let config_path =
            explicit_config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let config = config::Config::builder()
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .separator("__"),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.pspid.peek().is_empty() {
            return Err(config::ConfigError::Message(
                "pspid must not be empty".to_string(),
            ));
        }
        if self.sha_in_key.peek().is_empty() {
            return Err(config::ConfigError::Message(
                "sha_in_key must not be empty".to_string(),
            ));
        }
        if self.sha_out_key.peek().is_empty() {
            return Err(config::ConfigError::Message(
                "sha_out_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
