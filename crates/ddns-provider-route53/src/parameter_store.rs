// # SSM Parameter Store
//
// Resolves the gateway's reference secret from an encrypted SSM parameter,
// once, at startup. The value is wrapped in a SecretString as soon as it
// leaves the SDK and is never logged.

use aws_config::SdkConfig;
use aws_sdk_ssm::error::DisplayErrorContext;
use ddns_core::{Error, Result};
use secrecy::SecretString;
use tracing::{debug, error};

/// Reads decrypted SecureString parameters
#[derive(Debug, Clone)]
pub struct ParameterStore {
    client: aws_sdk_ssm::Client,
}

impl ParameterStore {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_ssm::Client::new(config),
        }
    }

    /// Create a store from the AWS environment, with an optional region override
    pub async fn from_env(region: Option<&str>) -> Self {
        Self::new(&crate::load_sdk_config(region).await)
    }

    /// Fetch and decrypt parameter `name`
    ///
    /// # Errors
    ///
    /// `Error::Config` if the parameter cannot be read or has no value; the
    /// gateway cannot start without its secret.
    pub async fn fetch_secret(&self, name: &str) -> Result<SecretString> {
        debug!("Fetching secret parameter {}", name);

        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| {
                error!("GetParameter {} failed: {}", name, DisplayErrorContext(&e));
                Error::config(format!("cannot read secret parameter {}", name))
            })?;

        let value = output
            .parameter()
            .and_then(|p| p.value())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config(format!("secret parameter {} has no value", name)))?;

        Ok(SecretString::from(value.to_string()))
    }
}

/// Fetch one secret parameter using the ambient AWS configuration
pub async fn fetch_secret_parameter(name: &str, region: Option<&str>) -> Result<SecretString> {
    ParameterStore::from_env(region).await.fetch_secret(name).await
}
