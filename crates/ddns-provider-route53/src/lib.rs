// # Route 53 Zone Client
//
// This crate backs the gateway's ZoneClient trait with AWS Route 53, and
// resolves the reference secret from the SSM parameter store.
//
// ## Behaviour
//
// - One SDK call per trait call: `ListHostedZones` per catalog page,
//   `ChangeResourceRecordSets` per upsert
// - NO retry logic of its own: SDK failures surface as upstream failures and
//   the caller decides what to do with them
// - NO caching of the zone catalog between requests
//
// ## Credentials
//
// AWS credentials and region come from the standard AWS environment chain
// (environment variables, profile, instance/task role). A region in the
// backend config overrides the chain's region.
//
// ## API Reference
//
// - ListHostedZones: https://docs.aws.amazon.com/Route53/latest/APIReference/API_ListHostedZones.html
// - ChangeResourceRecordSets: https://docs.aws.amazon.com/Route53/latest/APIReference/API_ChangeResourceRecordSets.html

pub mod convert;
pub mod parameter_store;

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_route53::error::DisplayErrorContext;
use ddns_core::config::ZoneBackendConfig;
use ddns_core::registry::ZoneClientRegistry;
use ddns_core::traits::{ChangeBatch, ChangeInfo, ZoneClient, ZoneClientFactory, ZonePage};
use ddns_core::{Error, Result};
use tracing::{debug, warn};

pub use parameter_store::{ParameterStore, fetch_secret_parameter};

/// Load the shared AWS configuration, optionally pinning the region
pub async fn load_sdk_config(region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}

/// Route 53 zone client
#[derive(Debug, Clone)]
pub struct Route53ZoneClient {
    client: aws_sdk_route53::Client,
}

impl Route53ZoneClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_route53::Client::new(config),
        }
    }

    /// Create a client from the AWS environment
    pub async fn from_env(region: Option<&str>) -> Self {
        Self::new(&load_sdk_config(region).await)
    }
}

#[async_trait]
impl ZoneClient for Route53ZoneClient {
    async fn list_zones(&self, marker: Option<&str>) -> Result<ZonePage> {
        debug!("ListHostedZones (marker: {:?})", marker);

        let output = self
            .client
            .list_hosted_zones()
            .set_marker(marker.map(str::to_string))
            .send()
            .await
            .map_err(|e| {
                warn!("ListHostedZones failed: {}", DisplayErrorContext(&e));
                Error::upstream("ListHostedZones", e)
            })?;

        Ok(convert::zone_page(
            output.hosted_zones(),
            output.is_truncated(),
            output.next_marker(),
        ))
    }

    async fn change_record_sets(&self, zone_id: &str, batch: &ChangeBatch) -> Result<ChangeInfo> {
        let sdk_batch = convert::change_batch(batch)?;

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(sdk_batch)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    "ChangeResourceRecordSets on {} failed: {}",
                    zone_id,
                    DisplayErrorContext(&e)
                );
                Error::upstream("ChangeResourceRecordSets", e)
            })?;

        let info = output
            .change_info()
            .ok_or_else(|| Error::upstream_msg("ChangeResourceRecordSets returned no change info"))?;

        Ok(convert::change_info(info))
    }

    fn client_name(&self) -> &'static str {
        "route53"
    }
}

/// Factory for creating Route 53 zone clients
pub struct Route53Factory;

#[async_trait]
impl ZoneClientFactory for Route53Factory {
    async fn create(&self, config: &ZoneBackendConfig) -> Result<Arc<dyn ZoneClient>> {
        match config {
            ZoneBackendConfig::Route53 { region } => {
                config.validate()?;
                Ok(Arc::new(Route53ZoneClient::from_env(region.as_deref()).await))
            }
            _ => Err(Error::config("Invalid config type for Route53Factory")),
        }
    }
}

/// Register the Route 53 backend with a registry
///
/// # Example
///
/// ```rust,ignore
/// use ddns_core::ZoneClientRegistry;
///
/// let registry = ZoneClientRegistry::with_builtin();
/// ddns_provider_route53::register(&registry);
/// ```
pub fn register(registry: &ZoneClientRegistry) {
    registry.register("route53", Box::new(Route53Factory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::ErrorKind;

    #[tokio::test]
    async fn test_factory_rejects_other_backends() {
        let config = ZoneBackendConfig::Memory {
            zones: Vec::new(),
            page_size: 10,
        };

        let err = Route53Factory.create(&config).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[tokio::test]
    async fn test_factory_rejects_empty_region() {
        let config = ZoneBackendConfig::Route53 {
            region: Some(String::new()),
        };

        let err = Route53Factory.create(&config).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[tokio::test]
    async fn test_factory_creates_client_with_region() {
        let config: ZoneBackendConfig =
            serde_json::from_value(serde_json::json!({"type": "route53", "region": "us-east-1"}))
                .unwrap();

        let client = Route53Factory.create(&config).await.unwrap();
        assert_eq!(client.client_name(), "route53");
    }

    #[test]
    fn test_register() {
        let registry = ZoneClientRegistry::with_builtin();
        register(&registry);

        assert!(registry.has_backend("route53"));
        assert!(registry.has_backend("memory"));
    }
}
