//! Update request pipeline
//!
//! The UpdatePipeline turns one inbound update call into at most one DNS
//! change:
//!
//! ```text
//!  Authorization header          path + query params
//!          │                             │
//!          ▼                             ▼
//! ┌─────────────────┐  allow   ┌──────────────────┐
//! │ CredentialGate  │────────▶ │ validate()       │
//! └─────────────────┘          └──────────────────┘
//!          │ deny                        │
//!          │                             ▼
//!          │                   ┌──────────────────┐     ┌────────────┐
//!          │                   │ ZoneResolver     │────▶│ ZoneClient │
//!          │                   └──────────────────┘     │ (list)     │
//!          │                             │              └────────────┘
//!          │                             ▼
//!          │                   ┌──────────────────┐     ┌────────────┐
//!          │                   │ RecordMutator    │────▶│ ZoneClient │
//!          │                   └──────────────────┘     │ (upsert)   │
//!          │                             │              └────────────┘
//!          ▼                             ▼
//!        ┌───────────────────────────────────┐
//!        │ response::encode()                │
//!        └───────────────────────────────────┘
//! ```
//!
//! Each stage short-circuits to the encoder on failure. The upsert is only
//! attempted with a validated request and a resolved zone.
//!
//! ## Concurrency
//!
//! The pipeline owns no mutable state: the reference credential and the zone
//! client are shared read-only, so one instance serves any number of
//! concurrent requests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::auth::{
    AuthorizationDecision, AuthorizerRequest, AuthorizerResponse, CredentialGate,
    EXECUTE_API_INVOKE,
};
use crate::config::{GatewayConfig, PipelineConfig};
use crate::error::{AuthFailure, Error, Result};
use crate::mutator::{RecordMutator, UpdateSummary};
use crate::resolver::ZoneResolver;
use crate::response::{self, HttpReply};
use crate::traits::ZoneClient;
use crate::validate::{self, UpdateRequest};

/// One inbound update call, as delivered by the invocation layer
#[derive(Debug, Clone, Default)]
pub struct UpdateInvocation {
    /// Raw `Authorization` header value, if any
    pub authorization: Option<String>,
    /// Identifier of the invoked resource (method ARN, or `METHOD /path`)
    pub resource: String,
    /// Path and query parameters merged
    pub params: HashMap<String, String>,
}

/// The request pipeline
pub struct UpdatePipeline {
    gate: CredentialGate,
    client: Arc<dyn ZoneClient>,
    config: PipelineConfig,
    verbose: bool,
}

impl UpdatePipeline {
    /// Create a pipeline
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn new(config: &GatewayConfig, client: Arc<dyn ZoneClient>) -> Result<Self> {
        config.validate()?;

        info!(
            "Update pipeline ready (backend: {}, max zone pages: {}, timeout: {}s)",
            client.client_name(),
            config.pipeline.max_zone_pages,
            config.pipeline.request_timeout_secs
        );

        Ok(Self {
            gate: CredentialGate::new(config.credential.clone()),
            client,
            config: config.pipeline.clone(),
            verbose: config.verbose,
        })
    }

    /// Gateway-native authorizer
    ///
    /// Allows exactly `execute-api:Invoke` on exactly the invoked method.
    /// A deny is the `Err` side, so the gateway answers 401.
    pub fn authorize(
        &self,
        request: &AuthorizerRequest,
    ) -> std::result::Result<AuthorizerResponse, AuthFailure> {
        let decision = self.gate.authenticate_header(
            request.authorization_token.as_deref(),
            EXECUTE_API_INVOKE,
            &request.method_arn,
        );

        match decision {
            Ok(decision) => Ok(AuthorizerResponse::from(&decision)),
            Err(failure) => {
                warn!("Authorizer denied {}: {}", request.method_arn, failure);
                Err(failure)
            }
        }
    }

    /// Authenticate an inline update call
    pub fn authenticate(
        &self,
        invocation: &UpdateInvocation,
    ) -> std::result::Result<AuthorizationDecision, AuthFailure> {
        self.gate.authenticate_header(
            invocation.authorization.as_deref(),
            EXECUTE_API_INVOKE,
            &invocation.resource,
        )
    }

    /// Handle an update call end to end
    ///
    /// Always produces a reply; failures are encoded, never propagated.
    pub async fn handle(&self, invocation: &UpdateInvocation) -> HttpReply {
        let outcome = match self.authenticate(invocation) {
            Ok(decision) => {
                debug!("Authenticated {} for {}", decision.principal, decision.allowed_resource);
                self.process(&invocation.params).await
            }
            Err(failure) => Err(Error::Auth(failure)),
        };

        let reply = response::encode(&outcome);
        match &outcome {
            Ok(summary) => info!(
                "{} {} - {} {} -> {} (change {})",
                reply.status.as_u16(),
                invocation.resource,
                summary.fqdn,
                summary.record_type,
                summary.value,
                summary.change_id
            ),
            Err(err) => warn!(
                "{} {} - {} ({:?})",
                reply.status.as_u16(),
                invocation.resource,
                err,
                err.kind()
            ),
        }
        reply
    }

    /// Validate, resolve and upsert
    ///
    /// For calls already authorized upstream (gateway authorizer mode).
    pub async fn process(&self, params: &HashMap<String, String>) -> Result<UpdateSummary> {
        let request = validate::validate(params)?;
        if self.verbose {
            debug!("Update requested: {:?}", request);
        }

        let upstream = self.apply(&request);
        match self.timeout() {
            Some(limit) => tokio::time::timeout(limit, upstream).await.map_err(|_| {
                Error::upstream_msg(format!("request deadline of {:?} exceeded", limit))
            })?,
            None => upstream.await,
        }
    }

    async fn apply(&self, request: &UpdateRequest) -> Result<UpdateSummary> {
        let zone = ZoneResolver::new(self.client.as_ref(), self.config.max_zone_pages)
            .resolve(&request.domain)
            .await?;

        RecordMutator::new(self.client.as_ref())
            .upsert(&zone, request)
            .await
    }

    fn timeout(&self) -> Option<Duration> {
        match self.config.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ReferenceCredential, ZoneBackendConfig};
    use crate::traits::HostedZone;
    use crate::zones::MemoryZoneClient;

    fn config() -> GatewayConfig {
        GatewayConfig::new(
            ReferenceCredential::new("alice", "s3cret"),
            ZoneBackendConfig::Memory {
                zones: Vec::new(),
                page_size: 10,
            },
        )
    }

    fn client() -> Arc<dyn ZoneClient> {
        Arc::new(MemoryZoneClient::new(vec![HostedZone::new("Z1", "example.com.")], 10))
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = config();
        bad.credential = ReferenceCredential::new("", "s3cret");
        assert!(UpdatePipeline::new(&bad, client()).is_err());
    }

    #[test]
    fn test_timeout_disabled_by_zero() {
        let mut cfg = config();
        cfg.pipeline.request_timeout_secs = 0;
        let pipeline = UpdatePipeline::new(&cfg, client()).unwrap();
        assert!(pipeline.timeout().is_none());

        let pipeline = UpdatePipeline::new(&config(), client()).unwrap();
        assert_eq!(pipeline.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_authorizer_denies_without_token() {
        let pipeline = UpdatePipeline::new(&config(), client()).unwrap();
        let request = AuthorizerRequest {
            kind: Some("TOKEN".to_string()),
            authorization_token: None,
            method_arn: "arn:method".to_string(),
        };
        assert_eq!(
            pipeline.authorize(&request).unwrap_err(),
            AuthFailure::MissingCredentials
        );
    }
}
