//! Configuration types for the DDNS update gateway
//!
//! All of these are built once at process start and shared read-only
//! afterwards. Nothing here is reloaded.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Default cap on zone catalog pages fetched per request
pub const DEFAULT_MAX_ZONE_PAGES: usize = 100;

/// Default deadline for the upstream part of a request (in seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default page size of the in-memory zone catalog
pub const DEFAULT_MEMORY_PAGE_SIZE: usize = 100;

/// Main gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Reference credential presented credentials are compared against
    pub credential: ReferenceCredential,

    /// Zone store backend
    pub backend: ZoneBackendConfig,

    /// Optional pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Verbose (debug) logging
    #[serde(default)]
    pub verbose: bool,
}

impl GatewayConfig {
    /// Create a configuration with default pipeline settings
    pub fn new(credential: ReferenceCredential, backend: ZoneBackendConfig) -> Self {
        Self {
            credential,
            backend,
            pipeline: PipelineConfig::default(),
            verbose: false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.credential.validate()?;
        self.backend.validate()?;
        self.pipeline.validate()?;
        Ok(())
    }
}

/// The process-wide reference credential
///
/// The secret is wrapped in [`SecretString`], so `Debug` never shows it.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceCredential {
    /// Expected identity (user name)
    pub identity: String,

    /// Expected secret
    pub secret: SecretString,
}

impl ReferenceCredential {
    /// Create a reference credential
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// Validate the credential is usable
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.identity.is_empty() {
            return Err(crate::Error::config("Reference identity cannot be empty"));
        }
        if self.identity.contains(':') {
            return Err(crate::Error::config(
                "Reference identity cannot contain ':'",
            ));
        }
        if self.secret.expose_secret().is_empty() {
            return Err(crate::Error::config("Reference secret cannot be empty"));
        }
        Ok(())
    }
}

/// Zone store backend configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZoneBackendConfig {
    /// AWS Route 53
    Route53 {
        /// Region override (defaults to the AWS environment chain)
        region: Option<String>,
    },

    /// In-memory zone catalog (local runs and tests)
    Memory {
        /// Zones to serve
        zones: Vec<MemoryZoneConfig>,
        /// Zones per catalog page
        #[serde(default = "default_memory_page_size")]
        page_size: usize,
    },

    /// Custom backend
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ZoneBackendConfig {
    /// Validate the backend configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ZoneBackendConfig::Route53 { region } => {
                if region.as_deref().is_some_and(str::is_empty) {
                    return Err(crate::Error::config("Route 53 region cannot be empty"));
                }
                Ok(())
            }
            ZoneBackendConfig::Memory { zones, page_size } => {
                if *page_size == 0 {
                    return Err(crate::Error::config("Memory backend page size must be > 0"));
                }
                for zone in zones {
                    if zone.name.is_empty() || zone.id.is_empty() {
                        return Err(crate::Error::config(
                            "Memory backend zones need a name and an id",
                        ));
                    }
                }
                Ok(())
            }
            ZoneBackendConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom backend factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom backend config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the backend type name
    pub fn type_name(&self) -> &str {
        match self {
            ZoneBackendConfig::Route53 { .. } => "route53",
            ZoneBackendConfig::Memory { .. } => "memory",
            ZoneBackendConfig::Custom { factory, .. } => factory,
        }
    }
}

/// One zone served by the in-memory backend
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemoryZoneConfig {
    /// Zone name (trailing dot optional)
    pub name: String,
    /// Opaque zone id
    pub id: String,
}

impl MemoryZoneConfig {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

fn default_memory_page_size() -> usize {
    DEFAULT_MEMORY_PAGE_SIZE
}

/// Request pipeline settings
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Upper bound on zone catalog pages fetched per resolution
    ///
    /// Guards against an upstream that never clears its truncation flag.
    #[serde(default = "default_max_zone_pages")]
    pub max_zone_pages: usize,

    /// Deadline for zone resolution plus record upsert (in seconds)
    ///
    /// Set to 0 to disable the deadline.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl PipelineConfig {
    /// Validate the pipeline settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.max_zone_pages == 0 {
            return Err(crate::Error::config("Max zone pages must be > 0"));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_zone_pages: default_max_zone_pages(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_max_zone_pages() -> usize {
    DEFAULT_MAX_ZONE_PAGES
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
