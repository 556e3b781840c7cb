// # Daemon Configuration
//
// All configuration comes from environment variables, read once at startup.
//
// ### Credential
// - `DDNS_AUTH_IDENTITY`: Identity callers must present (required)
// - `DDNS_AUTH_SECRET`: Secret callers must present
// - `DDNS_AUTH_SECRET_PARAMETER`: SSM SecureString parameter holding the secret
//   (exactly one of the two secret variables must be set)
//
// ### Zone Store
// - `DDNS_ZONE_BACKEND`: `route53` (default) or `memory`
// - `DDNS_AWS_REGION`: Region override for Route 53 and SSM
// - `DDNS_MEMORY_ZONES`: Zones for the memory backend, `name=id,name=id`
// - `DDNS_MEMORY_PAGE_SIZE`: Zones per catalog page for the memory backend
//
// ### Pipeline
// - `DDNS_MAX_ZONE_PAGES`: Catalog page cap per request (default 100)
// - `DDNS_REQUEST_TIMEOUT_SECS`: Upstream deadline per request, 0 disables (default 30)
//
// ### Server
// - `DDNS_LISTEN_ADDR`: Listen address (default `0.0.0.0:8080`)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `DDNS_DEBUG`: `true` forces debug logging and verbose request logs

use anyhow::{Context, Result};
use ddns_core::config::{
    DEFAULT_MAX_ZONE_PAGES, DEFAULT_MEMORY_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS,
    MemoryZoneConfig, PipelineConfig,
};
use ddns_core::{GatewayConfig, ReferenceCredential, ZoneBackendConfig};
use secrecy::SecretString;
use std::net::SocketAddr;
use std::str::FromStr;
use tracing::Level;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Daemon configuration
#[derive(Debug)]
pub struct Config {
    pub auth_identity: String,
    pub auth_secret: Option<SecretString>,
    pub auth_secret_parameter: Option<String>,
    pub zone_backend: String,
    pub aws_region: Option<String>,
    pub memory_zones: Vec<MemoryZoneConfig>,
    pub memory_page_size: usize,
    pub max_zone_pages: usize,
    pub request_timeout_secs: u64,
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub debug: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            auth_identity: var("DDNS_AUTH_IDENTITY").unwrap_or_default(),
            // The secret is taken verbatim; surrounding whitespace may be part of it
            auth_secret: lookup("DDNS_AUTH_SECRET")
                .filter(|v| !v.is_empty())
                .map(SecretString::from),
            auth_secret_parameter: var("DDNS_AUTH_SECRET_PARAMETER"),
            zone_backend: var("DDNS_ZONE_BACKEND").unwrap_or_else(|| "route53".to_string()),
            aws_region: var("DDNS_AWS_REGION"),
            memory_zones: match var("DDNS_MEMORY_ZONES") {
                Some(raw) => parse_memory_zones(&raw)?,
                None => Vec::new(),
            },
            memory_page_size: parse_or(
                var("DDNS_MEMORY_PAGE_SIZE"),
                "DDNS_MEMORY_PAGE_SIZE",
                DEFAULT_MEMORY_PAGE_SIZE,
            )?,
            max_zone_pages: parse_or(
                var("DDNS_MAX_ZONE_PAGES"),
                "DDNS_MAX_ZONE_PAGES",
                DEFAULT_MAX_ZONE_PAGES,
            )?,
            request_timeout_secs: parse_or(
                var("DDNS_REQUEST_TIMEOUT_SECS"),
                "DDNS_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            listen_addr: var("DDNS_LISTEN_ADDR")
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
                .parse()
                .context("DDNS_LISTEN_ADDR is not a valid socket address (e.g. 0.0.0.0:8080)")?,
            log_level: var("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            debug: match var("DDNS_DEBUG") {
                Some(raw) => parse_bool(&raw).context("DDNS_DEBUG must be true or false")?,
                None => false,
            },
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth_identity.is_empty() {
            anyhow::bail!(
                "DDNS_AUTH_IDENTITY is required. \
                Set it via: export DDNS_AUTH_IDENTITY=your_user"
            );
        }

        if self.auth_identity.contains(':') {
            anyhow::bail!("DDNS_AUTH_IDENTITY cannot contain ':'");
        }

        match (&self.auth_secret, &self.auth_secret_parameter) {
            (None, None) => anyhow::bail!(
                "One of DDNS_AUTH_SECRET or DDNS_AUTH_SECRET_PARAMETER is required"
            ),
            (Some(_), Some(_)) => anyhow::bail!(
                "DDNS_AUTH_SECRET and DDNS_AUTH_SECRET_PARAMETER are mutually exclusive"
            ),
            _ => {}
        }

        if self.auth_secret_parameter.is_some() && !cfg!(feature = "route53") {
            anyhow::bail!("DDNS_AUTH_SECRET_PARAMETER requires the route53 feature");
        }

        match self.zone_backend.as_str() {
            "route53" => {
                if !cfg!(feature = "route53") {
                    anyhow::bail!(
                        "DDNS_ZONE_BACKEND 'route53' is not available in this build. \
                        Supported backends: memory"
                    );
                }
            }
            "memory" => {
                if self.memory_zones.is_empty() {
                    anyhow::bail!(
                        "DDNS_MEMORY_ZONES is required when DDNS_ZONE_BACKEND=memory. \
                        Set it via: export DDNS_MEMORY_ZONES=example.com=Z1"
                    );
                }
            }
            other => anyhow::bail!(
                "DDNS_ZONE_BACKEND '{}' is not supported. \
                Supported backends: route53, memory",
                other
            ),
        }

        if self.memory_page_size == 0 {
            anyhow::bail!("DDNS_MEMORY_PAGE_SIZE must be at least 1");
        }

        if self.max_zone_pages == 0 {
            anyhow::bail!("DDNS_MAX_ZONE_PAGES must be at least 1");
        }

        if Level::from_str(&self.log_level).is_err() {
            anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            );
        }

        Ok(())
    }

    /// Effective log level; `DDNS_DEBUG` wins over `DDNS_LOG_LEVEL`
    pub fn log_level(&self) -> Level {
        if self.debug {
            return Level::DEBUG;
        }
        Level::from_str(&self.log_level).unwrap_or(Level::INFO)
    }

    /// Zone store backend configuration
    pub fn backend(&self) -> ZoneBackendConfig {
        match self.zone_backend.as_str() {
            "memory" => ZoneBackendConfig::Memory {
                zones: self.memory_zones.clone(),
                page_size: self.memory_page_size,
            },
            _ => ZoneBackendConfig::Route53 {
                region: self.aws_region.clone(),
            },
        }
    }

    /// Core gateway configuration, once the secret is resolved
    pub fn gateway(&self, secret: SecretString) -> GatewayConfig {
        GatewayConfig {
            credential: ReferenceCredential {
                identity: self.auth_identity.clone(),
                secret,
            },
            backend: self.backend(),
            pipeline: PipelineConfig {
                max_zone_pages: self.max_zone_pages,
                request_timeout_secs: self.request_timeout_secs,
            },
            verbose: self.debug,
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a non-negative integer, got '{}'", key, raw)),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => anyhow::bail!("invalid boolean '{}'", raw),
    }
}

/// Parse `name=id,name=id`
fn parse_memory_zones(raw: &str) -> Result<Vec<MemoryZoneConfig>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((name, id)) if !name.trim().is_empty() && !id.trim().is_empty() => {
                Ok(MemoryZoneConfig::new(name.trim(), id.trim()))
            }
            _ => anyhow::bail!(
                "DDNS_MEMORY_ZONES entry '{}' is not of the form name=id",
                entry
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    fn memory_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DDNS_AUTH_IDENTITY", "alice"),
            ("DDNS_AUTH_SECRET", "s3cret"),
            ("DDNS_ZONE_BACKEND", "memory"),
            ("DDNS_MEMORY_ZONES", "example.com=Z1, example.org.=Z2"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("DDNS_AUTH_IDENTITY", "alice"),
            ("DDNS_AUTH_SECRET", "s3cret"),
        ])
        .unwrap();

        assert_eq!(config.zone_backend, "route53");
        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.max_zone_pages, DEFAULT_MAX_ZONE_PAGES);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.log_level(), Level::INFO);
        assert!(!config.debug);
    }

    #[test]
    fn test_memory_backend() {
        let config = load(&memory_vars()).unwrap();
        config.validate().unwrap();

        match config.backend() {
            ZoneBackendConfig::Memory { zones, page_size } => {
                assert_eq!(
                    zones,
                    vec![
                        MemoryZoneConfig::new("example.com", "Z1"),
                        MemoryZoneConfig::new("example.org.", "Z2"),
                    ]
                );
                assert_eq!(page_size, DEFAULT_MEMORY_PAGE_SIZE);
            }
            other => panic!("unexpected backend {:?}", other),
        }
    }

    #[test]
    fn test_gateway_config_carries_secret() {
        let config = load(&memory_vars()).unwrap();
        let gateway = config.gateway(SecretString::from("s3cret"));

        assert_eq!(gateway.credential.identity, "alice");
        assert_eq!(gateway.credential.secret.expose_secret(), "s3cret");
        gateway.validate().unwrap();
    }

    #[test]
    fn test_missing_identity() {
        let config = load(&[("DDNS_AUTH_SECRET", "s3cret")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secret_sources_are_exclusive() {
        let none = load(&[("DDNS_AUTH_IDENTITY", "alice")]).unwrap();
        assert!(none.validate().is_err());

        let both = load(&[
            ("DDNS_AUTH_IDENTITY", "alice"),
            ("DDNS_AUTH_SECRET", "s3cret"),
            ("DDNS_AUTH_SECRET_PARAMETER", "/ddns/secret"),
        ])
        .unwrap();
        assert!(both.validate().is_err());
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let mut vars = memory_vars();
        vars.push(("DDNS_MAX_ZONE_PAGES", "many"));
        assert!(load(&vars).is_err());

        let mut vars = memory_vars();
        vars.push(("DDNS_MAX_ZONE_PAGES", "0"));
        assert!(load(&vars).unwrap().validate().is_err());
    }

    #[test]
    fn test_invalid_memory_zone_entry() {
        let err = load(&[
            ("DDNS_AUTH_IDENTITY", "alice"),
            ("DDNS_AUTH_SECRET", "s3cret"),
            ("DDNS_MEMORY_ZONES", "example.com"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("name=id"));
    }

    #[test]
    fn test_unknown_backend_and_level() {
        let mut vars = memory_vars();
        vars.push(("DDNS_ZONE_BACKEND", "bind"));
        // Later entries win in the lookup map
        assert!(load(&vars).unwrap().validate().is_err());

        let mut vars = memory_vars();
        vars.push(("DDNS_LOG_LEVEL", "chatty"));
        assert!(load(&vars).unwrap().validate().is_err());
    }

    #[test]
    fn test_debug_forces_debug_level() {
        let mut vars = memory_vars();
        vars.push(("DDNS_LOG_LEVEL", "warn"));
        vars.push(("DDNS_DEBUG", "true"));
        let config = load(&vars).unwrap();

        assert!(config.debug);
        assert_eq!(config.log_level(), Level::DEBUG);
        assert!(config.gateway(SecretString::from("s3cret")).verbose);
    }

    #[test]
    fn test_debug_output_hides_secret() {
        let config = load(&memory_vars()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
    }
}
