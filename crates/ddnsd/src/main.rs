// # ddnsd - DDNS Update Gateway Daemon
//
// This daemon is a THIN integration layer over ddns-core. It is responsible
// for:
// 1. Reading configuration from environment variables (see `config.rs`)
// 2. Resolving the reference secret (environment or SSM parameter)
// 3. Building the zone client through the backend registry
// 4. Serving the update and authorizer routes until SIGTERM/SIGINT
//
// Credential checks, validation, zone resolution and the upsert itself all
// live in ddns-core.
//
// ## Example
//
// ```bash
// export DDNS_AUTH_IDENTITY=router
// export DDNS_AUTH_SECRET_PARAMETER=/ddns/router-secret
// export DDNS_AWS_REGION=eu-west-1
//
// ddnsd
//
// curl -u router:secret -X PUT \
//   'http://localhost:8080/example.com/home?type=A&value=203.0.113.5'
// ```

mod config;
mod server;

use anyhow::{Context, Result};
use config::Config;
use ddns_core::{UpdatePipeline, ZoneClientRegistry};
use secrecy::SecretString;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd");
    info!(
        "Zone backend: {}, listening on {}",
        config.zone_backend, config.listen_addr
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        let pipeline = match build_pipeline(&config).await {
            Ok(pipeline) => pipeline,
            Err(e) => {
                error!("Startup failed: {:#}", e);
                return DdnsExitCode::ConfigError;
            }
        };

        match serve(&config, pipeline).await {
            Ok(()) => DdnsExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                DdnsExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Resolve the secret and build the pipeline over the configured backend
async fn build_pipeline(config: &Config) -> Result<Arc<UpdatePipeline>> {
    let secret = resolve_secret(config).await?;
    let gateway = config.gateway(secret);

    let registry = ZoneClientRegistry::with_builtin();

    #[cfg(feature = "route53")]
    {
        info!("Registering Route 53 backend");
        ddns_provider_route53::register(&registry);
    }

    let client = registry
        .create_client(&gateway.backend)
        .await
        .context("cannot create zone client")?;

    let pipeline =
        UpdatePipeline::new(&gateway, client).context("invalid gateway configuration")?;
    Ok(Arc::new(pipeline))
}

async fn resolve_secret(config: &Config) -> Result<SecretString> {
    if let Some(secret) = &config.auth_secret {
        return Ok(secret.clone());
    }

    match &config.auth_secret_parameter {
        #[cfg(feature = "route53")]
        Some(name) => {
            info!("Loading reference secret from parameter {}", name);
            let secret =
                ddns_provider_route53::fetch_secret_parameter(name, config.aws_region.as_deref())
                    .await?;
            Ok(secret)
        }
        #[cfg(not(feature = "route53"))]
        Some(_) => anyhow::bail!("DDNS_AUTH_SECRET_PARAMETER requires the route53 feature"),
        None => anyhow::bail!("no reference secret configured"),
    }
}

/// Serve until a shutdown signal arrives
async fn serve(config: &Config, pipeline: Arc<UpdatePipeline>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.listen_addr))?;

    info!("Gateway ready on {}", config.listen_addr);

    axum::serve(listener, server::router(pipeline))
        .with_graceful_shutdown(async {
            match wait_for_shutdown().await {
                Ok(signal) => info!("Received shutdown signal: {}", signal),
                Err(e) => error!("Shutdown signal error: {}", e),
            }
        })
        .await
        .context("server error")?;

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
