use std::sync::Arc;

use anyhow::Context;
use auth::parse_algorithm;
use auth::parse_lifetime;
use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenSigner;
use credential_service::config::Config;
use credential_service::config::StoreBackend;
use credential_service::domain::principal::ports::PrincipalServicePort;
use credential_service::domain::principal::service::PrincipalService;
use credential_service::inbound::http::pipeline::ErrorPipeline;
use credential_service::inbound::http::router::create_router;
use credential_service::outbound::monitoring::TracingMonitor;
use credential_service::outbound::repositories::CassandraPrincipalRepository;
use credential_service::outbound::repositories::InMemoryPrincipalRepository;
use credential_service::outbound::repositories::ResilientRepository;
use credential_service::outbound::repositories::StorePolicy;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::load()?;

    init_tracing(config.logging.json);

    tracing::info!(
        service = "credential-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    tracing::info!(
        http_port = config.server.http_port,
        store_backend = ?config.store.backend,
        keyspace = %config.store.keyspace,
        jwt_algorithm = %config.jwt.algorithm,
        jwt_expiration = %config.jwt.expiration,
        "Configuration loaded"
    );

    let authenticator = Arc::new(build_authenticator(&config)?);
    tracing::info!(algorithm = %config.jwt.algorithm, "Signing keys loaded");

    let policy = StorePolicy::from_config(&config.store);
    let principal_service: Arc<dyn PrincipalServicePort> = match config.store.backend {
        StoreBackend::Cassandra => {
            let repository = CassandraPrincipalRepository::new(&config.store).await?;
            tracing::info!(
                nodes = ?config.store.nodes,
                database = "cassandra",
                "Credential store connected"
            );
            Arc::new(PrincipalService::new(
                Arc::new(ResilientRepository::new(repository, policy)),
                Arc::clone(&authenticator),
            ))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory credential store; records are lost on exit");
            Arc::new(PrincipalService::new(
                Arc::new(ResilientRepository::new(
                    InMemoryPrincipalRepository::new(),
                    policy,
                )),
                Arc::clone(&authenticator),
            ))
        }
    };

    let pipeline = ErrorPipeline::new(Arc::new(TracingMonitor::new(&config.monitoring)));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(principal_service, authenticator, pipeline);

    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "credential_service=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_authenticator(config: &Config) -> Result<Authenticator, anyhow::Error> {
    let private_pem = std::fs::read(&config.jwt.private_key_path).with_context(|| {
        format!(
            "Failed to read private key {}",
            config.jwt.private_key_path
        )
    })?;
    let public_pem = std::fs::read(&config.jwt.public_key_path)
        .with_context(|| format!("Failed to read public key {}", config.jwt.public_key_path))?;

    let signer = TokenSigner::from_pem(
        parse_algorithm(&config.jwt.algorithm)?,
        &private_pem,
        &public_pem,
        parse_lifetime(&config.jwt.expiration)?,
    )?;

    let hasher = PasswordHasher::with_params(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;

    Ok(Authenticator::new(hasher, signer))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
