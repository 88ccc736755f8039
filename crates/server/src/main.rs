use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pressroom_core::kv::MemoryKvStore;
use pressroom_core::queue::MemoryQueue;
use pressroom_core::renderer::{CommandRenderer, Renderer};
use pressroom_core::store::MemoryObjectStore;
use pressroom_core::template::TemplateRegistry;
use pressroom_core::{
    create_authenticator, load_config, validate_config, ArtifactGate, Authenticator, Deduplicator,
    JobConsumer, JobSubmitter, TicketIssuer, TicketValidator,
};

use pressroom_server::api::create_router;
use pressroom_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("PRESSROOM_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);
    info!("Registered templates: {:?}", config.templates.keys().collect::<Vec<_>>());

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Ticket issuance and validation share the secret; the replay cache
    // lives in its own KV namespace.
    let ticket_ttl = Duration::from_secs(config.ticket.ttl_secs);
    let ticket_issuer = TicketIssuer::new(&config.ticket.secret, ticket_ttl);
    let ticket_validator = TicketValidator::new(
        &config.ticket.secret,
        ticket_ttl,
        Arc::new(MemoryKvStore::new()),
    );

    // Template registry from config
    let registry = Arc::new(TemplateRegistry::new(config.templates.clone()));

    // Renderer
    let renderer: Arc<dyn Renderer> = Arc::new(CommandRenderer::new(config.renderer.clone()));
    if let Err(e) = renderer.validate().await {
        error!("Renderer validation failed: {}", e);
    }

    // In-memory backends for the queue, payload and artifact stores
    let queue = Arc::new(MemoryQueue::new(config.queue.max_delivery_count));
    let payload_store = Arc::new(MemoryObjectStore::new());
    let artifact_store = Arc::new(MemoryObjectStore::new());

    let dedup = Deduplicator::new(
        Arc::new(MemoryKvStore::new()),
        Duration::from_secs(config.dedup.window_secs),
    );

    let submitter = JobSubmitter::new(
        registry,
        dedup,
        Arc::clone(&renderer),
        payload_store.clone(),
        queue.clone(),
    );

    // Create and start the job consumer
    let consumer = Arc::new(JobConsumer::new(
        config.consumer.clone(),
        queue.clone(),
        payload_store,
        artifact_store.clone(),
        renderer,
    ));
    consumer.start();
    info!("Job consumer started");

    let gate = ArtifactGate::new(artifact_store);

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        ticket_issuer,
        ticket_validator,
        submitter,
        Arc::clone(&consumer),
        gate,
        queue,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop the consumer so in-flight renders finish before exit
    info!("Server shutting down...");
    consumer.stop().await;
    info!("Job consumer stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
