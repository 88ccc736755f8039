//! Shared state builder for unit tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use pressroom_core::config::{
    AuthConfig, Config, ConsumerConfig, DedupConfig, QueueConfig, RendererConfig, ServerConfig,
    TemplateConfig, TicketConfig,
};
use pressroom_core::kv::MemoryKvStore;
use pressroom_core::queue::MemoryQueue;
use pressroom_core::store::MemoryObjectStore;
use pressroom_core::template::TemplateRegistry;
use pressroom_core::testing::MockRenderer;
use pressroom_core::{
    create_authenticator, ArtifactGate, Authenticator, Deduplicator, JobConsumer, JobSubmitter,
    TicketIssuer, TicketValidator,
};

use crate::state::AppState;

pub fn test_templates() -> BTreeMap<String, TemplateConfig> {
    let mut templates = BTreeMap::new();
    templates.insert(
        "crm-trade-invoice".to_string(),
        TemplateConfig {
            script: "crm-trade-invoice.py".to_string(),
            params: vec!["tradeid".to_string()],
        },
    );
    templates.insert(
        "product-de".to_string(),
        TemplateConfig {
            script: "product-de.py".to_string(),
            params: vec!["isin".to_string(), "date".to_string()],
        },
    );
    templates
}

pub fn test_config(auth: AuthConfig) -> Config {
    Config {
        auth,
        server: ServerConfig::default(),
        ticket: TicketConfig {
            secret: "test-ticket-secret".to_string(),
            ttl_secs: 60,
        },
        dedup: DedupConfig::default(),
        queue: QueueConfig::default(),
        consumer: ConsumerConfig {
            concurrency: 2,
            poll_interval_ms: 10,
            render_timeout_secs: 5,
        },
        renderer: RendererConfig::default(),
        templates: test_templates(),
    }
}

/// Build an AppState over in-memory backends and a mock renderer.
pub fn test_state_with_auth(auth: AuthConfig) -> Arc<AppState> {
    let config = test_config(auth);

    let authenticator: Arc<dyn Authenticator> =
        Arc::from(create_authenticator(&config.auth).unwrap());

    let ticket_ttl = Duration::from_secs(config.ticket.ttl_secs);
    let ticket_issuer = TicketIssuer::new(&config.ticket.secret, ticket_ttl);
    let ticket_validator = TicketValidator::new(
        &config.ticket.secret,
        ticket_ttl,
        Arc::new(MemoryKvStore::new()),
    );

    let registry = Arc::new(TemplateRegistry::new(config.templates.clone()));
    let renderer = Arc::new(MockRenderer::new());
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
        renderer.clone(),
        payload_store.clone(),
        queue.clone(),
    );
    let consumer = Arc::new(JobConsumer::new(
        config.consumer.clone(),
        queue.clone(),
        payload_store,
        artifact_store.clone(),
        renderer,
    ));
    let gate = ArtifactGate::new(artifact_store);

    Arc::new(AppState::new(
        config,
        authenticator,
        ticket_issuer,
        ticket_validator,
        submitter,
        consumer,
        gate,
        queue,
    ))
}
