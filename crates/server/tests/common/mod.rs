//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling comprehensive E2E testing
//! without external infrastructure.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use pressroom_core::config::{
    AuthConfig, AuthMethod, Config, ConsumerConfig, DedupConfig, QueueConfig, RendererConfig,
    ServerConfig, TemplateConfig, TicketConfig,
};
use pressroom_core::kv::MemoryKvStore;
use pressroom_core::queue::{JobQueue, MemoryQueue};
use pressroom_core::renderer::Renderer;
use pressroom_core::store::{MemoryObjectStore, ObjectStore};
use pressroom_core::template::TemplateRegistry;
use pressroom_core::testing::MockRenderer;
use pressroom_core::{
    create_authenticator, ArtifactGate, Authenticator, Deduplicator, JobConsumer, JobSubmitter,
    TicketIssuer, TicketValidator,
};

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable pieces:
/// - Rendering (MockRenderer)
/// - Job queue (MemoryQueue), including dead letter inspection
/// - Payload and artifact stores (MemoryObjectStore)
///
/// The job consumer runs with a fast poll interval so tests can submit
/// a render and observe the artifact moments later.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock renderer - configure HTML/PDF output and failures
    pub renderer: Arc<MockRenderer>,
    /// Job queue - inspect depth and dead letters
    pub queue: Arc<MemoryQueue>,
    /// Where compressed HTML payloads land
    pub payload_store: Arc<MemoryObjectStore>,
    /// Where finished PDFs land
    pub artifact_store: Arc<MemoryObjectStore>,
    /// The consumer, so tests can stop it when needed
    pub consumer: Arc<JobConsumer>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
    pub body: Value,
}

impl TestResponse {
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub auth: AuthConfig,
    pub dedup_window_secs: u64,
    pub max_delivery_count: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig {
                method: AuthMethod::None,
                api_key: None,
            },
            dedup_window_secs: 60,
            max_delivery_count: 3,
        }
    }
}

#[allow(dead_code)]
impl TestConfig {
    pub fn with_api_key(key: &str) -> Self {
        Self {
            auth: AuthConfig {
                method: AuthMethod::ApiKey,
                api_key: Some(key.to_string()),
            },
            ..Default::default()
        }
    }
}

fn test_templates() -> BTreeMap<String, TemplateConfig> {
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

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with default config (auth disabled).
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let config = Config {
            auth: test_config.auth.clone(),
            server: ServerConfig::default(),
            ticket: TicketConfig {
                secret: "e2e-ticket-secret".to_string(),
                ttl_secs: 60,
            },
            dedup: DedupConfig {
                window_secs: test_config.dedup_window_secs,
            },
            queue: QueueConfig {
                max_delivery_count: test_config.max_delivery_count,
            },
            consumer: ConsumerConfig {
                concurrency: 2,
                poll_interval_ms: 10,
                render_timeout_secs: 5,
            },
            renderer: RendererConfig::default(),
            templates: test_templates(),
        };

        let authenticator: Arc<dyn Authenticator> = Arc::from(
            create_authenticator(&config.auth).expect("Failed to create authenticator"),
        );

        let ticket_ttl = Duration::from_secs(config.ticket.ttl_secs);
        let ticket_issuer = TicketIssuer::new(&config.ticket.secret, ticket_ttl);
        let ticket_validator = TicketValidator::new(
            &config.ticket.secret,
            ticket_ttl,
            Arc::new(MemoryKvStore::new()),
        );

        let renderer = Arc::new(MockRenderer::new());
        let queue = Arc::new(MemoryQueue::new(config.queue.max_delivery_count));
        let payload_store = Arc::new(MemoryObjectStore::new());
        let artifact_store = Arc::new(MemoryObjectStore::new());

        let registry = Arc::new(TemplateRegistry::new(config.templates.clone()));
        let dedup = Deduplicator::new(
            Arc::new(MemoryKvStore::new()),
            Duration::from_secs(config.dedup.window_secs),
        );

        let submitter = JobSubmitter::new(
            registry,
            dedup,
            Arc::clone(&renderer) as Arc<dyn Renderer>,
            Arc::clone(&payload_store) as Arc<dyn ObjectStore>,
            Arc::clone(&queue) as Arc<dyn JobQueue>,
        );

        let consumer = Arc::new(JobConsumer::new(
            config.consumer.clone(),
            Arc::clone(&queue) as Arc<dyn JobQueue>,
            Arc::clone(&payload_store) as Arc<dyn ObjectStore>,
            Arc::clone(&artifact_store) as Arc<dyn ObjectStore>,
            Arc::clone(&renderer) as Arc<dyn Renderer>,
        ));
        consumer.start();

        let gate = ArtifactGate::new(Arc::clone(&artifact_store) as Arc<dyn ObjectStore>);

        let state = Arc::new(pressroom_server::state::AppState::new(
            config,
            authenticator,
            ticket_issuer,
            ticket_validator,
            submitter,
            Arc::clone(&consumer),
            gate,
            Arc::clone(&queue) as Arc<dyn JobQueue>,
        ));

        let router = pressroom_server::api::create_router(state);

        Self {
            router,
            renderer,
            queue,
            payload_store,
            artifact_store,
            consumer,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, &[]).await
    }

    /// Send a GET request with extra headers.
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.request("GET", path, None, headers).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), &[]).await
    }

    /// Send a POST request with JSON body and extra headers.
    pub async fn post_with_headers(
        &self,
        path: &str,
        body: Value,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        self.request("POST", path, Some(body), headers).await
    }

    /// Obtain a one-time render ticket through the HTTP surface.
    pub async fn issue_ticket(&self) -> String {
        let response = self.post("/api/v1/tickets", Value::Null).await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Ticket issuance failed: {}",
            response.body
        );
        response.body["ticket"]
            .as_str()
            .expect("Ticket response missing 'ticket' field")
            .to_string()
    }

    /// Wait until the consumer has written the artifact for a job, or panic.
    pub async fn wait_for_artifact(&self, job_id: &str) {
        let key = format!("{job_id}.pdf");
        for _ in 0..200 {
            if self.artifact_store.exists(&key).await.unwrap_or(false) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Artifact {key} never appeared");
    }

    /// Wait until at least `count` dead letters have accumulated.
    pub async fn wait_for_dead_letters(&self, count: usize) {
        for _ in 0..200 {
            if self.queue.dead_letters().await.len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Expected {count} dead letters, got {}", self.queue.dead_letters().await.len());
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        for (name, value) in headers {
            request_builder = request_builder.header(*name, *value);
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            if json_body.is_null() {
                Body::empty()
            } else {
                Body::from(serde_json::to_vec(&json_body).unwrap())
            }
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
