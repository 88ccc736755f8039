use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub ticket: TicketConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub consumer: ConsumerConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    /// Template registry: declared, ordered required parameters per template.
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// API key (required when method = "api_key")
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
    // Future: Oidc
}

/// One-time generation ticket configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicketConfig {
    /// HMAC secret used to sign tickets. Required; startup fails without it.
    pub secret: String,
    /// Ticket lifetime in seconds (default: 60)
    #[serde(default = "default_ticket_ttl")]
    pub ttl_secs: u64,
}

fn default_ticket_ttl() -> u64 {
    60
}

/// Request deduplication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DedupConfig {
    /// Dedup window in seconds (default: 60)
    #[serde(default = "default_dedup_window")]
    pub window_secs: u64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            window_secs: default_dedup_window(),
        }
    }
}

fn default_dedup_window() -> u64 {
    60
}

/// Claim-check queue configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    /// Deliveries after which an abandoned message is dead-lettered (default: 5)
    #[serde(default = "default_max_delivery_count")]
    pub max_delivery_count: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_delivery_count: default_max_delivery_count(),
        }
    }
}

fn default_max_delivery_count() -> u32 {
    5
}

/// Job consumer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsumerConfig {
    /// Maximum number of renders in flight (default: 3)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Queue poll interval when idle, in milliseconds (default: 250)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Deadline for a single PDF render, in seconds (default: 120)
    #[serde(default = "default_render_timeout")]
    pub render_timeout_secs: u64,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            poll_interval_ms: default_poll_interval(),
            render_timeout_secs: default_render_timeout(),
        }
    }
}

fn default_concurrency() -> usize {
    3
}

fn default_poll_interval() -> u64 {
    250
}

fn default_render_timeout() -> u64 {
    120
}

/// Renderer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RendererConfig {
    /// Directory holding the per-template render scripts
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: PathBuf,
    /// Command that turns HTML on stdin into a PDF on stdout
    #[serde(default = "default_pdf_command")]
    pub pdf_command: PathBuf,
    /// Extra arguments passed to the PDF command
    #[serde(default = "default_pdf_args")]
    pub pdf_args: Vec<String>,
    /// Timeout for a single render script invocation
    #[serde(default = "default_script_timeout_secs")]
    pub script_timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            scripts_dir: default_scripts_dir(),
            pdf_command: default_pdf_command(),
            pdf_args: default_pdf_args(),
            script_timeout_secs: default_script_timeout_secs(),
        }
    }
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from("scripts")
}

fn default_pdf_command() -> PathBuf {
    PathBuf::from("wkhtmltopdf")
}

fn default_pdf_args() -> Vec<String> {
    vec!["--quiet".to_string(), "-".to_string(), "-".to_string()]
}

fn default_script_timeout_secs() -> u64 {
    30
}

/// A registered template and its declared required parameters.
///
/// Parameter order is load-bearing: the dedup key is built in this order
/// regardless of how the caller supplied the values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplateConfig {
    /// Render script file name under `renderer.scripts_dir`
    pub script: String,
    /// Required parameter names, in declared order
    pub params: Vec<String>,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub ticket: SanitizedTicketConfig,
    pub dedup: DedupConfig,
    pub queue: QueueConfig,
    pub consumer: ConsumerConfig,
    pub templates: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub api_key_configured: bool,
}

/// Sanitized ticket config (signing secret hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTicketConfig {
    pub secret_configured: bool,
    pub ttl_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
                api_key_configured: config
                    .auth
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
            },
            server: config.server.clone(),
            ticket: SanitizedTicketConfig {
                secret_configured: !config.ticket.secret.is_empty(),
                ttl_secs: config.ticket.ttl_secs,
            },
            dedup: config.dedup.clone(),
            queue: config.queue.clone(),
            consumer: config.consumer.clone(),
            templates: config.templates.keys().cloned().collect(),
        }
    }
}
