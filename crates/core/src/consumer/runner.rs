//! Job consumer implementation.
//!
//! Polls the queue and fans deliveries out to a bounded worker pool:
//! - Malformed claim checks, corrupt payloads and deterministic render
//!   failures are dead-lettered immediately; redelivery cannot fix them.
//! - Transient failures abandon the delivery; the queue's delivery-count
//!   policy decides when a message stops coming back.
//! - The artifact upload happens before the ack, so a crash in between
//!   re-renders the job rather than losing it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Semaphore};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ConsumerConfig;
use crate::metrics::{JOBS_PROCESSED, RENDER_DURATION};
use crate::payload;
use crate::queue::{ClaimCheck, Delivery, JobQueue};
use crate::renderer::Renderer;
use crate::store::ObjectStore;

use super::types::ConsumerStatus;

/// Tracks statistics for the worker pool.
#[derive(Default)]
struct PoolStats {
    active: AtomicU64,
    total_processed: AtomicU64,
    total_failed: AtomicU64,
}

/// The claim-check job consumer.
pub struct JobConsumer {
    config: ConsumerConfig,
    queue: Arc<dyn JobQueue>,
    payload_store: Arc<dyn ObjectStore>,
    artifact_store: Arc<dyn ObjectStore>,
    renderer: Arc<dyn Renderer>,

    // Runtime state
    running: Arc<AtomicBool>,
    semaphore: Arc<Semaphore>,
    stats: Arc<PoolStats>,
    shutdown_tx: broadcast::Sender<()>,
}

impl JobConsumer {
    pub fn new(
        config: ConsumerConfig,
        queue: Arc<dyn JobQueue>,
        payload_store: Arc<dyn ObjectStore>,
        artifact_store: Arc<dyn ObjectStore>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let semaphore = Arc::new(Semaphore::new(config.concurrency));

        Self {
            config,
            queue,
            payload_store,
            artifact_store,
            renderer,
            running: Arc::new(AtomicBool::new(false)),
            semaphore,
            stats: Arc::new(PoolStats::default()),
            shutdown_tx,
        }
    }

    /// Start the consumer (spawns the poll loop).
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Consumer already running");
            return;
        }

        info!(concurrency = self.config.concurrency, "Starting job consumer");
        self.spawn_poll_loop();
    }

    /// Stop the consumer gracefully.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Consumer not running");
            return;
        }

        info!("Stopping job consumer");
        let _ = self.shutdown_tx.send(());

        // Give in-flight jobs a moment to finish
        tokio::time::sleep(Duration::from_millis(200)).await;
        info!("Job consumer stopped");
    }

    /// Get current consumer status.
    pub async fn status(&self) -> ConsumerStatus {
        ConsumerStatus {
            running: self.running.load(Ordering::Relaxed),
            active_jobs: self.stats.active.load(Ordering::Relaxed) as usize,
            max_concurrency: self.config.concurrency,
            total_processed: self.stats.total_processed.load(Ordering::Relaxed),
            total_failed: self.stats.total_failed.load(Ordering::Relaxed),
            queue: self.queue.status().await,
        }
    }

    fn spawn_poll_loop(&self) {
        let running = Arc::clone(&self.running);
        let queue = Arc::clone(&self.queue);
        let payload_store = Arc::clone(&self.payload_store);
        let artifact_store = Arc::clone(&self.artifact_store);
        let renderer = Arc::clone(&self.renderer);
        let semaphore = Arc::clone(&self.semaphore);
        let stats = Arc::clone(&self.stats);
        let config = self.config.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Consumer poll loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Consumer poll loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        Self::drain_available(
                            &queue,
                            &payload_store,
                            &artifact_store,
                            &renderer,
                            &semaphore,
                            &stats,
                            &config,
                        ).await;
                    }
                }
            }
            info!("Consumer poll loop stopped");
        });
    }

    /// Pull deliveries while both a pool slot and a message are available.
    async fn drain_available(
        queue: &Arc<dyn JobQueue>,
        payload_store: &Arc<dyn ObjectStore>,
        artifact_store: &Arc<dyn ObjectStore>,
        renderer: &Arc<dyn Renderer>,
        semaphore: &Arc<Semaphore>,
        stats: &Arc<PoolStats>,
        config: &ConsumerConfig,
    ) {
        loop {
            let permit = match Arc::clone(semaphore).try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => break, // pool full
            };

            let delivery = match queue.receive().await {
                Ok(Some(delivery)) => delivery,
                Ok(None) => break,
                Err(e) => {
                    warn!("Queue receive failed: {}", e);
                    break;
                }
            };

            let payload_store = Arc::clone(payload_store);
            let artifact_store = Arc::clone(artifact_store);
            let renderer = Arc::clone(renderer);
            let stats = Arc::clone(stats);
            let render_timeout = Duration::from_secs(config.render_timeout_secs);

            stats.active.fetch_add(1, Ordering::Relaxed);
            tokio::spawn(async move {
                Self::handle_delivery(
                    delivery,
                    &payload_store,
                    &artifact_store,
                    &renderer,
                    render_timeout,
                    &stats,
                )
                .await;
                stats.active.fetch_sub(1, Ordering::Relaxed);
                drop(permit);
            });
        }
    }

    async fn handle_delivery(
        delivery: Box<dyn Delivery>,
        payload_store: &Arc<dyn ObjectStore>,
        artifact_store: &Arc<dyn ObjectStore>,
        renderer: &Arc<dyn Renderer>,
        render_timeout: Duration,
        stats: &Arc<PoolStats>,
    ) {
        let claim_check = match ClaimCheck::parse(delivery.body()) {
            Ok(claim_check) => claim_check,
            Err(e) => {
                Self::dead_letter_now(delivery, stats, &format!("malformed claim check: {}", e))
                    .await;
                return;
            }
        };

        debug!(
            job_id = %claim_check.job_id,
            template = %claim_check.template,
            delivery_count = delivery.delivery_count(),
            "Processing render job"
        );

        let stored = match payload_store.get(&claim_check.payload_location).await {
            Ok(stored) => stored,
            Err(e) => {
                Self::abandon(delivery, stats, &format!("payload fetch failed: {}", e)).await;
                return;
            }
        };

        let html = if claim_check.compressed {
            match payload::decompress(&stored.bytes) {
                Ok(html) => html,
                Err(e) => {
                    // Corrupt payloads stay corrupt; retrying cannot help.
                    Self::dead_letter_now(delivery, stats, &format!("corrupt payload: {}", e))
                        .await;
                    return;
                }
            }
        } else {
            match String::from_utf8(stored.bytes) {
                Ok(html) => html,
                Err(_) => {
                    Self::dead_letter_now(delivery, stats, "payload is not UTF-8").await;
                    return;
                }
            }
        };

        let started = Instant::now();
        let pdf = match tokio::time::timeout(
            render_timeout,
            renderer.generate_pdf(&claim_check.template, &html),
        )
        .await
        {
            Ok(Ok(pdf)) => pdf,
            Ok(Err(e)) => {
                let reason = format!("render failed: {}", e);
                if e.is_retryable() {
                    Self::abandon(delivery, stats, &reason).await;
                } else {
                    // A missing script or a script that rejects this input
                    // fails the same way on every redelivery.
                    Self::dead_letter_now(delivery, stats, &reason).await;
                }
                return;
            }
            Err(_) => {
                Self::abandon(
                    delivery,
                    stats,
                    &format!("render timed out after {:?}", render_timeout),
                )
                .await;
                return;
            }
        };
        RENDER_DURATION
            .with_label_values(&[&claim_check.template])
            .observe(started.elapsed().as_secs_f64());

        let metadata = std::collections::HashMap::from([
            ("owner".to_string(), claim_check.user_id.clone()),
            ("filename".to_string(), claim_check.file_name.clone()),
            ("downloaded".to_string(), "false".to_string()),
        ]);
        let artifact_key = format!("{}.pdf", claim_check.job_id);
        if let Err(e) = artifact_store
            .put(&artifact_key, pdf, "application/pdf", metadata)
            .await
        {
            Self::abandon(delivery, stats, &format!("artifact upload failed: {}", e)).await;
            return;
        }

        stats.total_processed.fetch_add(1, Ordering::Relaxed);
        JOBS_PROCESSED.with_label_values(&["completed"]).inc();
        info!(job_id = %claim_check.job_id, template = %claim_check.template, "Render job completed");

        if let Err(e) = delivery.ack().await {
            warn!(job_id = %claim_check.job_id, "Failed to ack completed job: {}", e);
        }
    }

    async fn dead_letter_now(delivery: Box<dyn Delivery>, stats: &Arc<PoolStats>, reason: &str) {
        warn!(
            delivery_count = delivery.delivery_count(),
            "Dead-lettering delivery: {}", reason
        );
        stats.total_failed.fetch_add(1, Ordering::Relaxed);
        JOBS_PROCESSED.with_label_values(&["dead_lettered"]).inc();
        if let Err(e) = delivery.dead_letter(reason).await {
            warn!("Failed to dead-letter delivery: {}", e);
        }
    }

    async fn abandon(delivery: Box<dyn Delivery>, stats: &Arc<PoolStats>, reason: &str) {
        warn!(
            delivery_count = delivery.delivery_count(),
            "Abandoning delivery: {}", reason
        );
        stats.total_failed.fetch_add(1, Ordering::Relaxed);
        JOBS_PROCESSED.with_label_values(&["abandoned"]).inc();
        if let Err(e) = delivery.abandon(reason).await {
            warn!("Failed to abandon delivery: {}", e);
        }
    }
}
