//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Tickets (issued, rejected by reason)
//! - Deduplication (hits, misses)
//! - Jobs (queued, processed by result, render duration)
//! - Artifacts (downloads by result)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Tickets
// =============================================================================

/// Render tickets issued.
pub static TICKETS_ISSUED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("pressroom_tickets_issued_total", "Total tickets issued").unwrap()
});

/// Ticket validations rejected, by reason.
pub static TICKET_REJECTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "pressroom_ticket_rejections_total",
            "Total ticket validations rejected",
        ),
        &["reason"], // "invalid", "wrong_user", "replayed"
    )
    .unwrap()
});

// =============================================================================
// Deduplication
// =============================================================================

/// Submissions answered from the dedup window.
pub static DEDUP_HITS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "pressroom_dedup_hits_total",
        "Submissions answered with an in-window job id",
    )
    .unwrap()
});

/// Submissions that missed the dedup window.
pub static DEDUP_MISSES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "pressroom_dedup_misses_total",
        "Submissions that produced a new job",
    )
    .unwrap()
});

// =============================================================================
// Jobs
// =============================================================================

/// Jobs accepted onto the queue.
pub static JOBS_QUEUED: Lazy<IntCounter> =
    Lazy::new(|| IntCounter::new("pressroom_jobs_queued_total", "Total jobs enqueued").unwrap());

/// Jobs processed by the consumer, by result.
pub static JOBS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pressroom_jobs_processed_total", "Total jobs processed"),
        &["result"], // "completed", "abandoned", "dead_lettered"
    )
    .unwrap()
});

/// PDF generation duration in seconds, by template.
pub static RENDER_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "pressroom_render_duration_seconds",
            "Duration of PDF generation",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["template"],
    )
    .unwrap()
});

// =============================================================================
// Artifacts
// =============================================================================

/// Artifact download attempts, by result.
pub static ARTIFACT_DOWNLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "pressroom_artifact_downloads_total",
            "Total artifact download attempts",
        ),
        &["result"], // "delivered", "not_found", "forbidden", "gone"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TICKETS_ISSUED.clone()),
        Box::new(TICKET_REJECTIONS.clone()),
        Box::new(DEDUP_HITS.clone()),
        Box::new(DEDUP_MISSES.clone()),
        Box::new(JOBS_QUEUED.clone()),
        Box::new(JOBS_PROCESSED.clone()),
        Box::new(RENDER_DURATION.clone()),
        Box::new(ARTIFACT_DOWNLOADS.clone()),
    ]
}
