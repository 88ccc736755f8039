use std::sync::Arc;
use pressroom_core::queue::JobQueue;
use pressroom_core::{
    ArtifactGate, Authenticator, Config, JobConsumer, JobSubmitter, SanitizedConfig, TicketIssuer,
    TicketValidator,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    ticket_issuer: TicketIssuer,
    ticket_validator: TicketValidator,
    submitter: JobSubmitter,
    consumer: Arc<JobConsumer>,
    gate: ArtifactGate,
    queue: Arc<dyn JobQueue>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        ticket_issuer: TicketIssuer,
        ticket_validator: TicketValidator,
        submitter: JobSubmitter,
        consumer: Arc<JobConsumer>,
        gate: ArtifactGate,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            config,
            authenticator,
            ticket_issuer,
            ticket_validator,
            submitter,
            consumer,
            gate,
            queue,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn ticket_issuer(&self) -> &TicketIssuer {
        &self.ticket_issuer
    }

    pub fn ticket_validator(&self) -> &TicketValidator {
        &self.ticket_validator
    }

    pub fn submitter(&self) -> &JobSubmitter {
        &self.submitter
    }

    pub fn consumer(&self) -> &JobConsumer {
        &self.consumer
    }

    pub fn gate(&self) -> &ArtifactGate {
        &self.gate
    }

    pub fn queue(&self) -> &dyn JobQueue {
        self.queue.as_ref()
    }
}
