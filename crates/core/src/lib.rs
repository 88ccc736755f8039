pub mod auth;
pub mod config;
pub mod consumer;
pub mod dedup;
pub mod gate;
pub mod kv;
pub mod metrics;
pub mod payload;
pub mod queue;
pub mod renderer;
pub mod store;
pub mod submitter;
pub mod template;
pub mod testing;
pub mod ticket;

pub use auth::{
    create_authenticator, AuthError, AuthRequest, Authenticator, Identity, NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    SanitizedConfig,
};
pub use consumer::{ConsumerStatus, JobConsumer};
pub use dedup::Deduplicator;
pub use gate::{ArtifactGate, GateError, ReleasedArtifact};
pub use submitter::{JobSubmitter, SubmitError, SubmitOutcome};
pub use ticket::{IssuedTicket, TicketError, TicketIssuer, TicketValidator};
