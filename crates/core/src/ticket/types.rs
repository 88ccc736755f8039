//! Ticket claims and errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by a submission ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketClaims {
    /// The authenticated user the ticket was issued to.
    pub sub: String,
    /// Unique token id, burned on first use.
    pub jti: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// A freshly issued ticket and its validity window.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedTicket {
    pub ticket: String,
    /// Validity in seconds.
    pub ttl: u64,
}

/// Errors from issuing or validating tickets.
///
/// Bad signatures, garbage tokens and expired tokens all collapse into
/// `Invalid` so responses leak nothing about which check failed.
#[derive(Debug, Error)]
pub enum TicketError {
    #[error("Ticket is invalid or expired")]
    Invalid,

    #[error("Ticket was issued to a different user")]
    WrongUser,

    #[error("Ticket has already been used")]
    Replayed,

    #[error("Failed to sign ticket: {0}")]
    Signing(String),
}
