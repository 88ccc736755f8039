//! Ticket issuance.

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::time::Duration;
use uuid::Uuid;

use crate::metrics::TICKETS_ISSUED;

use super::types::{IssuedTicket, TicketClaims, TicketError};

/// Issues HS256 submission tickets bound to a user id.
pub struct TicketIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl TicketIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issues a fresh single-use ticket for the given user.
    pub fn issue(&self, user_id: &str) -> Result<IssuedTicket, TicketError> {
        let claims = TicketClaims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: Utc::now().timestamp() + self.ttl.as_secs() as i64,
        };

        let ticket = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TicketError::Signing(e.to_string()))?;

        TICKETS_ISSUED.inc();
        tracing::debug!(user_id = %user_id, jti = %claims.jti, "Issued submission ticket");

        Ok(IssuedTicket {
            ticket,
            ttl: self.ttl.as_secs(),
        })
    }
}
