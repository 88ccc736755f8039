//! Ticket validation and replay protection.

use jsonwebtoken::{decode, DecodingKey, Validation};
use std::sync::Arc;
use std::time::Duration;

use crate::kv::KvStore;
use crate::metrics::TICKET_REJECTIONS;

use super::types::{TicketClaims, TicketError};

/// Validates submission tickets and burns them on first use.
pub struct TicketValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    replay_cache: Arc<dyn KvStore>,
    ttl: Duration,
}

impl TicketValidator {
    pub fn new(secret: &str, ttl: Duration, replay_cache: Arc<dyn KvStore>) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            replay_cache,
            ttl,
        }
    }

    /// Checks signature, expiry, subject and replay in that order, and
    /// burns the token id so a second call with the same ticket fails.
    pub fn validate(&self, ticket: &str, user_id: &str) -> Result<(), TicketError> {
        let data = decode::<TicketClaims>(ticket, &self.decoding_key, &self.validation)
            .map_err(|_| {
                TICKET_REJECTIONS.with_label_values(&["invalid"]).inc();
                TicketError::Invalid
            })?;

        if data.claims.sub != user_id {
            TICKET_REJECTIONS.with_label_values(&["wrong_user"]).inc();
            return Err(TicketError::WrongUser);
        }

        // Outlives the ticket itself so an expired-but-cached token can
        // never slip through a clock edge.
        let burn_ttl = self.ttl + Duration::from_secs(5);
        let key = format!("ticket:{}", data.claims.jti);
        if !self.replay_cache.set_if_absent(&key, "1", burn_ttl) {
            TICKET_REJECTIONS.with_label_values(&["replayed"]).inc();
            tracing::warn!(user_id = %user_id, jti = %data.claims.jti, "Replayed ticket rejected");
            return Err(TicketError::Replayed);
        }

        Ok(())
    }
}
