//! One-time submission tickets.
//!
//! A ticket authorizes exactly one render submission. It is a short-lived
//! HS256 token bound to the caller's identity; the validator burns the
//! token id in a replay cache so a second presentation is rejected even
//! inside the validity window.

mod issuer;
mod types;
mod validator;

pub use issuer::TicketIssuer;
pub use types::{IssuedTicket, TicketClaims, TicketError};
pub use validator::TicketValidator;
