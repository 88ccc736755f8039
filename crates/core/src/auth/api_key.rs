//! API Key authentication.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Authenticator that validates requests against a configured API key.
///
/// Accepts the key in either:
/// - `Authorization: Bearer <key>` header
/// - `X-API-Key: <key>` header
///
/// The resulting identity derives its `user_id` from a hash of the key, so
/// the same key always maps to the same ticket subject and artifact owner.
pub struct ApiKeyAuthenticator {
    expected_key: String,
    user_id: String,
}

impl ApiKeyAuthenticator {
    pub fn new(api_key: String) -> Self {
        let digest = Sha256::digest(api_key.as_bytes());
        let user_id = format!("key-{:x}", digest)[..20].to_string();
        Self {
            expected_key: api_key,
            user_id,
        }
    }

    /// Extract API key from request headers.
    /// Checks Authorization: Bearer and X-API-Key headers.
    fn extract_key(&self, request: &AuthRequest) -> Option<String> {
        if let Some(auth_header) = request.headers.get("authorization") {
            if let Some(key) = auth_header.strip_prefix("Bearer ") {
                return Some(key.to_string());
            }
            if let Some(key) = auth_header.strip_prefix("bearer ") {
                return Some(key.to_string());
            }
        }

        if let Some(key) = request.headers.get("x-api-key") {
            return Some(key.clone());
        }

        None
    }
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let provided_key = self
            .extract_key(request)
            .ok_or(AuthError::NotAuthenticated)?;

        // Constant-time comparison to prevent timing attacks
        if constant_time_eq(provided_key.as_bytes(), self.expected_key.as_bytes()) {
            Ok(Identity {
                user_id: self.user_id.clone(),
                method: "api_key".to_string(),
                claims: std::collections::HashMap::new(),
            })
        } else {
            Err(AuthError::InvalidCredentials("Invalid API key".to_string()))
        }
    }

    fn method_name(&self) -> &'static str {
        "api_key"
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
