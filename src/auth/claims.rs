use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signed payload carried by both access and refresh tokens.
///
/// `nonce` is a random value shared by the two tokens of one pair, so tokens
/// minted for the same user at the same instant are still distinguishable.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: user id as a UUID string
    pub sub: String,
    /// Random per-issuance value
    pub nonce: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, nonce: String, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            nonce,
            iat: now,
            exp: now + expiry_seconds,
        }
    }

    /// Subject user id, if the token carries a well-formed one.
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}
