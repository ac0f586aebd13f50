/// Token Issuance and Verification
///
/// Mints paired access/refresh tokens and verifies presented tokens.
/// Both tokens are HS256 JWTs signed with the configured secret; they share
/// one random nonce but carry independent expiries. Issuance is a pure mint:
/// persisting the refresh token into the user's active set is the caller's
/// job.
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ConfigError};

const NONCE_LENGTH: usize = 16;

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn generate_nonce() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

/// Mint an access/refresh token pair for a user.
///
/// # Errors
/// Returns a configuration error (HTTP 500) when the signing secret is
/// unconfigured; this is a server fault, not a client one.
pub fn issue_token_pair(user_id: Uuid, config: &JwtSettings) -> Result<TokenPair, AppError> {
    if config.secret.is_empty() {
        return Err(ConfigError::MissingTokenSecret.into());
    }

    let key = EncodingKey::from_secret(config.secret.as_bytes());
    let nonce = generate_nonce();

    let access_claims = Claims::new(user_id, nonce.clone(), config.access_token_expiry);
    let refresh_claims = Claims::new(user_id, nonce, config.refresh_token_expiry);

    let access_token = encode(&Header::default(), &access_claims, &key)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;
    let refresh_token = encode(&Header::default(), &refresh_claims, &key)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Verify a token's signature and expiry and return its claims.
///
/// Expired and malformed tokens fail identically; callers must not leak
/// which one it was. Expiry is checked with zero leeway.
pub fn verify_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    if config.secret.is_empty() {
        return Err(ConfigError::MissingTokenSecret.into());
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Token verification failed: {}", e);
        AuthError::AccessDenied.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604800,
        }
    }

    #[test]
    fn issue_and_verify_pair() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let pair = issue_token_pair(user_id, &config).expect("Failed to issue tokens");
        let access = verify_token(&pair.access_token, &config).expect("Invalid access token");
        let refresh = verify_token(&pair.refresh_token, &config).expect("Invalid refresh token");

        assert_eq!(access.user_id(), Some(user_id));
        assert_eq!(refresh.user_id(), Some(user_id));
    }

    #[test]
    fn pair_shares_nonce_but_differs_in_expiry() {
        let config = test_config();
        let pair = issue_token_pair(Uuid::new_v4(), &config).expect("Failed to issue tokens");

        let access = verify_token(&pair.access_token, &config).unwrap();
        let refresh = verify_token(&pair.refresh_token, &config).unwrap();

        assert_eq!(access.nonce, refresh.nonce);
        assert!(refresh.exp > access.exp);
        assert_ne!(pair.access_token, pair.refresh_token);
    }

    #[test]
    fn consecutive_pairs_are_distinct() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let first = issue_token_pair(user_id, &config).unwrap();
        let second = issue_token_pair(user_id, &config).unwrap();

        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[test]
    fn missing_secret_is_a_server_error() {
        let mut config = test_config();
        config.secret = String::new();

        assert!(issue_token_pair(Uuid::new_v4(), &config).is_err());
        assert!(verify_token("whatever", &config).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let config = test_config();
        let pair = issue_token_pair(Uuid::new_v4(), &config).unwrap();

        let tampered = format!("{}X", pair.access_token);
        assert!(verify_token(&tampered, &config).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let pair = issue_token_pair(Uuid::new_v4(), &config).unwrap();

        let mut other = test_config();
        other.secret = "a-different-secret-key-of-decent-length".to_string();
        assert!(verify_token(&pair.access_token, &other).is_err());
    }

    #[test]
    fn token_expires_after_its_ttl() {
        let mut config = test_config();
        config.access_token_expiry = 1;

        let pair = issue_token_pair(Uuid::new_v4(), &config).unwrap();
        assert!(verify_token(&pair.access_token, &config).is_ok());

        std::thread::sleep(std::time::Duration::from_secs(2));
        assert!(
            verify_token(&pair.access_token, &config).is_err(),
            "access token should be rejected after expiry"
        );
        // The long-lived refresh token from the same pair is still good
        assert!(verify_token(&pair.refresh_token, &config).is_ok());
    }
}
