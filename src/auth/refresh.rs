/// Refresh Token Lifecycle
///
/// A refresh token is valid only while it sits in its user's stored
/// `refreshTokens` set. Consuming one (for rotation or logout) removes it
/// from the set, so a token can be presented successfully at most once.
///
/// Presenting a signed, unexpired token that is NOT in the set is treated
/// as theft evidence: the token was already rotated away, so whoever holds
/// it now got it some other way. In that case every session of the user is
/// revoked (the whole set is cleared) and the call fails. Fail-closed on
/// purpose.
use sqlx::PgPool;

use crate::auth::token::verify_token;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::store::users::{self, UserRecord};

pub(crate) enum PruneOutcome {
    /// Token was in the active set; remaining tokens after removal
    Rotated(Vec<String>),
    /// Token was not in the active set: reuse/theft evidence
    ReuseDetected,
}

pub(crate) fn prune_presented_token(stored: &[String], presented: &str) -> PruneOutcome {
    if !stored.iter().any(|t| t == presented) {
        return PruneOutcome::ReuseDetected;
    }
    PruneOutcome::Rotated(
        stored
            .iter()
            .filter(|t| t.as_str() != presented)
            .cloned()
            .collect(),
    )
}

/// Validate a presented refresh token and remove it from its user's active
/// set (in memory). On success the returned user carries the pruned set;
/// the caller decides what to append before persisting.
///
/// Every failure collapses to the uniform `fail` response: absent token,
/// unconfigured secret, bad signature, expiry, unknown user, or reuse.
pub async fn consume_refresh_token(
    pool: &PgPool,
    raw_token: Option<&str>,
    config: &JwtSettings,
) -> Result<UserRecord, AppError> {
    let raw_token = match raw_token {
        Some(t) if !t.is_empty() => t,
        _ => return Err(AuthError::RefreshFailed.into()),
    };

    let claims =
        verify_token(raw_token, config).map_err(|_| AppError::from(AuthError::RefreshFailed))?;
    let user_id = claims.user_id().ok_or(AuthError::RefreshFailed)?;

    let mut user = users::find_user_by_id(pool, user_id)
        .await
        .map_err(|_| AppError::from(AuthError::RefreshFailed))?
        .ok_or(AuthError::RefreshFailed)?;

    match prune_presented_token(&user.refresh_tokens, raw_token) {
        PruneOutcome::ReuseDetected => {
            tracing::warn!(
                user_id = %user.id,
                "Refresh token reuse detected, revoking all sessions"
            );
            if let Err(e) = users::save_refresh_tokens(pool, user.id, &[]).await {
                tracing::error!(user_id = %user.id, error = %e, "Failed to persist session revocation");
            }
            Err(AuthError::RefreshFailed.into())
        }
        PruneOutcome::Rotated(remaining) => {
            user.refresh_tokens = remaining;
            Ok(user)
        }
    }
}
