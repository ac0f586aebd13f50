/// Typed access to the users collection
///
/// The auth subsystem needs more than opaque documents: credential lookup
/// by username or email, and single-statement persistence of the active
/// refresh-token set.
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Active (not yet consumed) refresh tokens, newest last
    pub refresh_tokens: Vec<String>,
}

#[derive(Deserialize)]
struct UserDoc {
    username: String,
    email: String,
    password: String,
    #[serde(default, rename = "refreshTokens")]
    refresh_tokens: Vec<String>,
}

impl UserRecord {
    fn from_row(id: Uuid, doc: Value) -> Result<Self, AppError> {
        let doc: UserDoc = serde_json::from_value(doc)
            .map_err(|e| AppError::Internal(format!("Malformed user document: {}", e)))?;
        Ok(Self {
            id,
            username: doc.username,
            email: doc.email,
            password_hash: doc.password,
            refresh_tokens: doc.refresh_tokens,
        })
    }
}

pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>, AppError> {
    let row = sqlx::query_as::<_, (Uuid, Value)>("SELECT id, doc FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(|(id, doc)| UserRecord::from_row(id, doc)).transpose()
}

/// Look a user up by username OR email in a single query (first match).
pub async fn find_user_by_identity(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<Option<UserRecord>, AppError> {
    let row = sqlx::query_as::<_, (Uuid, Value)>(
        "SELECT id, doc FROM users WHERE doc->>'username' = $1 OR doc->>'email' = $2 LIMIT 1",
    )
    .bind(username)
    .bind(email)
    .fetch_optional(pool)
    .await?;
    row.map(|(id, doc)| UserRecord::from_row(id, doc)).transpose()
}

/// Overwrite the user's active refresh-token set in one statement.
pub async fn save_refresh_tokens(
    pool: &PgPool,
    user_id: Uuid,
    tokens: &[String],
) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET doc = jsonb_set(doc, '{refreshTokens}', $1) WHERE id = $2")
        .bind(serde_json::json!(tokens))
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
