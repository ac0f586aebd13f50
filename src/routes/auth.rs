/// Authentication routes
///
/// Registration, login, refresh-token rotation, and logout.
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::auth::{consume_refresh_token, issue_token_pair, verify_password};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::store::collections::USERS;
use crate::store::resource;
use crate::store::users::{find_user_by_identity, save_refresh_tokens};

/// Login accepts a username or an email (or both; username wins on lookup
/// only in the sense that either match is accepted).
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "_id")]
    pub user_id: String,
}

/// POST /auth/register
///
/// Creates a user through the users collection: the prepare hook hashes the
/// password before it is persisted, and hidden fields (hash, token set) are
/// stripped from the 201 response.
pub async fn register(
    pool: web::Data<PgPool>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let document = resource::create(pool.get_ref(), &USERS, body.into_inner()).await?;

    tracing::info!(user_id = %document.id, "User registered");

    Ok(HttpResponse::Created().json(document.to_response(&USERS)))
}

/// POST /auth/login
///
/// Identity miss and password mismatch produce byte-identical responses so
/// callers cannot enumerate accounts.
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let username = form.username.as_deref().unwrap_or("");
    let email = form.email.as_deref().unwrap_or("");

    let mut user = find_user_by_identity(pool.get_ref(), username, email)
        .await?
        .ok_or(AuthError::WrongCredentials)?;

    let password = form.password.as_deref().unwrap_or("");
    let password_valid = verify_password(password, &user.password_hash).unwrap_or(false);
    if !password_valid {
        return Err(AuthError::WrongCredentials.into());
    }

    let pair = issue_token_pair(user.id, jwt_config.get_ref())?;
    user.refresh_tokens.push(pair.refresh_token.clone());
    save_refresh_tokens(pool.get_ref(), user.id, &user.refresh_tokens).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user_id: user.id.to_string(),
    }))
}

/// POST /auth/refresh
///
/// Single-use rotation: the presented token is consumed, a fresh pair is
/// minted, and the new refresh token replaces the old one in the user's
/// active set. Any token problem, including an unconfigured signing secret,
/// is a uniform 400 `fail`.
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let mut user = consume_refresh_token(
        pool.get_ref(),
        form.refresh_token.as_deref(),
        jwt_config.get_ref(),
    )
    .await?;

    let pair = issue_token_pair(user.id, jwt_config.get_ref())?;
    user.refresh_tokens.push(pair.refresh_token.clone());
    save_refresh_tokens(pool.get_ref(), user.id, &user.refresh_tokens)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "Failed to persist rotated token set");
            AppError::from(AuthError::RefreshFailed)
        })?;

    tracing::info!(user_id = %user.id, "Refresh token rotated");

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user_id: user.id.to_string(),
    }))
}

/// POST /auth/logout
///
/// Same consume step as refresh, but no new pair is minted: persisting the
/// pruned set revokes the session.
pub async fn logout(
    form: web::Json<RefreshRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let user = consume_refresh_token(
        pool.get_ref(),
        form.refresh_token.as_deref(),
        jwt_config.get_ref(),
    )
    .await?;

    save_refresh_tokens(pool.get_ref(), user.id, &user.refresh_tokens)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "Failed to persist session removal");
            AppError::from(AuthError::RefreshFailed)
        })?;

    tracing::info!(user_id = %user.id, "Session revoked");

    Ok(HttpResponse::Ok().body("success"))
}
