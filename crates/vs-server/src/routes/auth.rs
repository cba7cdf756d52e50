//! Account route handlers: register, login, logout.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use vs_core::config::AuthConfig;
use vs_core::Error;

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::auth::BearerToken;
use crate::middleware::request_id::RequestId;
use crate::routes::users::UserResponse;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
    /// RFC 3339 expiry of `token`.
    pub expires_at: String,
    pub user: UserResponse,
}

/// Body extraction failures are client errors, not 422s.
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> vs_core::Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| Error::Validation(rejection.body_text()))
}

/// Expiry of a token issued at `now`. Lifetimes chrono cannot represent are
/// a configuration error, not a panic.
fn token_expiry(now: DateTime<Utc>, ttl_hours: u64) -> vs_core::Result<DateTime<Utc>> {
    i64::try_from(ttl_hours)
        .ok()
        .and_then(TimeDelta::try_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| {
            Error::Internal(format!("auth.token_ttl_hours {ttl_hours} is out of range"))
        })
}

fn validate_registration(req: &RegisterRequest, auth: &AuthConfig) -> vs_core::Result<()> {
    if req.username.trim().is_empty() {
        return Err(Error::Validation("username is required".into()));
    }
    let email = req.email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(Error::Validation("email must be a valid address".into())),
    }
    if req.password.chars().count() < auth.min_password_len {
        return Err(Error::Validation(format!(
            "password must be at least {} characters",
            auth.min_password_len
        )));
    }
    Ok(())
}

/// POST /api/register
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn register(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user = create_account(&ctx, payload)
        .map_err(|e| AppError::new(e).with_request_id(request_id.0))?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

fn create_account(
    ctx: &AppContext,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> vs_core::Result<vs_db::models::User> {
    let req = parse_body(payload)?;
    let auth = &ctx.config.auth;
    validate_registration(&req, auth)?;

    let hash = bcrypt::hash(&req.password, auth.bcrypt_cost)
        .map_err(|e| Error::Internal(format!("bcrypt error: {e}")))?;

    let conn = vs_db::pool::get_conn(&ctx.db)?;
    let user = vs_db::queries::users::create_user(
        &conn,
        req.username.trim(),
        req.email.trim(),
        &hash,
    )?;

    tracing::info!(user_id = %user.id, username = %user.username, "Account registered");
    Ok(user)
}

/// POST /api/login
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    issue_token(&ctx, payload)
        .map(Json)
        .map_err(|e| AppError::new(e).with_request_id(request_id.0))
}

fn issue_token(
    ctx: &AppContext,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> vs_core::Result<LoginResponse> {
    let req = parse_body(payload)?;
    let username = req.username.trim();
    let conn = vs_db::pool::get_conn(&ctx.db)?;

    let Some(user) = vs_db::queries::users::get_user_by_username(&conn, username)? else {
        tracing::debug!(username, "Login for unknown user");
        return Err(Error::Unauthorized("Invalid credentials".into()));
    };

    let password_valid = bcrypt::verify(&req.password, &user.password_hash).unwrap_or_else(|e| {
        tracing::warn!(user_id = %user.id, "Stored password hash is unreadable: {e}");
        false
    });
    if !password_valid {
        return Err(Error::Unauthorized("Invalid credentials".into()));
    }

    let expires_at = token_expiry(Utc::now(), ctx.config.auth.token_ttl_hours)?.to_rfc3339();
    let token = uuid::Uuid::new_v4().to_string();
    vs_db::queries::auth::create_token(&conn, user.id, &token, &expires_at)?;

    tracing::info!(user_id = %user.id, "Login successful");
    Ok(LoginResponse {
        token,
        expires_at,
        user: user.into(),
    })
}

/// POST /api/logout
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
pub async fn logout(
    State(ctx): State<AppContext>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<StatusCode, AppError> {
    let conn = vs_db::pool::get_conn(&ctx.db)?;
    vs_db::queries::auth::delete_token(&conn, &token)?;
    Ok(StatusCode::NO_CONTENT)
}
