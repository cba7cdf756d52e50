//! Account views.

use axum::extract::{Extension, State};
use axum::Json;
use serde::Serialize;
use vs_core::UserId;
use vs_db::models::User;

use crate::context::AppContext;
use crate::error::AppError;

/// Public view of an account. The password hash never leaves the server.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// GET /api/me
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Authenticated account", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
pub async fn me(
    State(ctx): State<AppContext>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<UserResponse>, AppError> {
    let conn = vs_db::pool::get_conn(&ctx.db)?;
    let user = vs_db::queries::users::get_user_by_id(&conn, user_id)?
        .ok_or_else(|| vs_core::Error::Unauthorized("Account no longer exists".into()))?;
    Ok(Json(user.into()))
}
