//! Bearer token authentication for protected routes.
//!
//! A valid `Authorization: Bearer <token>` header resolves to a [`UserId`]
//! that is inserted into request extensions, along with the raw
//! [`BearerToken`] so logout can revoke it.

use axum::extract::State;
use axum::http::{header, HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use vs_core::UserId;

use crate::context::AppContext;
use crate::error::AppError;

/// The token the current request authenticated with.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Token from an `Authorization: Bearer` header, if present.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve a token to its user, ignoring expired tokens.
pub fn validate_token(ctx: &AppContext, token: &str) -> vs_core::Result<Option<UserId>> {
    let conn = vs_db::pool::get_conn(&ctx.db)?;
    let found = vs_db::queries::auth::get_valid_token(&conn, token, Utc::now())?;
    Ok(found.map(|t| t.user_id))
}

pub async fn auth_middleware(
    State(ctx): State<AppContext>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(request.headers()).map(str::to_owned) else {
        return unauthorized("Authentication required");
    };

    match validate_token(&ctx, &token) {
        Ok(Some(user_id)) => {
            request.extensions_mut().insert(user_id);
            request.extensions_mut().insert(BearerToken(token));
            next.run(request).await
        }
        Ok(None) => unauthorized("Invalid or expired token"),
        Err(e) => AppError::from(e).into_response(),
    }
}

fn unauthorized(message: &str) -> Response {
    AppError::from(vs_core::Error::Unauthorized(message.into())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(extract_bearer(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer(&headers), None);
    }
}
