//! Bearer token queries.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use vs_core::{Result, TokenId, UserId};

use crate::error::classify;
use crate::models::AuthToken;

pub fn create_token(
    conn: &Connection,
    user_id: UserId,
    token: &str,
    expires_at: &str,
) -> Result<AuthToken> {
    let id = TokenId::new();

    conn.execute(
        "INSERT INTO auth_tokens (id, user_id, token, expires_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id.to_string(), user_id.to_string(), token, expires_at],
    )
    .map_err(classify)?;

    Ok(AuthToken {
        id,
        user_id,
        token: token.to_string(),
        expires_at: expires_at.to_string(),
    })
}

/// Look up a token by value, regardless of expiry.
pub fn get_token(conn: &Connection, token: &str) -> Result<Option<AuthToken>> {
    let q = format!("SELECT {} FROM auth_tokens WHERE token = ?1", AuthToken::COLUMNS);
    conn.query_row(&q, [token], AuthToken::from_row)
        .optional()
        .map_err(classify)
}

/// Look up a token that has not expired at `now`.
///
/// Expired tokens are deleted on sight.
pub fn get_valid_token(
    conn: &Connection,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<AuthToken>> {
    let Some(found) = get_token(conn, token)? else {
        return Ok(None);
    };

    let expired = match DateTime::parse_from_rfc3339(&found.expires_at) {
        Ok(expires_at) => expires_at <= now,
        Err(e) => {
            tracing::warn!(token_id = %found.id, "Unparsable token expiry: {e}");
            true
        }
    };

    if expired {
        delete_token(conn, token)?;
        return Ok(None);
    }
    Ok(Some(found))
}

/// Returns true if a row was deleted.
pub fn delete_token(conn: &Connection, token: &str) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM auth_tokens WHERE token = ?1", [token])
        .map_err(classify)?;
    Ok(n > 0)
}

/// Delete all tokens that expired before `now` (RFC 3339).
pub fn delete_expired_tokens(conn: &Connection, now: &str) -> Result<usize> {
    conn.execute("DELETE FROM auth_tokens WHERE expires_at < ?1", [now])
        .map_err(classify)
}
