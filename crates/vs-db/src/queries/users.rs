//! User account queries.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use vs_core::{Result, UserId};

use crate::error::classify;
use crate::models::User;

/// Insert a new account. A duplicate username or email surfaces as
/// [`vs_core::Error::Conflict`] naming the column.
pub fn create_user(
    conn: &Connection,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User> {
    let id = UserId::new();
    let created_at = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO users (id, username, email, password_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id.to_string(), username, email, password_hash, created_at],
    )
    .map_err(classify)?;

    Ok(User {
        id,
        username: username.to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        created_at,
    })
}

pub fn get_user_by_id(conn: &Connection, id: UserId) -> Result<Option<User>> {
    let q = format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS);
    conn.query_row(&q, [id.to_string()], User::from_row)
        .optional()
        .map_err(classify)
}

pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    let q = format!("SELECT {} FROM users WHERE username = ?1", User::COLUMNS);
    conn.query_row(&q, [username], User::from_row)
        .optional()
        .map_err(classify)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use vs_core::Error;

    #[test]
    fn create_and_get() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let user = create_user(&conn, "alice", "alice@example.com", "hash").unwrap();
        let by_id = get_user_by_id(&conn, user.id).unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
        assert_eq!(by_id.email, "alice@example.com");

        let by_name = get_user_by_username(&conn, "alice").unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
    }

    #[test]
    fn missing_user_is_none() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        assert!(get_user_by_username(&conn, "ghost").unwrap().is_none());
        assert!(get_user_by_id(&conn, UserId::new()).unwrap().is_none());
    }

    #[test]
    fn duplicate_username_conflicts() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        create_user(&conn, "alice", "a@example.com", "h").unwrap();

        let err = create_user(&conn, "alice", "b@example.com", "h").unwrap_err();
        assert!(matches!(err, Error::Conflict { ref field } if field == "username"));
    }

    #[test]
    fn duplicate_email_conflicts() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        create_user(&conn, "alice", "a@example.com", "h").unwrap();

        let err = create_user(&conn, "bob", "a@example.com", "h").unwrap_err();
        assert!(matches!(err, Error::Conflict { ref field } if field == "email"));
    }
}
