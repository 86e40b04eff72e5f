//! User registration for BarBuddy.
//!
//! Users own cocktails through `cocktails.author_id`. Only registration and
//! lookup exist; there is no login or session handling.

mod password;

pub use password::{hash_password, verify_password};

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("user not found: {0}")]
    NotFound(i64),
    #[error("Username {0} is already taken")]
    DuplicateUsername(String),
    #[error("Email {0} is already registered")]
    DuplicateEmail(String),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

/// A stored user. `password` holds the Argon2 hash, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub userdescription: String,
}

/// The fields of a user that may leave the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub userdescription: String,
}

impl User {
    pub fn public_view(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            userdescription: self.userdescription.clone(),
        }
    }
}

/// Registration request body.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupPayload {
    pub username: String,
    pub email: String,
    pub password: String,
    pub userdescription: String,
}

/// JSON Schema for a registration payload.
pub fn signup_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "username": {"type": "string"},
            "email": {"type": "string"},
            "password": {"type": "string"},
            "userdescription": {"type": "string"}
        },
        "required": ["username", "email", "password", "userdescription"]
    })
}

/// Registers a new user whose password was already run through
/// [`hash_password`].
///
/// Hashing is left to the caller so that it does not run inside the store
/// transaction. Usernames and emails are unique; a collision on either is
/// reported as the matching duplicate error and nothing is written.
pub fn register_user(
    conn: &Connection,
    payload: &SignupPayload,
    password_hash: &str,
) -> Result<User, UserError> {
    if find_user_by_username(conn, &payload.username)?.is_some() {
        return Err(UserError::DuplicateUsername(payload.username.clone()));
    }
    let email_taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
        [&payload.email],
        |row| row.get(0),
    )?;
    if email_taken {
        return Err(UserError::DuplicateEmail(payload.email.clone()));
    }

    let id = insert_user(conn, payload, password_hash)?;
    tracing::info!(user_id = id, username = %payload.username, "user registered");
    get_user(conn, id)
}

fn insert_user(
    conn: &Connection,
    payload: &SignupPayload,
    password_hash: &str,
) -> Result<i64, UserError> {
    conn.execute(
        "INSERT INTO users (username, email, password, userdescription)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            payload.username,
            payload.email,
            password_hash,
            payload.userdescription,
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref err, ref message)
            if err.code == rusqlite::ffi::ErrorCode::ConstraintViolation =>
        {
            // SQLite names the column: "UNIQUE constraint failed: users.email".
            if message.as_deref().is_some_and(|m| m.contains("users.email")) {
                UserError::DuplicateEmail(payload.email.clone())
            } else {
                UserError::DuplicateUsername(payload.username.clone())
            }
        }
        other => UserError::Database(other),
    })?;

    Ok(conn.last_insert_rowid())
}

/// Retrieves a user by id.
pub fn get_user(conn: &Connection, id: i64) -> Result<User, UserError> {
    conn.query_row(
        "SELECT id, username, email, password, userdescription FROM users WHERE id = ?1",
        [id],
        map_row_to_user,
    )
    .optional()?
    .ok_or(UserError::NotFound(id))
}

/// Looks a user up by exact username.
pub fn find_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>, UserError> {
    Ok(conn
        .query_row(
            "SELECT id, username, email, password, userdescription FROM users WHERE username = ?1",
            [username],
            map_row_to_user,
        )
        .optional()?)
}

fn map_row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        userdescription: row.get(4)?,
    })
}
