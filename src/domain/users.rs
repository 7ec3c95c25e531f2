//! Accounts: registration, credential checks and the public profile shape.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::domain::DomainError;
use crate::error::AppError;
use crate::models::{RelationKind, User};
use crate::store;

pub const USERNAME_MAX_LEN: usize = 150;

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// A user as seen by another (possibly anonymous) user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserProfile {
    pub fn new(user: User, is_subscribed: bool) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

#[derive(FromRow)]
struct Credentials {
    id: i64,
    password_hash: String,
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn validate_new_user(new: &NewUser) -> Result<(), DomainError> {
    let required = [
        ("email", &new.email),
        ("username", &new.username),
        ("first_name", &new.first_name),
        ("last_name", &new.last_name),
        ("password", &new.password),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(DomainError::BlankField { field: *field });
    }
    if new.username.chars().count() > USERNAME_MAX_LEN {
        return Err(DomainError::FieldTooLong { field: "username", max: USERNAME_MAX_LEN });
    }
    if !new.email.contains('@') {
        return Err(DomainError::InvalidEmail);
    }
    Ok(())
}

pub async fn profile(db: &SqlitePool, user: User, viewer: Option<i64>) -> Result<UserProfile, AppError> {
    let is_subscribed = match viewer {
        Some(viewer_id) => store::relation_exists(db, RelationKind::Follow, viewer_id, user.id).await?,
        None => false,
    };
    Ok(UserProfile::new(user, is_subscribed))
}

pub async fn register(db: &SqlitePool, new: NewUser) -> Result<User, AppError> {
    validate_new_user(&new)?;

    let (taken_username,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(new.username.trim())
        .fetch_one(db)
        .await?;
    if taken_username > 0 {
        return Err(DomainError::Taken { field: "username" }.into());
    }

    let (taken_email,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(new.email.trim())
        .fetch_one(db)
        .await?;
    if taken_email > 0 {
        return Err(DomainError::Taken { field: "email" }.into());
    }

    let password_hash = hash_password(&new.password)?;
    let user = insert_user(db, &new, &password_hash).await?;

    tracing::info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Inserts the row. A concurrent registration that took the username or email
/// first surfaces as `Taken` on whichever column collided.
async fn insert_user(db: &SqlitePool, new: &NewUser, password_hash: &str) -> Result<User, AppError> {
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query_as(
        r#"
        INSERT INTO users (username, email, first_name, last_name, password_hash, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, username, email, first_name, last_name
        "#,
    )
    .bind(new.username.trim())
    .bind(new.email.trim())
    .bind(new.first_name.trim())
    .bind(new.last_name.trim())
    .bind(password_hash)
    .bind(&now)
    .fetch_one(db)
    .await
    .map_err(|e| {
        if store::is_unique_violation_on(&e, "users.email") {
            AppError::from(DomainError::Taken { field: "email" })
        } else if store::is_unique_violation(&e) {
            AppError::from(DomainError::Taken { field: "username" })
        } else {
            AppError::from(e)
        }
    })
}

pub async fn authenticate(db: &SqlitePool, email: &str, password: &str) -> Result<User, AppError> {
    let credentials: Option<Credentials> =
        sqlx::query_as("SELECT id, password_hash FROM users WHERE email = ?")
            .bind(email.trim())
            .fetch_optional(db)
            .await?;

    let Some(credentials) = credentials else {
        return Err(DomainError::InvalidCredentials { field: "non_field_errors" }.into());
    };

    if !verify_password(password, &credentials.password_hash)? {
        return Err(DomainError::InvalidCredentials { field: "non_field_errors" }.into());
    }

    store::find_user(db, credentials.id)
        .await?
        .ok_or_else(|| DomainError::UserNotFound(credentials.id).into())
}

pub async fn set_password(
    db: &SqlitePool,
    user_id: i64,
    current_password: &str,
    new_password: &str,
) -> Result<(), AppError> {
    if new_password.trim().is_empty() {
        return Err(DomainError::BlankField { field: "new_password" }.into());
    }

    let credentials: Credentials = sqlx::query_as("SELECT id, password_hash FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or(DomainError::UserNotFound(user_id))?;

    if !verify_password(current_password, &credentials.password_hash)? {
        return Err(DomainError::InvalidCredentials { field: "current_password" }.into());
    }

    let password_hash = hash_password(new_password)?;
    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(&password_hash)
        .bind(credentials.id)
        .execute(db)
        .await?;

    tracing::info!(user_id, "password changed");
    Ok(())
}
