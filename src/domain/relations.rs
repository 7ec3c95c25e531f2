//! Follow, Favorite and ShoppingCart: single-row adds and removes.
//!
//! Duplicate adds are rejected, never ignored. The decision is left to the
//! `UNIQUE` constraint on each table so that two racing writers cannot both
//! succeed.

use sqlx::SqlitePool;

use crate::domain::DomainError;
use crate::error::AppError;
use crate::models::{Relation, RelationKind};
use crate::store;

async fn ensure_target_exists(db: &SqlitePool, kind: RelationKind, target_id: i64) -> Result<(), AppError> {
    if kind.targets_user() {
        if store::find_user(db, target_id).await?.is_none() {
            return Err(DomainError::UserNotFound(target_id).into());
        }
    } else if store::find_recipe(db, target_id).await?.is_none() {
        return Err(DomainError::RecipeNotFound(target_id).into());
    }
    Ok(())
}

pub async fn add(db: &SqlitePool, kind: RelationKind, user_id: i64, target_id: i64) -> Result<Relation, AppError> {
    if kind == RelationKind::Follow && user_id == target_id {
        return Err(DomainError::SelfReferenceNotAllowed.into());
    }
    ensure_target_exists(db, kind, target_id).await?;

    let inserted: Result<(i64,), sqlx::Error> = sqlx::query_as(&format!(
        "INSERT INTO {} (user_id, {}) VALUES (?, ?) RETURNING id",
        kind.table(),
        kind.target_column()
    ))
    .bind(user_id)
    .bind(target_id)
    .fetch_one(db)
    .await;

    let (id,) = match inserted {
        Ok(row) => row,
        Err(e) if store::is_unique_violation(&e) => {
            return Err(DomainError::AlreadyExists(kind).into());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(%kind, user_id, target_id, "relation added");
    Ok(Relation {
        id,
        kind,
        user_id,
        target_id,
    })
}

pub async fn remove(db: &SqlitePool, kind: RelationKind, user_id: i64, target_id: i64) -> Result<(), AppError> {
    ensure_target_exists(db, kind, target_id).await?;

    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id = ? AND {} = ?",
        kind.table(),
        kind.target_column()
    ))
    .bind(user_id)
    .bind(target_id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DomainError::RelationNotFound(kind).into());
    }

    tracing::info!(%kind, user_id, target_id, "relation removed");
    Ok(())
}

pub async fn exists(db: &SqlitePool, kind: RelationKind, user_id: i64, target_id: i64) -> Result<bool, AppError> {
    Ok(store::relation_exists(db, kind, user_id, target_id).await?)
}
