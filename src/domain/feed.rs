//! The subscriptions feed: every followed author with a bounded slice of
//! their recipes.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::domain::DomainError;
use crate::error::AppError;
use crate::models::{RecipeSummary, RelationKind, User};
use crate::store;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowedAuthor {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Always true in this listing: the requesting user follows the author.
    pub is_subscribed: bool,
    pub is_mutual_follow: bool,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}

pub fn validate_limit(recipes_limit: Option<i64>) -> Result<(), DomainError> {
    match recipes_limit {
        Some(limit) if limit < 0 => Err(DomainError::InvalidLimit(limit)),
        _ => Ok(()),
    }
}

async fn describe_author(
    db: &SqlitePool,
    user_id: i64,
    author: User,
    recipes_limit: Option<i64>,
) -> Result<FollowedAuthor, AppError> {
    let recipes = store::find_recipes_by_author(db, author.id, recipes_limit)
        .await?
        .into_iter()
        .map(RecipeSummary::from)
        .collect();
    let recipes_count = store::count_recipes_by_author(db, author.id).await?;
    let is_mutual_follow = store::relation_exists(db, RelationKind::Follow, author.id, user_id).await?;

    Ok(FollowedAuthor {
        email: author.email,
        id: author.id,
        username: author.username,
        first_name: author.first_name,
        last_name: author.last_name,
        is_subscribed: true,
        is_mutual_follow,
        recipes,
        recipes_count,
    })
}

/// Authors come back in the order the user followed them. `recipes_limit`
/// truncates each author's recipe list but never `recipes_count`.
pub async fn list_followed_authors_with_recipes(
    db: &SqlitePool,
    user_id: i64,
    recipes_limit: Option<i64>,
) -> Result<Vec<FollowedAuthor>, AppError> {
    validate_limit(recipes_limit)?;

    let authors = store::find_followed_authors(db, user_id).await?;
    let mut feed = Vec::with_capacity(authors.len());
    for author in authors {
        feed.push(describe_author(db, user_id, author, recipes_limit).await?);
    }
    Ok(feed)
}

/// The feed entry for a single author, as returned right after subscribing.
pub async fn followed_author(
    db: &SqlitePool,
    user_id: i64,
    author_id: i64,
    recipes_limit: Option<i64>,
) -> Result<FollowedAuthor, AppError> {
    validate_limit(recipes_limit)?;

    let author = store::find_user(db, author_id)
        .await?
        .ok_or(DomainError::UserNotFound(author_id))?;
    describe_author(db, user_id, author, recipes_limit).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_limit_is_rejected() {
        assert_eq!(validate_limit(Some(-1)), Err(DomainError::InvalidLimit(-1)));
    }

    #[test]
    fn zero_and_absent_limits_are_accepted() {
        assert_eq!(validate_limit(Some(0)), Ok(()));
        assert_eq!(validate_limit(Some(3)), Ok(()));
        assert_eq!(validate_limit(None), Ok(()));
    }
}
