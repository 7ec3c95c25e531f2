//! Narrow query helpers shared by the domain operations.
//!
//! Single-statement helpers are generic over the executor so they run against
//! the pool or inside an open transaction alike.

use std::collections::BTreeSet;

use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use crate::models::{IngredientLine, Recipe, RelationKind, Tag, User};

const USER_COLUMNS: &str = "u.id, u.username, u.email, u.first_name, u.last_name";

pub async fn find_user<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_recipe<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
) -> Result<Option<Recipe>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM recipes WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Returns the subset of `ids` that exist in `table`.
pub async fn existing_ids(
    db: &SqlitePool,
    table: &'static str,
    ids: &[i64],
) -> Result<BTreeSet<i64>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(BTreeSet::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT id FROM {table} WHERE id IN ("));
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let rows: Vec<(i64,)> = query.build_query_as().fetch_all(db).await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Recipes in the user's cart, in the order they were added.
pub async fn find_recipes_in_cart<'e, E: SqliteExecutor<'e>>(
    db: E,
    user_id: i64,
) -> Result<Vec<Recipe>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT r.* FROM recipes r
        JOIN shopping_carts sc ON sc.recipe_id = r.id
        WHERE sc.user_id = ?
        ORDER BY sc.id
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn find_ingredient_lines<'e, E: SqliteExecutor<'e>>(
    db: E,
    recipe_id: i64,
) -> Result<Vec<IngredientLine>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT ri.id, ri.recipe_id, ri.ingredient_id, i.name, i.measurement_unit, ri.amount
        FROM recipe_ingredients ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = ?
        ORDER BY ri.id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await
}

pub async fn find_recipe_tags<'e, E: SqliteExecutor<'e>>(
    db: E,
    recipe_id: i64,
) -> Result<Vec<Tag>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT t.* FROM tags t
        JOIN recipe_tags rt ON rt.tag_id = t.id
        WHERE rt.recipe_id = ?
        ORDER BY t.id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await
}

/// An author's recipes, newest first, optionally truncated.
pub async fn find_recipes_by_author<'e, E: SqliteExecutor<'e>>(
    db: E,
    author_id: i64,
    limit: Option<i64>,
) -> Result<Vec<Recipe>, sqlx::Error> {
    // SQLite treats a negative LIMIT as "no limit".
    sqlx::query_as("SELECT * FROM recipes WHERE author_id = ? ORDER BY id DESC LIMIT ?")
        .bind(author_id)
        .bind(limit.unwrap_or(-1))
        .fetch_all(db)
        .await
}

pub async fn count_recipes_by_author<'e, E: SqliteExecutor<'e>>(
    db: E,
    author_id: i64,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Authors the user follows, in the order they were followed.
pub async fn find_followed_authors<'e, E: SqliteExecutor<'e>>(
    db: E,
    user_id: i64,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        SELECT {USER_COLUMNS} FROM users u
        JOIN follows f ON f.following_id = u.id
        WHERE f.user_id = ?
        ORDER BY f.id
        "#
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn relation_exists<'e, E: SqliteExecutor<'e>>(
    db: E,
    kind: RelationKind,
    user_id: i64,
    target_id: i64,
) -> Result<bool, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM {} WHERE user_id = ? AND {} = ?",
        kind.table(),
        kind.target_column()
    ))
    .bind(user_id)
    .bind(target_id)
    .fetch_one(db)
    .await?;
    Ok(count > 0)
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// A unique violation on `column` (`table.column`). SQLite names the failing
/// columns in the message: `UNIQUE constraint failed: users.email`.
pub fn is_unique_violation_on(err: &sqlx::Error, column: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation() && db_err.message().contains(column),
        _ => false,
    }
}
