//! Recipe composition: validation, atomic create/update, ownership and the
//! full representation served to clients.

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::domain::users::{self, UserProfile};
use crate::domain::DomainError;
use crate::error::AppError;
use crate::models::{IngredientLine, Recipe, RelationKind, Tag};
use crate::store;

pub const NAME_MAX_LEN: usize = 200;
/// Amounts are stored as 32-bit integers.
pub const AMOUNT_MAX: i64 = i32::MAX as i64;

/// One submitted (ingredient, amount) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    pub id: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    pub cooking_time: i64,
    pub tags: Vec<i64>,
    pub ingredients: Vec<IngredientAmount>,
}

/// Partial update. Omitted fields are left as they are; supplied collections
/// replace the stored ones wholesale. `image` distinguishes omitted (`None`)
/// from an explicit `null` (`Some(None)`), which clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub text: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<String>>,
    pub cooking_time: Option<i64>,
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<IngredientAmount>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeFilter {
    pub author: Option<i64>,
    pub is_favorited: Option<u8>,
    pub is_in_shopping_cart: Option<u8>,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientAmountView {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

impl From<IngredientLine> for IngredientAmountView {
    fn from(line: IngredientLine) -> Self {
        Self {
            id: line.ingredient_id,
            name: line.name,
            measurement_unit: line.measurement_unit,
            amount: line.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub tags: Vec<Tag>,
    pub author: UserProfile,
    pub ingredients: Vec<IngredientAmountView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i64,
}

pub fn is_owned_by(recipe: &Recipe, user_id: i64) -> bool {
    recipe.author_id == user_id
}

pub fn ensure_owner(recipe: &Recipe, user_id: i64) -> Result<(), DomainError> {
    if is_owned_by(recipe, user_id) {
        Ok(())
    } else {
        Err(DomainError::NotOwner)
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::BlankField { field: "name" });
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(DomainError::FieldTooLong { field: "name", max: NAME_MAX_LEN });
    }
    Ok(())
}

fn validate_text(text: &str) -> Result<(), DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::BlankField { field: "text" });
    }
    Ok(())
}

fn validate_cooking_time(cooking_time: i64) -> Result<(), DomainError> {
    if cooking_time < 1 {
        return Err(DomainError::InvalidCookingTime(cooking_time));
    }
    Ok(())
}

fn validate_ingredients(lines: &[IngredientAmount]) -> Result<(), DomainError> {
    if lines.is_empty() {
        return Err(DomainError::MissingIngredients);
    }
    if let Some(line) = lines.iter().find(|line| !(1..=AMOUNT_MAX).contains(&line.amount)) {
        return Err(DomainError::InvalidQuantity {
            ingredient_id: line.id,
            amount: line.amount,
        });
    }
    Ok(())
}

fn validate_tags(tags: &[i64]) -> Result<(), DomainError> {
    if tags.is_empty() {
        return Err(DomainError::MissingTags);
    }
    Ok(())
}

/// Fails with the first submitted ingredient id missing from the catalog.
async fn ensure_ingredients_exist(db: &SqlitePool, lines: &[IngredientAmount]) -> Result<(), AppError> {
    let ids: Vec<i64> = lines.iter().map(|line| line.id).collect();
    let known = store::existing_ids(db, "ingredients", &ids).await?;
    match ids.into_iter().find(|id| !known.contains(id)) {
        Some(id) => Err(DomainError::UnknownIngredient(id).into()),
        None => Ok(()),
    }
}

async fn ensure_tags_exist(db: &SqlitePool, tags: &[i64]) -> Result<(), AppError> {
    let known = store::existing_ids(db, "tags", tags).await?;
    match tags.iter().find(|id| !known.contains(id)) {
        Some(id) => Err(DomainError::UnknownTag(*id).into()),
        None => Ok(()),
    }
}

async fn insert_ingredient_lines(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    lines: &[IngredientAmount],
) -> Result<(), sqlx::Error> {
    let mut query =
        QueryBuilder::<Sqlite>::new("INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ");
    query.push_values(lines, |mut row, line| {
        row.push_bind(recipe_id).push_bind(line.id).push_bind(line.amount);
    });
    query.build().execute(conn).await?;
    Ok(())
}

async fn link_tags(conn: &mut SqliteConnection, recipe_id: i64, tags: &[i64]) -> Result<(), sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new("INSERT OR IGNORE INTO recipe_tags (recipe_id, tag_id) ");
    query.push_values(tags, |mut row, tag_id| {
        row.push_bind(recipe_id).push_bind(*tag_id);
    });
    query.build().execute(conn).await?;
    Ok(())
}

/// Validates everything up front, then writes the recipe, its ingredient lines
/// and its tag links in one transaction.
pub async fn create_recipe(db: &SqlitePool, author_id: i64, new: NewRecipe) -> Result<Recipe, AppError> {
    validate_name(&new.name)?;
    validate_text(&new.text)?;
    validate_cooking_time(new.cooking_time)?;
    validate_ingredients(&new.ingredients)?;
    validate_tags(&new.tags)?;
    ensure_ingredients_exist(db, &new.ingredients).await?;
    ensure_tags_exist(db, &new.tags).await?;

    let now = chrono::Utc::now().to_rfc3339();
    let mut tx = db.begin().await?;

    let recipe: Recipe = sqlx::query_as(
        r#"
        INSERT INTO recipes (author_id, name, image, text, cooking_time, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(author_id)
    .bind(new.name.trim())
    .bind(&new.image)
    .bind(&new.text)
    .bind(new.cooking_time)
    .bind(&now)
    .fetch_one(&mut *tx)
    .await?;

    insert_ingredient_lines(&mut tx, recipe.id, &new.ingredients).await?;
    link_tags(&mut tx, recipe.id, &new.tags).await?;

    tx.commit().await?;

    tracing::info!(recipe_id = recipe.id, author_id, "recipe created");
    Ok(recipe)
}

/// Applies a partial update. Supplied ingredient lines replace every stored
/// line of the recipe; duplicates in the submission are kept as-is.
pub async fn update_recipe(db: &SqlitePool, recipe_id: i64, patch: RecipePatch) -> Result<Recipe, AppError> {
    let current = store::find_recipe(db, recipe_id)
        .await?
        .ok_or(DomainError::RecipeNotFound(recipe_id))?;

    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    if let Some(text) = &patch.text {
        validate_text(text)?;
    }
    if let Some(cooking_time) = patch.cooking_time {
        validate_cooking_time(cooking_time)?;
    }
    if let Some(lines) = &patch.ingredients {
        validate_ingredients(lines)?;
        ensure_ingredients_exist(db, lines).await?;
    }
    if let Some(tags) = &patch.tags {
        validate_tags(tags)?;
        ensure_tags_exist(db, tags).await?;
    }

    let name = patch.name.as_deref().map(str::trim).unwrap_or(&current.name);
    let text = patch.text.as_deref().unwrap_or(&current.text);
    let image = match &patch.image {
        Some(image) => image.as_deref(),
        None => current.image.as_deref(),
    };
    let cooking_time = patch.cooking_time.unwrap_or(current.cooking_time);

    let mut tx = db.begin().await?;

    let recipe: Recipe = sqlx::query_as(
        "UPDATE recipes SET name = ?, text = ?, image = ?, cooking_time = ? WHERE id = ? RETURNING *",
    )
    .bind(name)
    .bind(text)
    .bind(image)
    .bind(cooking_time)
    .bind(recipe_id)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(lines) = &patch.ingredients {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;
        insert_ingredient_lines(&mut tx, recipe_id, lines).await?;
    }

    if let Some(tags) = &patch.tags {
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;
        link_tags(&mut tx, recipe_id, tags).await?;
    }

    tx.commit().await?;

    tracing::info!(recipe_id, "recipe updated");
    Ok(recipe)
}

pub async fn delete_recipe(db: &SqlitePool, recipe_id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(recipe_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DomainError::RecipeNotFound(recipe_id).into());
    }

    tracing::info!(recipe_id, "recipe deleted");
    Ok(())
}

pub async fn load_recipe_detail(
    db: &SqlitePool,
    recipe: Recipe,
    viewer: Option<i64>,
) -> Result<RecipeDetail, AppError> {
    let author = store::find_user(db, recipe.author_id)
        .await?
        .ok_or(DomainError::UserNotFound(recipe.author_id))?;
    let author = users::profile(db, author, viewer).await?;
    let tags = store::find_recipe_tags(db, recipe.id).await?;
    let ingredients = store::find_ingredient_lines(db, recipe.id)
        .await?
        .into_iter()
        .map(IngredientAmountView::from)
        .collect();

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(user_id) => (
            store::relation_exists(db, RelationKind::Favorite, user_id, recipe.id).await?,
            store::relation_exists(db, RelationKind::ShoppingCart, user_id, recipe.id).await?,
        ),
        None => (false, false),
    };

    Ok(RecipeDetail {
        id: recipe.id,
        tags,
        author,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

/// Newest first. The favorite and cart filters only apply to a known viewer.
pub async fn list_recipes(
    db: &SqlitePool,
    filter: &RecipeFilter,
    viewer: Option<i64>,
) -> Result<Vec<RecipeDetail>, AppError> {
    let mut query = QueryBuilder::<Sqlite>::new("SELECT r.* FROM recipes r WHERE 1 = 1");

    if let Some(author) = filter.author {
        query.push(" AND r.author_id = ").push_bind(author);
    }
    if let Some(user_id) = viewer {
        if filter.is_favorited == Some(1) {
            query
                .push(" AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
                .push_bind(user_id)
                .push(")");
        }
        if filter.is_in_shopping_cart == Some(1) {
            query
                .push(" AND EXISTS (SELECT 1 FROM shopping_carts sc WHERE sc.recipe_id = r.id AND sc.user_id = ")
                .push_bind(user_id)
                .push(")");
        }
    }
    if let Some(slug) = filter.tags.as_deref().filter(|s| !s.is_empty()) {
        query
            .push(
                " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
                 WHERE rt.recipe_id = r.id AND t.slug = ",
            )
            .push_bind(slug.to_string())
            .push(")");
    }
    query.push(" ORDER BY r.id DESC");

    let recipes: Vec<Recipe> = query.build_query_as().fetch_all(db).await?;

    let mut details = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        details.push(load_recipe_detail(db, recipe, viewer).await?);
    }
    Ok(details)
}
