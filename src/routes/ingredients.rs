use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::Ingredient;
use crate::AppState;

#[derive(Deserialize)]
pub struct IngredientSearch {
    name: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(list_ingredients))
        .route("/ingredients/{id}", get(show_ingredient))
}

/// `?name=` narrows the catalog to names starting with the given prefix.
async fn list_ingredients(
    State(state): State<AppState>,
    Query(search): Query<IngredientSearch>,
) -> Result<impl IntoResponse, AppError> {
    let prefix = search.name.unwrap_or_default();
    let ingredients: Vec<Ingredient> = sqlx::query_as(
        "SELECT * FROM ingredients WHERE name LIKE ? || '%' ORDER BY name, id"
    )
    .bind(prefix.trim())
    .fetch_all(&state.db)
    .await?;
    Ok(Json(ingredients))
}

async fn show_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ingredient: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;
    ingredient.map(Json).ok_or(AppError::NotFound)
}
