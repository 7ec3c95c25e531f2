use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::auth::{AuthUser, MaybeUser};
use crate::domain::recipes::{self, NewRecipe, RecipeFilter, RecipePatch};
use crate::domain::{relations, DomainError};
use crate::error::AppError;
use crate::models::{Recipe, RecipeSummary, RelationKind};
use crate::store;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/{id}",
            get(show_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route(
            "/recipes/{id}/favorite",
            post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/recipes/{id}/shopping_cart",
            post(add_to_cart).delete(remove_from_cart),
        )
}

async fn fetch_recipe(state: &AppState, id: i64) -> Result<Recipe, AppError> {
    store::find_recipe(&state.db, id)
        .await?
        .ok_or_else(|| DomainError::RecipeNotFound(id).into())
}

async fn list_recipes(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(filter): Query<RecipeFilter>,
) -> Result<impl IntoResponse, AppError> {
    let recipes = recipes::list_recipes(&state.db, &filter, viewer.id()).await?;
    Ok(Json(recipes))
}

async fn show_recipe(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let recipe = fetch_recipe(&state, id).await?;
    Ok(Json(recipes::load_recipe_detail(&state.db, recipe, viewer.id()).await?))
}

async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(form): Json<NewRecipe>,
) -> Result<impl IntoResponse, AppError> {
    let recipe = recipes::create_recipe(&state.db, user.id, form).await?;
    let detail = recipes::load_recipe_detail(&state.db, recipe, Some(user.id)).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(patch): Json<RecipePatch>,
) -> Result<impl IntoResponse, AppError> {
    let recipe = fetch_recipe(&state, id).await?;
    recipes::ensure_owner(&recipe, user.id)?;

    let recipe = recipes::update_recipe(&state.db, id, patch).await?;
    Ok(Json(recipes::load_recipe_detail(&state.db, recipe, Some(user.id)).await?))
}

async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let recipe = fetch_recipe(&state, id).await?;
    recipes::ensure_owner(&recipe, user.id)?;

    recipes::delete_recipe(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_relation(state: &AppState, kind: RelationKind, user_id: i64, id: i64) -> Result<impl IntoResponse + use<>, AppError> {
    relations::add(&state.db, kind, user_id, id).await?;
    let recipe = fetch_recipe(state, id).await?;
    Ok((StatusCode::CREATED, Json(RecipeSummary::from(recipe))))
}

async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    add_relation(&state, RelationKind::Favorite, user.id, id).await
}

async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    relations::remove(&state.db, RelationKind::Favorite, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_to_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    add_relation(&state, RelationKind::ShoppingCart, user.id, id).await
}

async fn remove_from_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    relations::remove(&state.db, RelationKind::ShoppingCart, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
