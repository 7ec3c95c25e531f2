use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::auth::{AuthUser, MaybeUser};
use crate::domain::users::{self, NewUser, UserProfile};
use crate::domain::{feed, relations, DomainError};
use crate::error::AppError;
use crate::models::{RelationKind, User};
use crate::store;
use crate::AppState;

#[derive(Deserialize)]
pub struct FeedQuery {
    recipes_limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct SetPasswordForm {
    new_password: String,
    current_password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(register))
        .route("/users/me", get(me))
        .route("/users/set_password", post(set_password))
        .route("/users/subscriptions", get(subscriptions))
        .route("/users/{id}", get(show_user))
        .route("/users/{id}/subscribe", post(subscribe).delete(unsubscribe))
}

async fn list_users(
    State(state): State<AppState>,
    viewer: MaybeUser,
) -> Result<impl IntoResponse, AppError> {
    let all: Vec<User> = sqlx::query_as(
        "SELECT id, username, email, first_name, last_name FROM users ORDER BY id"
    )
    .fetch_all(&state.db)
    .await?;

    let mut profiles = Vec::with_capacity(all.len());
    for user in all {
        profiles.push(users::profile(&state.db, user, viewer.id()).await?);
    }
    Ok(Json(profiles))
}

async fn register(
    State(state): State<AppState>,
    Json(form): Json<NewUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = users::register(&state.db, form).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn me(AuthUser(user): AuthUser) -> impl IntoResponse {
    Json(UserProfile::new(user, false))
}

async fn show_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = store::find_user(&state.db, id)
        .await?
        .ok_or(DomainError::UserNotFound(id))?;
    Ok(Json(users::profile(&state.db, user, viewer.id()).await?))
}

async fn set_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(form): Json<SetPasswordForm>,
) -> Result<impl IntoResponse, AppError> {
    users::set_password(&state.db, user.id, &form.current_password, &form.new_password).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn subscriptions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let feed = feed::list_followed_authors_with_recipes(&state.db, user.id, query.recipes_limit).await?;
    Ok(Json(feed))
}

async fn subscribe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(author_id): Path<i64>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, AppError> {
    feed::validate_limit(query.recipes_limit)?;
    relations::add(&state.db, RelationKind::Follow, user.id, author_id).await?;
    let entry = feed::followed_author(&state.db, user.id, author_id, query.recipes_limit).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn unsubscribe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(author_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    relations::remove(&state.db, RelationKind::Follow, user.id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
