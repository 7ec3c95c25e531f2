use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::auth::{login_user, logout_user, AuthUser};
use crate::domain::users::{self, UserProfile};
use crate::error::AppError;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let user = users::authenticate(&state.db, &form.email, &form.password).await?;
    login_user(&session, user.clone()).await?;

    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(UserProfile::new(user, false)))
}

async fn logout(session: Session, AuthUser(user): AuthUser) -> Result<impl IntoResponse, AppError> {
    logout_user(&session).await?;
    tracing::info!(user_id = user.id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}
