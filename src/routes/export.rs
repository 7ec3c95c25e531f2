use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::get,
    Router,
};

use crate::auth::AuthUser;
use crate::domain::shopping_list::{build_shopping_list, render_shopping_list_text};
use crate::error::AppError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/recipes/download_shopping_cart", get(download_shopping_cart))
}

async fn download_shopping_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = build_shopping_list(&state.db, user.id).await?;
    let text = render_shopping_list_text(&rows);

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=shopping_cart.txt"),
    );

    tracing::info!(user_id = user.id, rows = rows.len(), "shopping list exported");
    Ok((headers, text))
}
