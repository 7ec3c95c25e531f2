mod common;

use axum::http::StatusCode;
use common::{body_json, count_rows, create_ingredient, create_recipe, create_tag, test_pool, TestApp};
use foodgram::domain::{relations, DomainError};
use foodgram::error::AppError;
use foodgram::models::RelationKind;

async fn seeded_recipe(db: &sqlx::SqlitePool, author: i64) -> i64 {
    let flour = create_ingredient(db, "Flour", "g").await;
    let tag = create_tag(db, "Baking", "#8775D2").await;
    create_recipe(db, author, "Bread", tag, &[(flour, 500)]).await
}

#[tokio::test]
async fn following_yourself_is_rejected() {
    let db = test_pool().await;
    let user = common::create_user(&db, "narcissus").await;

    let result = relations::add(&db, RelationKind::Follow, user, user).await;

    assert!(matches!(result, Err(AppError::Domain(DomainError::SelfReferenceNotAllowed))));
    assert_eq!(count_rows(&db, "follows").await, 0);
}

#[tokio::test]
async fn duplicate_add_is_rejected() {
    let db = test_pool().await;
    let user = common::create_user(&db, "fan").await;
    let author = common::create_user(&db, "star").await;

    let first = relations::add(&db, RelationKind::Follow, user, author).await.unwrap();
    assert_eq!(first.target_id, author);

    let second = relations::add(&db, RelationKind::Follow, user, author).await;
    assert!(matches!(
        second,
        Err(AppError::Domain(DomainError::AlreadyExists(RelationKind::Follow)))
    ));
    assert_eq!(count_rows(&db, "follows").await, 1);
}

#[tokio::test]
async fn remove_without_add_is_rejected() {
    let db = test_pool().await;
    let user = common::create_user(&db, "cook").await;
    let recipe = seeded_recipe(&db, user).await;

    let result = relations::remove(&db, RelationKind::Favorite, user, recipe).await;

    assert!(matches!(
        result,
        Err(AppError::Domain(DomainError::RelationNotFound(RelationKind::Favorite)))
    ));
}

#[tokio::test]
async fn add_then_remove_round_trip() {
    let db = test_pool().await;
    let user = common::create_user(&db, "cook").await;
    let recipe = seeded_recipe(&db, user).await;

    relations::add(&db, RelationKind::ShoppingCart, user, recipe).await.unwrap();
    assert!(relations::exists(&db, RelationKind::ShoppingCart, user, recipe).await.unwrap());
    assert!(!relations::exists(&db, RelationKind::Favorite, user, recipe).await.unwrap());

    relations::remove(&db, RelationKind::ShoppingCart, user, recipe).await.unwrap();
    assert!(!relations::exists(&db, RelationKind::ShoppingCart, user, recipe).await.unwrap());
}

#[tokio::test]
async fn missing_target_is_not_found() {
    let db = test_pool().await;
    let user = common::create_user(&db, "cook").await;

    let result = relations::add(&db, RelationKind::Favorite, user, 404).await;
    assert!(matches!(result, Err(AppError::Domain(DomainError::RecipeNotFound(404)))));

    let result = relations::add(&db, RelationKind::Follow, user, 404).await;
    assert!(matches!(result, Err(AppError::Domain(DomainError::UserNotFound(404)))));
}

#[tokio::test]
async fn favorite_endpoints() {
    let app = TestApp::new().await;
    let (user, cookie) = app.signed_in("cook").await;
    let recipe = seeded_recipe(&app.db, user).await;
    let uri = format!("/recipes/{}/favorite", recipe);

    let resp = app.post(&uri, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = body_json(resp).await;
    assert_eq!(json["id"], recipe);
    assert_eq!(json["name"], "Bread");
    assert_eq!(json["cooking_time"], 15);

    let resp = app.post(&uri, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app.delete(&uri, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.delete(&uri, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn shopping_cart_endpoints_require_login() {
    let app = TestApp::new().await;
    let author = app.create_user("cook").await;
    let recipe = seeded_recipe(&app.db, author).await;

    let resp = app.post(&format!("/recipes/{}/shopping_cart", recipe), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(count_rows(&app.db, "shopping_carts").await, 0);
}

#[tokio::test]
async fn favoriting_missing_recipe_is_not_found() {
    let app = TestApp::new().await;
    let (_user, cookie) = app.signed_in("cook").await;

    let resp = app.post("/recipes/999/favorite", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn subscribe_endpoints() {
    let app = TestApp::new().await;
    let (me, cookie) = app.signed_in("reader").await;
    let author = app.create_user("writer").await;

    let resp = app.post(&format!("/users/{}/subscribe", me), Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["detail"].is_array());

    let uri = format!("/users/{}/subscribe", author);
    let resp = app.post(&uri, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = body_json(resp).await;
    assert_eq!(json["username"], "writer");
    assert_eq!(json["is_subscribed"], true);

    let resp = app.post(&uri, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app.delete(&uri, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.delete(&uri, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
