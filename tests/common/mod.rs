#![allow(dead_code)]

use axum::body::Body;
use http_body_util::BodyExt;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use foodgram::domain::recipes::{self, IngredientAmount, NewRecipe};
use foodgram::domain::users::{self, NewUser};

pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = test_pool().await;
        let router = foodgram::build_app(pool.clone(), false)
            .await
            .expect("Failed to build app");

        Self { router, db: pool }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Register a user directly and return its id.
    pub async fn create_user(&self, username: &str) -> i64 {
        create_user(&self.db, username).await
    }

    /// Log in as the given user and return the session cookie string.
    pub async fn login(&self, username: &str) -> String {
        let body = json!({ "email": email_for(username), "password": PASSWORD });
        let resp = self.send_json("POST", "/auth/login", &body, None).await;
        assert_eq!(resp.status(), StatusCode::OK);

        resp.headers()
            .get("set-cookie")
            .expect("Login should set a session cookie")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    /// Create a user and log in as them, returning (user_id, cookie).
    pub async fn signed_in(&self, username: &str) -> (i64, String) {
        let id = self.create_user(username).await;
        let cookie = self.login(username).await;
        (id, cookie)
    }

    /// Send a GET request with an optional session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a JSON request with an optional session cookie.
    pub async fn send_json(&self, method: &str, uri: &str, body: &Value, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.request(req).await
    }

    /// Send a bodyless POST request with an optional session cookie.
    pub async fn post(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri).method("POST");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a DELETE request with an optional session cookie.
    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri).method("DELETE");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }
}

/// In-memory database with migrations applied.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub fn email_for(username: &str) -> String {
    format!("{}@example.com", username)
}

pub async fn create_user(db: &SqlitePool, username: &str) -> i64 {
    let new = NewUser {
        email: email_for(username),
        username: username.to_string(),
        first_name: "Test".to_string(),
        last_name: username.to_string(),
        password: PASSWORD.to_string(),
    };
    users::register(db, new).await.expect("Failed to create test user").id
}

pub async fn create_ingredient(db: &SqlitePool, name: &str, unit: &str) -> i64 {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO ingredients (name, measurement_unit) VALUES (?, ?) RETURNING id")
            .bind(name)
            .bind(unit)
            .fetch_one(db)
            .await
            .expect("Failed to create test ingredient");
    id
}

pub async fn create_tag(db: &SqlitePool, name: &str, color: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as("INSERT INTO tags (name, color, slug) VALUES (?, ?, ?) RETURNING id")
        .bind(name)
        .bind(color)
        .bind(name.to_lowercase())
        .fetch_one(db)
        .await
        .expect("Failed to create test tag");
    id
}

/// Create a recipe through the domain layer with the given (ingredient, amount) lines.
pub async fn create_recipe(db: &SqlitePool, author_id: i64, name: &str, tag_id: i64, lines: &[(i64, i64)]) -> i64 {
    let new = NewRecipe {
        name: name.to_string(),
        text: format!("How to cook {}", name),
        image: None,
        cooking_time: 15,
        tags: vec![tag_id],
        ingredients: lines
            .iter()
            .map(|&(id, amount)| IngredientAmount { id, amount })
            .collect(),
    };
    recipes::create_recipe(db, author_id, new)
        .await
        .expect("Failed to create test recipe")
        .id
}

pub async fn count_rows(db: &SqlitePool, table: &str) -> i64 {
    let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(db)
        .await
        .unwrap();
    count
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}
