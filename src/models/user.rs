use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Public profile of a user. The password hash lives in its own column and is
/// only ever read by `domain::users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}
