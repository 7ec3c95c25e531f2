use serde::{Deserialize, Serialize};

/// The three user-owned join tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Follow,
    Favorite,
    ShoppingCart,
}

impl RelationKind {
    pub fn table(self) -> &'static str {
        match self {
            RelationKind::Follow => "follows",
            RelationKind::Favorite => "favorites",
            RelationKind::ShoppingCart => "shopping_carts",
        }
    }

    pub fn target_column(self) -> &'static str {
        match self {
            RelationKind::Follow => "following_id",
            RelationKind::Favorite | RelationKind::ShoppingCart => "recipe_id",
        }
    }

    /// Whether the target of the relation is a user rather than a recipe.
    pub fn targets_user(self) -> bool {
        matches!(self, RelationKind::Follow)
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationKind::Follow => write!(f, "subscription"),
            RelationKind::Favorite => write!(f, "favorite"),
            RelationKind::ShoppingCart => write!(f, "shopping cart entry"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub id: i64,
    pub kind: RelationKind,
    pub user_id: i64,
    pub target_id: i64,
}
