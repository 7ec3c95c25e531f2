pub mod ingredient;
pub mod recipe;
pub mod relation;
pub mod tag;
pub mod user;

pub use ingredient::{Ingredient, IngredientLine};
pub use recipe::{Recipe, RecipeSummary};
pub use relation::{Relation, RelationKind};
pub use tag::Tag;
pub use user::User;
