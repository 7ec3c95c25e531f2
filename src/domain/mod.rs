//! Recipe composition, relation sets, the shopping list and the follow feed.
//!
//! Every operation receives its storage handle explicitly; nothing in here
//! reaches for a global pool.

pub mod error;
pub mod feed;
pub mod recipes;
pub mod relations;
pub mod shopping_list;
pub mod users;

pub use error::{DomainError, ErrorKind};
