//! Failures raised by the domain operations.
//!
//! Every variant is recoverable by the caller and names the request field it
//! is attributed to, so the HTTP layer can answer with a structured body.

use thiserror::Error;

use crate::models::RelationKind;

/// Broad failure category, used to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Authorization,
    Authentication,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{field} must not be blank")]
    BlankField { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
    #[error("enter a valid email address")]
    InvalidEmail,
    #[error("cooking time must be at least 1 minute, got {0}")]
    InvalidCookingTime(i64),
    #[error("amount of ingredient {ingredient_id} must be between 1 and 2147483647, got {amount}")]
    InvalidQuantity { ingredient_id: i64, amount: i64 },
    #[error("a recipe needs at least one ingredient")]
    MissingIngredients,
    #[error("a recipe needs at least one tag")]
    MissingTags,
    #[error("recipes_limit must be greater than or equal to 0, got {0}")]
    InvalidLimit(i64),
    #[error("ingredient {0} does not exist")]
    UnknownIngredient(i64),
    #[error("tag {0} does not exist")]
    UnknownTag(i64),
    #[error("recipe {0} does not exist")]
    RecipeNotFound(i64),
    #[error("user {0} does not exist")]
    UserNotFound(i64),
    #[error("{0} does not exist")]
    RelationNotFound(RelationKind),
    #[error("{0} already exists")]
    AlreadyExists(RelationKind),
    #[error("you cannot subscribe to yourself")]
    SelfReferenceNotAllowed,
    #[error("a user with that {field} already exists")]
    Taken { field: &'static str },
    #[error("only the author may change this recipe")]
    NotOwner,
    #[error("invalid credentials")]
    InvalidCredentials { field: &'static str },
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::BlankField { .. }
            | DomainError::FieldTooLong { .. }
            | DomainError::InvalidEmail
            | DomainError::InvalidCookingTime(_)
            | DomainError::InvalidQuantity { .. }
            | DomainError::MissingIngredients
            | DomainError::MissingTags
            | DomainError::InvalidLimit(_) => ErrorKind::Validation,
            DomainError::UnknownIngredient(_)
            | DomainError::UnknownTag(_)
            | DomainError::RecipeNotFound(_)
            | DomainError::UserNotFound(_)
            | DomainError::RelationNotFound(_) => ErrorKind::NotFound,
            DomainError::AlreadyExists(_)
            | DomainError::SelfReferenceNotAllowed
            | DomainError::Taken { .. } => ErrorKind::Conflict,
            DomainError::NotOwner => ErrorKind::Authorization,
            DomainError::InvalidCredentials { .. } => ErrorKind::Authentication,
        }
    }

    /// The request field the failure is reported against.
    pub fn field(&self) -> &'static str {
        match self {
            DomainError::BlankField { field }
            | DomainError::FieldTooLong { field, .. }
            | DomainError::Taken { field }
            | DomainError::InvalidCredentials { field } => field,
            DomainError::InvalidEmail => "email",
            DomainError::InvalidCookingTime(_) => "cooking_time",
            DomainError::InvalidQuantity { .. }
            | DomainError::MissingIngredients
            | DomainError::UnknownIngredient(_) => "ingredients",
            DomainError::MissingTags | DomainError::UnknownTag(_) => "tags",
            DomainError::InvalidLimit(_) => "recipes_limit",
            DomainError::RecipeNotFound(_)
            | DomainError::UserNotFound(_)
            | DomainError::RelationNotFound(_)
            | DomainError::AlreadyExists(_)
            | DomainError::SelfReferenceNotAllowed
            | DomainError::NotOwner => "detail",
        }
    }

    /// Unknown catalog ids arrive in a request body, so they are answered as
    /// bad input rather than a missing resource.
    pub fn is_request_field(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownIngredient(_)
                | DomainError::UnknownTag(_)
                | DomainError::RelationNotFound(_)
        )
    }
}
