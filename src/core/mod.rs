//! Core business logic - framework-agnostic catalog, recipe, relationship and
//! shopping list operations.
//!
//! Functions here take a database connection and an explicit acting user and
//! return structured data; serialization to the wire is the `api` layer's job.

pub mod collection;
pub mod ingredient;
pub mod media;
pub mod recipe;
pub mod shopping_list;
pub mod subscription;
pub mod tag;
pub mod user;
pub mod validation;

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// The user on whose behalf an operation runs.
///
/// Authentication happens outside this crate; by the time a request reaches
/// the core the caller is either anonymous or a known user id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// Unauthenticated visitor. Read operations work, per-user flags are false.
    #[default]
    Anonymous,
    /// Authenticated user with the given id.
    User(i64),
}

impl Actor {
    /// Builds an actor from an optional user id.
    #[must_use]
    pub const fn from_user_id(user_id: Option<i64>) -> Self {
        match user_id {
            Some(id) => Self::User(id),
            None => Self::Anonymous,
        }
    }

    /// The user id, if authenticated.
    #[must_use]
    pub const fn user_id(self) -> Option<i64> {
        match self {
            Self::User(id) => Some(id),
            Self::Anonymous => None,
        }
    }

    /// The user id, or [`Error::AuthenticationRequired`] for anonymous callers.
    pub const fn require_user(self) -> Result<i64> {
        match self {
            Self::User(id) => Ok(id),
            Self::Anonymous => Err(Error::AuthenticationRequired),
        }
    }
}
