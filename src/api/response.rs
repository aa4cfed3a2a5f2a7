//! Replies and error bodies produced by the request layer.

use crate::{
    core::{
        recipe::{RecipeDetails, RecipeSummary},
        subscription::AuthorDetails,
        user::UserDetails,
    },
    entities::{ingredient, tag},
    errors::Error,
};
use serde::Serialize;

/// Body of an error reply, `{"errors": "<message>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub errors: String,
}

/// A downloadable file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: String,
}

/// Successful or failed payload of a reply
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    User(UserDetails),
    Users(Vec<UserDetails>),
    Tag(tag::Model),
    Tags(Vec<tag::Model>),
    Ingredient(ingredient::Model),
    Ingredients(Vec<ingredient::Model>),
    Recipe(Box<RecipeDetails>),
    Recipes(Vec<RecipeDetails>),
    RecipeSummary(RecipeSummary),
    RecipeSummaries(Vec<RecipeSummary>),
    Author(Box<AuthorDetails>),
    Authors(Vec<AuthorDetails>),
    Attachment(Attachment),
    Error(ErrorBody),
    /// Serialized as `null`
    NoContent,
}

/// Status code plus reply body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    pub body: Reply,
}

impl Response {
    /// 200 with `body`
    #[must_use]
    pub const fn ok(body: Reply) -> Self {
        Self { status: 200, body }
    }

    /// 201, used when an operation created a record or an edge
    #[must_use]
    pub const fn created(body: Reply) -> Self {
        Self { status: 201, body }
    }

    /// 204 with a `null` body, for deletions and removals
    #[must_use]
    pub const fn no_content() -> Self {
        Self {
            status: 204,
            body: Reply::NoContent,
        }
    }

    /// Maps a core error to a client-facing response.
    ///
    /// Internal failures are logged and replaced by a generic message so
    /// storage details never leak to clients.
    #[must_use]
    pub fn from_error(err: &Error) -> Self {
        let status = match err {
            Error::Validation { .. }
            | Error::AlreadyExists { .. }
            | Error::SelfReferenceNotAllowed
            | Error::Image { .. }
            | Error::Json(_) => 400,
            Error::AuthenticationRequired => 401,
            Error::NotFound { .. } => 404,
            Error::Config { .. } | Error::Database(_) | Error::Io(_) => 500,
        };

        let errors = if status == 500 {
            tracing::error!("Request failed: {err}");
            "Internal server error".to_string()
        } else {
            tracing::debug!("Request rejected: {err}");
            err.to_string()
        };

        Self {
            status,
            body: Reply::Error(ErrorBody { errors }),
        }
    }

    /// Whether the status is in the 2xx range
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}
