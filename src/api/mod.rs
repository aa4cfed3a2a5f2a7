//! Request layer - turns JSON requests into core calls and JSON replies
//!
//! Transport is left to the caller: the binary feeds this layer one JSON object
//! per line, but any front end can build an [`Operation`] and call [`dispatch`].

/// Operation kinds and dispatch
pub mod operation;
/// Reply bodies and status mapping
pub mod response;

pub use operation::{Operation, dispatch};
pub use response::{Reply, Response};

use crate::{
    core::{Actor, media::MediaStore},
    errors::Error,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

/// Shared state available to every operation.
pub struct ApiContext {
    /// Database connection for all database operations
    pub db: DatabaseConnection,
    /// Where uploaded recipe images are written
    pub media: MediaStore,
}

impl ApiContext {
    #[must_use]
    pub const fn new(db: DatabaseConnection, media: MediaStore) -> Self {
        Self { db, media }
    }
}

/// One request: who is asking and what they want.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Request {
    /// Authenticated user id, `null` for anonymous callers
    #[serde(default)]
    pub actor: Option<i64>,
    pub operation: Operation,
}

/// Handles a single JSON request line and returns the serialized response.
///
/// Malformed requests produce a 400 response rather than an error.
pub async fn handle_line(ctx: &ApiContext, line: &str) -> String {
    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => {
            dispatch(ctx, Actor::from_user_id(request.actor), request.operation).await
        }
        Err(e) => {
            tracing::warn!("Rejected malformed request: {e}");
            Response::from_error(&Error::validation(format!("Malformed request: {e}")))
        }
    };

    serde_json::to_string(&response).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize response: {e}");
        r#"{"status":500,"body":{"errors":"Internal server error"}}"#.to_string()
    })
}
