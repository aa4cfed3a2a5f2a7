//! Subscription entity - Directed "follows" edge from a user to an author.
//!
//! `(user_id, author_id)` is the primary key, so the storage layer rejects a
//! duplicate edge even if two requests race past the application check.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Subscription edge model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    /// The follower
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    /// The followed author
    #[sea_orm(primary_key, auto_increment = false)]
    pub author_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Follower,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl ActiveModelBehavior for ActiveModel {}
