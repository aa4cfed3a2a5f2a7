//! User directory - Registration and profile lookups.
//!
//! Profiles are returned as [`UserDetails`], which adds `is_subscribed`
//! relative to the acting user.

use crate::{
    core::Actor,
    entities::{Subscription, User, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration data for a new user
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct NewUser {
    /// Login name, letters, digits and `.@+-_` only
    #[validate(custom(function = "crate::core::validation::validate_username"))]
    #[validate(length(max = 150, message = "Username must be at most 150 characters"))]
    pub username: String,

    /// Contact address, stored lowercased
    #[validate(custom(function = "crate::core::validation::validate_required"))]
    #[validate(email(message = "Enter a valid email address"))]
    #[validate(length(max = 254, message = "Email must be at most 254 characters"))]
    pub email: String,

    #[validate(custom(function = "crate::core::validation::validate_required"))]
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: String,

    #[validate(custom(function = "crate::core::validation::validate_required"))]
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: String,
}

impl NewUser {
    /// Trims every field and lowercases the email, the form stored and
    /// checked for uniqueness.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
        }
    }
}

/// Public profile of a user as seen by the acting user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDetails {
    pub id: i64,
    /// Unique login name
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the acting user follows this user
    pub is_subscribed: bool,
}

/// Registers a new user after validating the profile fields.
///
/// The payload is normalized first (trimmed, email lowercased) and then checked
/// through its `Validate` derive, so the stored values are exactly the checked
/// ones. Uniqueness of username and email is checked before the insert; the
/// unique indexes on both columns catch a concurrent registration.
///
/// # Errors
/// - [`Error::Validation`] for malformed username, email or empty names
/// - [`Error::AlreadyExists`] if the username or email is taken
pub async fn register_user(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
    let new_user = new_user.normalized();
    if let Err(errors) = new_user.validate() {
        tracing::warn!("Rejected registration for '{}': {errors}", new_user.username);
        return Err(errors.into());
    }
    let NewUser {
        username,
        email,
        first_name,
        last_name,
    } = new_user;

    if User::find()
        .filter(user::Column::Username.eq(username.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(Error::AlreadyExists {
            message: format!("A user with username '{username}' already exists"),
        });
    }
    if User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(Error::AlreadyExists {
            message: format!("A user with email '{email}' already exists"),
        });
    }

    let user = user::ActiveModel {
        username: Set(username),
        email: Set(email),
        first_name: Set(first_name),
        last_name: Set(last_name),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(user_id = user.id, "Registered user {}", user.username);
    Ok(user)
}

/// Finds a user by id.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by id, failing with [`Error::NotFound`] if absent.
pub async fn require_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    get_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))
}

/// Whether `actor` follows `author_id`. Always false for anonymous callers.
pub async fn is_subscribed(db: &DatabaseConnection, actor: Actor, author_id: i64) -> Result<bool> {
    let Some(user_id) = actor.user_id() else {
        return Ok(false);
    };
    Ok(Subscription::find_by_id((user_id, author_id))
        .one(db)
        .await?
        .is_some())
}

/// Builds the profile view of `user` as seen by `actor`.
pub async fn user_details(
    db: &DatabaseConnection,
    actor: Actor,
    user: user::Model,
) -> Result<UserDetails> {
    let is_subscribed = is_subscribed(db, actor, user.id).await?;
    Ok(UserDetails {
        id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        is_subscribed,
    })
}

/// Profile of a single user.
pub async fn get_user_details(
    db: &DatabaseConnection,
    actor: Actor,
    user_id: i64,
) -> Result<UserDetails> {
    let user = require_user(db, user_id).await?;
    user_details(db, actor, user).await
}

/// Profile of the acting user.
pub async fn me(db: &DatabaseConnection, actor: Actor) -> Result<UserDetails> {
    let user_id = actor.require_user()?;
    get_user_details(db, actor, user_id).await
}

/// All users, newest registrations first.
pub async fn list_users(db: &DatabaseConnection, actor: Actor) -> Result<Vec<UserDetails>> {
    let users = User::find().order_by_desc(user::Column::Id).all(db).await?;
    let mut details = Vec::with_capacity(users.len());
    for user in users {
        details.push(user_details(db, actor, user).await?);
    }
    Ok(details)
}
