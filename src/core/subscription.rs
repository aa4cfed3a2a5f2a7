//! Subscriptions - Directed follow edges between users and the author listing.
//!
//! The listing nests each author's newest recipes, optionally capped by a
//! client-supplied `recipes_limit`, while `recipes_count` always reports the
//! author's full total.

use crate::{
    core::{
        Actor,
        recipe::RecipeSummary,
        user::{self, UserDetails},
    },
    entities::{Recipe, Subscription, User, recipe, subscription, user as user_entity},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, QueryTrait, Set, prelude::*};
use serde::Serialize;

/// An author as shown in the follower's subscription list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorDetails {
    #[serde(flatten)]
    pub user: UserDetails,
    /// Newest recipes first, capped by `recipes_limit`
    pub recipes: Vec<RecipeSummary>,
    /// Total number of recipes by the author, regardless of the cap
    pub recipes_count: u64,
}

/// Largest limit passed to the database; SQLite binds `LIMIT` as a signed
/// 64-bit integer.
const MAX_RECIPES_LIMIT: u64 = i64::MAX.unsigned_abs();

/// Parses the raw `recipes_limit` parameter.
///
/// Absent or blank means "no limit". Any non-negative integer is accepted;
/// values beyond what the database can bind are clamped, which returns every
/// recipe just like an unbounded listing.
///
/// # Errors
/// Returns [`Error::Validation`] unless the value is a non-negative integer.
pub fn parse_recipes_limit(raw: Option<&str>) -> Result<Option<u64>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<u64>()
        .map(|limit| Some(limit.min(MAX_RECIPES_LIMIT)))
        .map_err(|_| {
            Error::validation(format!(
                "recipes_limit must be a non-negative integer, got '{raw}'"
            ))
        })
}

/// Builds the subscription view of `author`.
pub async fn author_details(
    db: &DatabaseConnection,
    actor: Actor,
    author: user_entity::Model,
    recipes_limit: Option<u64>,
) -> Result<AuthorDetails> {
    let authored = Recipe::find()
        .filter(recipe::Column::AuthorId.eq(author.id))
        .order_by_desc(recipe::Column::CreatedAt)
        .order_by_desc(recipe::Column::Id);

    let recipes_count = authored.clone().count(db).await?;
    let recipes = match recipes_limit {
        Some(limit) => authored.limit(limit).all(db).await?,
        None => authored.all(db).await?,
    };

    Ok(AuthorDetails {
        user: user::user_details(db, actor, author).await?,
        recipes: recipes.into_iter().map(RecipeSummary::from).collect(),
        recipes_count,
    })
}

/// Makes `user_id` follow `author_id` and returns the author's view.
///
/// # Errors
/// - [`Error::Validation`] for a malformed `recipes_limit`
/// - [`Error::SelfReferenceNotAllowed`] when both ids are equal
/// - [`Error::NotFound`] if the author does not exist
/// - [`Error::AlreadyExists`] if the subscription exists
pub async fn subscribe(
    db: &DatabaseConnection,
    user_id: i64,
    author_id: i64,
    recipes_limit: Option<&str>,
) -> Result<AuthorDetails> {
    let recipes_limit = parse_recipes_limit(recipes_limit)?;
    if user_id == author_id {
        return Err(Error::SelfReferenceNotAllowed);
    }
    let author = user::require_user(db, author_id).await?;

    if Subscription::find_by_id((user_id, author_id))
        .one(db)
        .await?
        .is_some()
    {
        return Err(Error::AlreadyExists {
            message: format!("You are already subscribed to {}", author.username),
        });
    }

    Subscription::insert(subscription::ActiveModel {
        user_id: Set(user_id),
        author_id: Set(author_id),
    })
    .exec_without_returning(db)
    .await?;

    tracing::info!(user_id, author_id, "Subscribed to {}", author.username);
    author_details(db, Actor::User(user_id), author, recipes_limit).await
}

/// Removes the subscription of `user_id` to `author_id`.
///
/// # Errors
/// Returns [`Error::NotFound`] if the author or the subscription does not exist.
pub async fn unsubscribe(db: &DatabaseConnection, user_id: i64, author_id: i64) -> Result<()> {
    user::require_user(db, author_id).await?;

    let deleted = Subscription::delete_by_id((user_id, author_id))
        .exec(db)
        .await?;
    if deleted.rows_affected == 0 {
        return Err(Error::not_found("Subscription to user", author_id));
    }

    tracing::info!(user_id, author_id, "Unsubscribed");
    Ok(())
}

/// Authors `user_id` follows, ordered by id, each with nested recipes.
pub async fn list_subscriptions(
    db: &DatabaseConnection,
    user_id: i64,
    recipes_limit: Option<&str>,
) -> Result<Vec<AuthorDetails>> {
    let recipes_limit = parse_recipes_limit(recipes_limit)?;

    let followed = Subscription::find()
        .select_only()
        .column(subscription::Column::AuthorId)
        .filter(subscription::Column::UserId.eq(user_id))
        .into_query();
    let authors = User::find()
        .filter(user_entity::Column::Id.in_subquery(followed))
        .order_by_asc(user_entity::Column::Id)
        .all(db)
        .await?;

    let mut details = Vec::with_capacity(authors.len());
    for author in authors {
        details.push(author_details(db, Actor::User(user_id), author, recipes_limit).await?);
    }
    Ok(details)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_parse_recipes_limit() {
        assert_eq!(parse_recipes_limit(None).unwrap(), None);
        assert_eq!(parse_recipes_limit(Some("")).unwrap(), None);
        assert_eq!(parse_recipes_limit(Some("3")).unwrap(), Some(3));
        assert_eq!(parse_recipes_limit(Some(" 0 ")).unwrap(), Some(0));
        assert!(matches!(
            parse_recipes_limit(Some("-1")),
            Err(Error::Validation { .. })
        ));
        assert!(parse_recipes_limit(Some("two")).is_err());
        assert!(parse_recipes_limit(Some("1.5")).is_err());
        assert_eq!(
            parse_recipes_limit(Some("18446744073709551615")).unwrap(),
            Some(i64::MAX.unsigned_abs())
        );
    }

    #[tokio::test]
    async fn test_subscribe_and_unsubscribe() -> Result<()> {
        let env = TestEnv::new().await?;
        let anna = create_test_user(&env.db, "anna").await?;
        let boris = create_test_user(&env.db, "boris").await?;

        let view = subscribe(&env.db, anna.id, boris.id, None).await?;
        assert_eq!(view.user.id, boris.id);
        assert!(view.user.is_subscribed);
        assert_eq!(view.recipes_count, 0);

        let again = subscribe(&env.db, anna.id, boris.id, None).await;
        assert!(matches!(again, Err(Error::AlreadyExists { .. })));

        unsubscribe(&env.db, anna.id, boris.id).await?;
        let again = unsubscribe(&env.db, anna.id, boris.id).await;
        assert!(matches!(again, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_self_subscription_is_rejected() -> Result<()> {
        let env = TestEnv::new().await?;
        let anna = create_test_user(&env.db, "anna").await?;

        let result = subscribe(&env.db, anna.id, anna.id, None).await;
        assert!(matches!(result, Err(Error::SelfReferenceNotAllowed)));
        assert!(list_subscriptions(&env.db, anna.id, None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_subscribe_to_missing_author() -> Result<()> {
        let env = TestEnv::new().await?;
        let anna = create_test_user(&env.db, "anna").await?;

        let result = subscribe(&env.db, anna.id, 999, None).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_recipes_limit_caps_nested_recipes_only() -> Result<()> {
        let fixture = RecipeFixture::new().await?;
        let db = &fixture.db;
        for name in ["Soup", "Salad", "Stew", "Pie"] {
            fixture.another_recipe(name).await?;
        }

        subscribe(db, fixture.reader.id, fixture.author.id, None).await?;

        let listed = list_subscriptions(db, fixture.reader.id, Some("2")).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].recipes.len(), 2);
        assert_eq!(listed[0].recipes_count, 5);
        assert_eq!(listed[0].recipes[0].name, "Pie");

        let unlimited = list_subscriptions(db, fixture.reader.id, None).await?;
        assert_eq!(unlimited[0].recipes.len(), 5);

        for huge in ["9223372036854775808", "18446744073709551615"] {
            let listed = list_subscriptions(db, fixture.reader.id, Some(huge)).await?;
            assert_eq!(listed[0].recipes.len(), 5);
            assert_eq!(listed[0].recipes_count, 5);
        }

        let bad = list_subscriptions(db, fixture.reader.id, Some("abc")).await;
        assert!(matches!(bad, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_subscriptions_only_own_edges() -> Result<()> {
        let env = TestEnv::new().await?;
        let anna = create_test_user(&env.db, "anna").await?;
        let boris = create_test_user(&env.db, "boris").await?;
        let clara = create_test_user(&env.db, "clara").await?;

        subscribe(&env.db, anna.id, clara.id, None).await?;
        subscribe(&env.db, anna.id, boris.id, None).await?;
        subscribe(&env.db, boris.id, anna.id, None).await?;

        let ids: Vec<i64> = list_subscriptions(&env.db, anna.id, None)
            .await?
            .iter()
            .map(|a| a.user.id)
            .collect();
        assert_eq!(ids, vec![boris.id, clara.id]);
        Ok(())
    }
}
