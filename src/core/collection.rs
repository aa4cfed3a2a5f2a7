//! Per-user recipe collections - favorites and the shopping cart.
//!
//! Both are `(user_id, recipe_id)` membership edges with identical rules, so
//! they share one implementation keyed by [`Collection`]. The existence check
//! gives a readable error; the composite primary key catches the races that
//! slip past it, and `From<DbErr>` turns those into the same
//! [`Error::AlreadyExists`].

use crate::{
    core::recipe::{RecipeSummary, require_recipe},
    entities::{Favorite, Recipe, ShoppingCart, favorite, recipe, shopping_cart},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, QueryTrait, Set, prelude::*, sea_query::SelectStatement};
use serde::{Deserialize, Serialize};

/// Which membership edge set an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Recipes the user marked as favorite
    Favorites,
    /// Recipes whose ingredients go on the user's shopping list
    ShoppingCart,
}

impl Collection {
    /// Human-readable name used in error messages
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingCart => "shopping cart",
        }
    }

    /// Sub-select of the recipe ids `user_id` has in this collection.
    #[must_use]
    pub fn recipe_ids_of(self, user_id: i64) -> SelectStatement {
        match self {
            Self::Favorites => Favorite::find()
                .select_only()
                .column(favorite::Column::RecipeId)
                .filter(favorite::Column::UserId.eq(user_id))
                .into_query(),
            Self::ShoppingCart => ShoppingCart::find()
                .select_only()
                .column(shopping_cart::Column::RecipeId)
                .filter(shopping_cart::Column::UserId.eq(user_id))
                .into_query(),
        }
    }
}

/// Whether `recipe_id` is in the user's collection.
pub async fn contains(
    db: &DatabaseConnection,
    collection: Collection,
    user_id: i64,
    recipe_id: i64,
) -> Result<bool> {
    let found = match collection {
        Collection::Favorites => Favorite::find_by_id((user_id, recipe_id))
            .one(db)
            .await?
            .is_some(),
        Collection::ShoppingCart => ShoppingCart::find_by_id((user_id, recipe_id))
            .one(db)
            .await?
            .is_some(),
    };
    Ok(found)
}

/// Adds a recipe to the user's collection and returns its short view.
///
/// # Errors
/// - [`Error::NotFound`] if the recipe does not exist
/// - [`Error::AlreadyExists`] if the recipe is already in the collection
pub async fn add_recipe(
    db: &DatabaseConnection,
    collection: Collection,
    user_id: i64,
    recipe_id: i64,
) -> Result<RecipeSummary> {
    let recipe = require_recipe(db, recipe_id).await?;

    if contains(db, collection, user_id, recipe_id).await? {
        return Err(Error::AlreadyExists {
            message: format!("Recipe {recipe_id} is already in your {}", collection.label()),
        });
    }

    match collection {
        Collection::Favorites => {
            Favorite::insert(favorite::ActiveModel {
                user_id: Set(user_id),
                recipe_id: Set(recipe_id),
            })
            .exec_without_returning(db)
            .await?;
        }
        Collection::ShoppingCart => {
            ShoppingCart::insert(shopping_cart::ActiveModel {
                user_id: Set(user_id),
                recipe_id: Set(recipe_id),
            })
            .exec_without_returning(db)
            .await?;
        }
    }

    tracing::info!(user_id, recipe_id, "Added recipe to {}", collection.label());
    Ok(RecipeSummary::from(recipe))
}

/// Removes a recipe from the user's collection.
///
/// # Errors
/// Returns [`Error::NotFound`] if the recipe was not in the collection.
pub async fn remove_recipe(
    db: &DatabaseConnection,
    collection: Collection,
    user_id: i64,
    recipe_id: i64,
) -> Result<()> {
    let deleted = match collection {
        Collection::Favorites => Favorite::delete_by_id((user_id, recipe_id)).exec(db).await?,
        Collection::ShoppingCart => {
            ShoppingCart::delete_by_id((user_id, recipe_id))
                .exec(db)
                .await?
        }
    };

    if deleted.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Recipe",
            id: format!("{recipe_id} in your {}", collection.label()),
        });
    }

    tracing::info!(user_id, recipe_id, "Removed recipe from {}", collection.label());
    Ok(())
}

/// Recipes in the user's collection, ordered by id.
pub async fn list_recipes(
    db: &DatabaseConnection,
    collection: Collection,
    user_id: i64,
) -> Result<Vec<RecipeSummary>> {
    let recipes = Recipe::find()
        .filter(recipe::Column::Id.in_subquery(collection.recipe_ids_of(user_id)))
        .order_by_asc(recipe::Column::Id)
        .all(db)
        .await?;
    Ok(recipes.into_iter().map(RecipeSummary::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_add_and_remove_favorite() -> Result<()> {
        let fixture = RecipeFixture::new().await?;
        let db = &fixture.db;

        let summary = add_recipe(db, Collection::Favorites, fixture.reader.id, fixture.recipe.id).await?;
        assert_eq!(summary.id, fixture.recipe.id);
        assert_eq!(summary.name, fixture.recipe.name);
        assert!(contains(db, Collection::Favorites, fixture.reader.id, fixture.recipe.id).await?);
        // Collections are independent
        assert!(!contains(db, Collection::ShoppingCart, fixture.reader.id, fixture.recipe.id).await?);

        remove_recipe(db, Collection::Favorites, fixture.reader.id, fixture.recipe.id).await?;
        assert!(!contains(db, Collection::Favorites, fixture.reader.id, fixture.recipe.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_adding_twice_is_already_exists() -> Result<()> {
        let fixture = RecipeFixture::new().await?;
        let db = &fixture.db;

        for collection in [Collection::Favorites, Collection::ShoppingCart] {
            add_recipe(db, collection, fixture.reader.id, fixture.recipe.id).await?;
            let second = add_recipe(db, collection, fixture.reader.id, fixture.recipe.id).await;
            assert!(matches!(second, Err(Error::AlreadyExists { .. })));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_storage_constraint_maps_to_already_exists() -> Result<()> {
        let fixture = RecipeFixture::new().await?;
        let db = &fixture.db;
        add_recipe(db, Collection::ShoppingCart, fixture.reader.id, fixture.recipe.id).await?;

        // Bypass the application check, as a concurrent request would
        let raced: Result<_> = ShoppingCart::insert(shopping_cart::ActiveModel {
            user_id: Set(fixture.reader.id),
            recipe_id: Set(fixture.recipe.id),
        })
        .exec_without_returning(db)
        .await
        .map_err(Into::into);
        assert!(matches!(raced, Err(Error::AlreadyExists { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_removing_missing_edge_is_not_found() -> Result<()> {
        let fixture = RecipeFixture::new().await?;
        let db = &fixture.db;

        for collection in [Collection::Favorites, Collection::ShoppingCart] {
            let result = remove_recipe(db, collection, fixture.reader.id, fixture.recipe.id).await;
            assert!(matches!(result, Err(Error::NotFound { .. })));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_add_missing_recipe_is_not_found() -> Result<()> {
        let fixture = RecipeFixture::new().await?;
        let result = add_recipe(&fixture.db, Collection::Favorites, fixture.reader.id, 999).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_recipes_in_collection() -> Result<()> {
        let fixture = RecipeFixture::new().await?;
        let db = &fixture.db;
        let second = fixture.another_recipe("Omelette").await?;

        add_recipe(db, Collection::ShoppingCart, fixture.reader.id, second.id).await?;
        add_recipe(db, Collection::ShoppingCart, fixture.reader.id, fixture.recipe.id).await?;

        let listed = list_recipes(db, Collection::ShoppingCart, fixture.reader.id).await?;
        let ids: Vec<i64> = listed.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![fixture.recipe.id, second.id]);

        assert!(list_recipes(db, Collection::Favorites, fixture.reader.id).await?.is_empty());
        Ok(())
    }
}
