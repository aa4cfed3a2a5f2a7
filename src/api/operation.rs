//! Operation kinds and their dispatch to the core.
//!
//! Each request names exactly one [`Operation`]; [`dispatch`] matches on it once
//! and calls the corresponding core function with the acting user passed in
//! explicitly.

use crate::{
    api::{
        ApiContext,
        response::{Attachment, Reply, Response},
    },
    core::{
        Actor,
        collection::{self, Collection},
        ingredient,
        recipe::{self, RecipeDraft, RecipeFilter},
        shopping_list::{self, SHOPPING_LIST_FILENAME},
        subscription, tag,
        user::{self, NewUser},
    },
    errors::{Error, Result},
};
use serde::Deserialize;
use tracing::instrument;

/// Every operation the service exposes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    RegisterUser(NewUser),
    ListUsers,
    GetUser {
        id: i64,
    },
    Me,

    ListTags,
    GetTag {
        id: i64,
    },

    ListIngredients {
        /// Case-insensitive name prefix
        #[serde(default)]
        name: Option<String>,
    },
    GetIngredient {
        id: i64,
    },

    ListRecipes(RecipeFilter),
    GetRecipe {
        id: i64,
    },
    CreateRecipe(RecipeDraft),
    UpdateRecipe {
        id: i64,
        #[serde(flatten)]
        draft: RecipeDraft,
    },
    DeleteRecipe {
        id: i64,
    },

    AddFavorite {
        id: i64,
    },
    RemoveFavorite {
        id: i64,
    },
    ListFavorites,
    AddToShoppingCart {
        id: i64,
    },
    RemoveFromShoppingCart {
        id: i64,
    },
    DownloadShoppingCart,

    Subscribe {
        id: i64,
        #[serde(default)]
        recipes_limit: Option<String>,
    },
    Unsubscribe {
        id: i64,
    },
    ListSubscriptions {
        #[serde(default)]
        recipes_limit: Option<String>,
    },
}

impl Operation {
    /// Stable name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RegisterUser(_) => "register_user",
            Self::ListUsers => "list_users",
            Self::GetUser { .. } => "get_user",
            Self::Me => "me",
            Self::ListTags => "list_tags",
            Self::GetTag { .. } => "get_tag",
            Self::ListIngredients { .. } => "list_ingredients",
            Self::GetIngredient { .. } => "get_ingredient",
            Self::ListRecipes(_) => "list_recipes",
            Self::GetRecipe { .. } => "get_recipe",
            Self::CreateRecipe(_) => "create_recipe",
            Self::UpdateRecipe { .. } => "update_recipe",
            Self::DeleteRecipe { .. } => "delete_recipe",
            Self::AddFavorite { .. } => "add_favorite",
            Self::RemoveFavorite { .. } => "remove_favorite",
            Self::ListFavorites => "list_favorites",
            Self::AddToShoppingCart { .. } => "add_to_shopping_cart",
            Self::RemoveFromShoppingCart { .. } => "remove_from_shopping_cart",
            Self::DownloadShoppingCart => "download_shopping_cart",
            Self::Subscribe { .. } => "subscribe",
            Self::Unsubscribe { .. } => "unsubscribe",
            Self::ListSubscriptions { .. } => "list_subscriptions",
        }
    }
}

/// Checks that an authenticated actor refers to an existing account.
async fn resolve_actor(ctx: &ApiContext, actor: Actor) -> Result<Actor> {
    if let Some(user_id) = actor.user_id() {
        if user::get_user_by_id(&ctx.db, user_id).await?.is_none() {
            tracing::warn!(user_id, "Request from unknown user");
            return Err(Error::AuthenticationRequired);
        }
    }
    Ok(actor)
}

async fn execute(ctx: &ApiContext, actor: Actor, operation: Operation) -> Result<Response> {
    let db = &ctx.db;
    let actor = resolve_actor(ctx, actor).await?;

    let response = match operation {
        Operation::RegisterUser(new_user) => {
            let created = user::register_user(db, new_user).await?;
            Response::created(Reply::User(user::user_details(db, actor, created).await?))
        }
        Operation::ListUsers => Response::ok(Reply::Users(user::list_users(db, actor).await?)),
        Operation::GetUser { id } => {
            Response::ok(Reply::User(user::get_user_details(db, actor, id).await?))
        }
        Operation::Me => Response::ok(Reply::User(user::me(db, actor).await?)),

        Operation::ListTags => Response::ok(Reply::Tags(tag::list_tags(db).await?)),
        Operation::GetTag { id } => Response::ok(Reply::Tag(tag::get_tag_by_id(db, id).await?)),

        Operation::ListIngredients { name } => Response::ok(Reply::Ingredients(
            ingredient::search_ingredients(db, name.as_deref()).await?,
        )),
        Operation::GetIngredient { id } => Response::ok(Reply::Ingredient(
            ingredient::get_ingredient_by_id(db, id).await?,
        )),

        Operation::ListRecipes(filter) => {
            Response::ok(Reply::Recipes(recipe::list_recipes(db, actor, &filter).await?))
        }
        Operation::GetRecipe { id } => Response::ok(Reply::Recipe(Box::new(
            recipe::get_recipe_details(db, actor, id).await?,
        ))),
        Operation::CreateRecipe(draft) => {
            let author_id = actor.require_user()?;
            let created = recipe::create_recipe(db, &ctx.media, author_id, draft).await?;
            Response::created(Reply::Recipe(Box::new(
                recipe::recipe_details(db, actor, created).await?,
            )))
        }
        Operation::UpdateRecipe { id, draft } => {
            actor.require_user()?;
            let updated = recipe::update_recipe(db, &ctx.media, id, draft).await?;
            Response::ok(Reply::Recipe(Box::new(
                recipe::recipe_details(db, actor, updated).await?,
            )))
        }
        Operation::DeleteRecipe { id } => {
            actor.require_user()?;
            recipe::delete_recipe(db, &ctx.media, id).await?;
            Response::no_content()
        }

        Operation::AddFavorite { id } => {
            let user_id = actor.require_user()?;
            Response::created(Reply::RecipeSummary(
                collection::add_recipe(db, Collection::Favorites, user_id, id).await?,
            ))
        }
        Operation::RemoveFavorite { id } => {
            let user_id = actor.require_user()?;
            collection::remove_recipe(db, Collection::Favorites, user_id, id).await?;
            Response::no_content()
        }
        Operation::ListFavorites => {
            let user_id = actor.require_user()?;
            Response::ok(Reply::RecipeSummaries(
                collection::list_recipes(db, Collection::Favorites, user_id).await?,
            ))
        }
        Operation::AddToShoppingCart { id } => {
            let user_id = actor.require_user()?;
            Response::created(Reply::RecipeSummary(
                collection::add_recipe(db, Collection::ShoppingCart, user_id, id).await?,
            ))
        }
        Operation::RemoveFromShoppingCart { id } => {
            let user_id = actor.require_user()?;
            collection::remove_recipe(db, Collection::ShoppingCart, user_id, id).await?;
            Response::no_content()
        }
        Operation::DownloadShoppingCart => {
            let user_id = actor.require_user()?;
            let list = shopping_list::export_shopping_list(db, user_id).await?;
            Response::ok(Reply::Attachment(Attachment {
                filename: SHOPPING_LIST_FILENAME.to_string(),
                content_type: "text/plain".to_string(),
                content: list.render(),
            }))
        }

        Operation::Subscribe { id, recipes_limit } => {
            let user_id = actor.require_user()?;
            Response::created(Reply::Author(Box::new(
                subscription::subscribe(db, user_id, id, recipes_limit.as_deref()).await?,
            )))
        }
        Operation::Unsubscribe { id } => {
            let user_id = actor.require_user()?;
            subscription::unsubscribe(db, user_id, id).await?;
            Response::no_content()
        }
        Operation::ListSubscriptions { recipes_limit } => {
            let user_id = actor.require_user()?;
            Response::ok(Reply::Authors(
                subscription::list_subscriptions(db, user_id, recipes_limit.as_deref()).await?,
            ))
        }
    };

    Ok(response)
}

/// Runs one operation on behalf of `actor` and converts the outcome to a response.
#[instrument(skip(ctx, operation), fields(op = operation.name(), actor = ?actor))]
pub async fn dispatch(ctx: &ApiContext, actor: Actor, operation: Operation) -> Response {
    match execute(ctx, actor, operation).await {
        Ok(response) => {
            tracing::debug!(status = response.status, "Operation completed");
            response
        }
        Err(e) => Response::from_error(&e),
    }
}
