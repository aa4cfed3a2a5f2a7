//! Recipe business logic - Creation, replacement, deletion and the read views.
//!
//! A recipe is persisted as one row plus its ingredient and tag join rows. Writes
//! go through a single database transaction: on update the old join rows are
//! cleared and the new set inserted, and any failure rolls the whole change back
//! so a recipe is never left without ingredients or tags.
//!
//! Reads produce [`RecipeDetails`], a denormalized view with resolved tags,
//! ingredient lines, the author profile and two flags computed for the acting
//! user.

use crate::{
    core::{
        Actor,
        collection::{self, Collection},
        media::MediaStore,
        user::{self, UserDetails},
        validation::{MAX_NAME_LENGTH, MIN_COOKING_TIME, validate_amount, validate_text},
    },
    entities::{
        Favorite, Ingredient, Recipe, RecipeIngredient, RecipeTag, ShoppingCart, Tag, favorite,
        ingredient, recipe, recipe_ingredient, recipe_tag, shopping_cart, tag,
    },
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, DatabaseTransaction, QueryOrder, QuerySelect, QueryTrait, Set,
    TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One ingredient reference in a recipe payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    /// Catalog id of the ingredient
    pub id: i64,
    /// Quantity in the ingredient's unit, `1..=2000`
    pub amount: i32,
}

/// Input for creating or fully replacing a recipe.
///
/// Updates are not partial: the ingredient and tag lists given here replace the
/// stored ones entirely. Only `image` may be omitted to keep the current file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecipeDraft {
    /// Title, at most 200 characters
    pub name: String,
    /// Free-form cooking instructions
    pub text: String,
    /// Minutes, at least one
    pub cooking_time: i32,
    /// Base64 data URI; `None` keeps the current image on update
    #[serde(default)]
    pub image: Option<String>,
    /// At least one entry, each ingredient id at most once
    pub ingredients: Vec<IngredientAmount>,
    /// Tag ids, at least one, no repeats
    pub tags: Vec<i64>,
}

/// Short recipe view used by collections and subscription listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    /// Path relative to the media root
    pub image: Option<String>,
    /// Minutes
    pub cooking_time: i32,
}

impl From<recipe::Model> for RecipeSummary {
    fn from(recipe: recipe::Model) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// An ingredient resolved against the catalog, with the recipe's amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientLine {
    /// Catalog id of the ingredient
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    /// Quantity this recipe uses
    pub amount: i32,
}

/// Full recipe view as seen by the acting user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeDetails {
    pub id: i64,
    pub tags: Vec<tag::Model>,
    pub author: UserDetails,
    pub ingredients: Vec<IngredientLine>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i32,
    pub created_at: DateTimeUtc,
}

/// Optional filters for [`list_recipes`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RecipeFilter {
    /// Only recipes by this author
    pub author: Option<i64>,
    /// Only recipes carrying at least one of these tag slugs
    pub tags: Vec<String>,
    /// Only the acting user's favorites (ignored for anonymous callers)
    pub is_favorited: bool,
    /// Only recipes in the acting user's shopping cart (ignored for anonymous callers)
    pub is_in_shopping_cart: bool,
}

/// Checks every field of a draft before anything is written.
///
/// # Errors
/// Returns [`Error::Validation`] for an empty name or text, a cooking time below
/// one minute, an empty or duplicated ingredient list, an amount outside
/// `1..=2000`, or an empty or duplicated tag list.
pub fn validate_draft(draft: &RecipeDraft) -> Result<()> {
    validate_text("Recipe name", &draft.name, MAX_NAME_LENGTH)?;
    if draft.text.trim().is_empty() {
        return Err(Error::validation("Recipe text cannot be empty"));
    }
    if draft.cooking_time < MIN_COOKING_TIME {
        return Err(Error::validation(format!(
            "Cooking time must be at least {MIN_COOKING_TIME} minute"
        )));
    }

    if draft.ingredients.is_empty() {
        return Err(Error::validation("A recipe needs at least one ingredient"));
    }
    let mut seen = HashSet::with_capacity(draft.ingredients.len());
    for item in &draft.ingredients {
        validate_amount(item.amount)?;
        if !seen.insert(item.id) {
            return Err(Error::validation(format!(
                "Ingredient {} is listed more than once",
                item.id
            )));
        }
    }

    if draft.tags.is_empty() {
        return Err(Error::validation("A recipe needs at least one tag"));
    }
    let mut seen = HashSet::with_capacity(draft.tags.len());
    for tag_id in &draft.tags {
        if !seen.insert(*tag_id) {
            return Err(Error::validation(format!(
                "Tag {tag_id} is listed more than once"
            )));
        }
    }

    Ok(())
}

/// Finds a recipe by id.
pub async fn get_recipe_by_id(
    db: &DatabaseConnection,
    recipe_id: i64,
) -> Result<Option<recipe::Model>> {
    Recipe::find_by_id(recipe_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a recipe by id, failing with [`Error::NotFound`] if absent.
pub async fn require_recipe(db: &DatabaseConnection, recipe_id: i64) -> Result<recipe::Model> {
    get_recipe_by_id(db, recipe_id)
        .await?
        .ok_or_else(|| Error::not_found("Recipe", recipe_id))
}

async fn ensure_references_exist<C>(db: &C, draft: &RecipeDraft) -> Result<()>
where
    C: ConnectionTrait,
{
    let ingredient_ids: Vec<i64> = draft.ingredients.iter().map(|i| i.id).collect();
    let found: HashSet<i64> = Ingredient::find()
        .filter(ingredient::Column::Id.is_in(ingredient_ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();
    if let Some(missing) = ingredient_ids.iter().find(|id| !found.contains(id)) {
        return Err(Error::not_found("Ingredient", missing));
    }

    let found: HashSet<i64> = Tag::find()
        .filter(tag::Column::Id.is_in(draft.tags.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();
    if let Some(missing) = draft.tags.iter().find(|id| !found.contains(id)) {
        return Err(Error::not_found("Tag", missing));
    }

    Ok(())
}

async fn insert_links(txn: &DatabaseTransaction, recipe_id: i64, draft: &RecipeDraft) -> Result<()> {
    let ingredient_rows = draft
        .ingredients
        .iter()
        .map(|item| recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(item.id),
            amount: Set(item.amount),
        });
    RecipeIngredient::insert_many(ingredient_rows)
        .exec_without_returning(txn)
        .await?;

    let tag_rows = draft.tags.iter().map(|tag_id| recipe_tag::ActiveModel {
        recipe_id: Set(recipe_id),
        tag_id: Set(*tag_id),
    });
    RecipeTag::insert_many(tag_rows)
        .exec_without_returning(txn)
        .await?;

    Ok(())
}

async fn clear_links(txn: &DatabaseTransaction, recipe_id: i64) -> Result<()> {
    RecipeIngredient::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(txn)
        .await?;
    RecipeTag::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
        .exec(txn)
        .await?;
    Ok(())
}

async fn insert_recipe(
    db: &DatabaseConnection,
    author_id: i64,
    draft: &RecipeDraft,
    image: Option<String>,
) -> Result<recipe::Model> {
    let txn = db.begin().await?;
    ensure_references_exist(&txn, draft).await?;

    let recipe = recipe::ActiveModel {
        name: Set(draft.name.trim().to_string()),
        image: Set(image),
        text: Set(draft.text.clone()),
        cooking_time: Set(draft.cooking_time),
        created_at: Set(chrono::Utc::now()),
        author_id: Set(author_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    insert_links(&txn, recipe.id, draft).await?;

    txn.commit().await?;
    Ok(recipe)
}

/// Publishes a new recipe by `author_id`.
///
/// The draft is validated first; the image (if any) is stored next; then the
/// recipe row and all join rows are written in one transaction. If the
/// transaction fails the stored image is removed again.
///
/// # Errors
/// - [`Error::Validation`] / [`Error::Image`] for bad input
/// - [`Error::NotFound`] if an ingredient or tag id does not exist
pub async fn create_recipe(
    db: &DatabaseConnection,
    media: &MediaStore,
    author_id: i64,
    draft: RecipeDraft,
) -> Result<recipe::Model> {
    if let Err(e) = validate_draft(&draft) {
        tracing::warn!(author_id, "Rejected recipe draft: {e}");
        return Err(e);
    }

    let image = match draft.image.as_deref() {
        Some(data_uri) => Some(media.save_recipe_image(data_uri).await?),
        None => None,
    };

    match insert_recipe(db, author_id, &draft, image.clone()).await {
        Ok(recipe) => {
            tracing::info!(recipe_id = recipe.id, author_id, "Created recipe {}", recipe.name);
            Ok(recipe)
        }
        Err(e) => {
            if let Some(path) = image {
                media.remove(&path).await;
            }
            Err(e)
        }
    }
}

async fn replace_recipe(
    db: &DatabaseConnection,
    existing: recipe::Model,
    draft: &RecipeDraft,
    image: Option<String>,
) -> Result<recipe::Model> {
    let recipe_id = existing.id;
    let txn = db.begin().await?;
    ensure_references_exist(&txn, draft).await?;

    let mut active: recipe::ActiveModel = existing.into();
    active.name = Set(draft.name.trim().to_string());
    active.text = Set(draft.text.clone());
    active.cooking_time = Set(draft.cooking_time);
    if image.is_some() {
        active.image = Set(image);
    }
    let updated = active.update(&txn).await?;

    clear_links(&txn, recipe_id).await?;
    insert_links(&txn, recipe_id, draft).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Replaces every field of a recipe, including its full ingredient and tag sets.
///
/// The image is only replaced when the draft carries one; the previous file is
/// deleted after a successful commit.
///
/// # Errors
/// Same as [`create_recipe`], plus [`Error::NotFound`] for an unknown recipe.
pub async fn update_recipe(
    db: &DatabaseConnection,
    media: &MediaStore,
    recipe_id: i64,
    draft: RecipeDraft,
) -> Result<recipe::Model> {
    validate_draft(&draft)?;
    let existing = require_recipe(db, recipe_id).await?;
    let old_image = existing.image.clone();

    let new_image = match draft.image.as_deref() {
        Some(data_uri) => Some(media.save_recipe_image(data_uri).await?),
        None => None,
    };

    match replace_recipe(db, existing, &draft, new_image.clone()).await {
        Ok(updated) => {
            if let (Some(_), Some(old)) = (&new_image, old_image) {
                media.remove(&old).await;
            }
            tracing::info!(recipe_id, "Updated recipe {}", updated.name);
            Ok(updated)
        }
        Err(e) => {
            if let Some(path) = new_image {
                media.remove(&path).await;
            }
            Err(e)
        }
    }
}

/// Deletes a recipe together with its join rows and every favorite and
/// shopping cart edge pointing at it.
pub async fn delete_recipe(
    db: &DatabaseConnection,
    media: &MediaStore,
    recipe_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;

    let recipe = Recipe::find_by_id(recipe_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Recipe", recipe_id))?;

    clear_links(&txn, recipe_id).await?;
    Favorite::delete_many()
        .filter(favorite::Column::RecipeId.eq(recipe_id))
        .exec(&txn)
        .await?;
    ShoppingCart::delete_many()
        .filter(shopping_cart::Column::RecipeId.eq(recipe_id))
        .exec(&txn)
        .await?;
    let image = recipe.image.clone();
    recipe.delete(&txn).await?;

    txn.commit().await?;

    if let Some(path) = image {
        media.remove(&path).await;
    }
    tracing::info!(recipe_id, "Deleted recipe");
    Ok(())
}

/// Ingredient lines of a recipe, ordered by ingredient name.
pub async fn ingredient_lines(
    db: &DatabaseConnection,
    recipe_id: i64,
) -> Result<Vec<IngredientLine>> {
    let rows = RecipeIngredient::find()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .find_also_related(Ingredient)
        .order_by_asc(ingredient::Column::Name)
        .all(db)
        .await?;

    rows.into_iter()
        .map(|(link, ingredient)| {
            let ingredient = ingredient.ok_or_else(|| {
                Error::Database(format!(
                    "Recipe {recipe_id} references missing ingredient {}",
                    link.ingredient_id
                ))
            })?;
            Ok(IngredientLine {
                id: ingredient.id,
                name: ingredient.name,
                measurement_unit: ingredient.measurement_unit,
                amount: link.amount,
            })
        })
        .collect()
}

/// Builds the full view of `recipe` for `actor`.
///
/// Tags come back ordered by name and ingredients by ingredient name. The
/// author profile and both membership flags are computed relative to `actor`;
/// an anonymous actor always sees `false` for them.
///
/// # Errors
/// Returns [`Error::NotFound`] if the author row has vanished, or a database error.
pub async fn recipe_details(
    db: &DatabaseConnection,
    actor: Actor,
    recipe: recipe::Model,
) -> Result<RecipeDetails> {
    let tags = recipe
        .find_related(Tag)
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await?;
    let ingredients = ingredient_lines(db, recipe.id).await?;
    let author = user::get_user_details(db, actor, recipe.author_id).await?;

    let (is_favorited, is_in_shopping_cart) = match actor.user_id() {
        Some(user_id) => (
            collection::contains(db, Collection::Favorites, user_id, recipe.id).await?,
            collection::contains(db, Collection::ShoppingCart, user_id, recipe.id).await?,
        ),
        None => (false, false),
    };

    Ok(RecipeDetails {
        id: recipe.id,
        tags,
        author,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
        created_at: recipe.created_at,
    })
}

/// Full view of a single recipe.
pub async fn get_recipe_details(
    db: &DatabaseConnection,
    actor: Actor,
    recipe_id: i64,
) -> Result<RecipeDetails> {
    let recipe = require_recipe(db, recipe_id).await?;
    recipe_details(db, actor, recipe).await
}

/// Lists recipes newest first, narrowed by `filter`.
///
/// Filters combine with AND. `tags` matches recipes carrying any of the given
/// slugs. The `is_favorited` and `is_in_shopping_cart` flags narrow to the
/// acting user's edges and are ignored for anonymous callers rather than
/// producing an empty list. Ties on `created_at` are broken by descending id.
pub async fn list_recipes(
    db: &DatabaseConnection,
    actor: Actor,
    filter: &RecipeFilter,
) -> Result<Vec<RecipeDetails>> {
    let mut query = Recipe::find()
        .order_by_desc(recipe::Column::CreatedAt)
        .order_by_desc(recipe::Column::Id);

    if let Some(author_id) = filter.author {
        query = query.filter(recipe::Column::AuthorId.eq(author_id));
    }

    if !filter.tags.is_empty() {
        let tagged = RecipeTag::find()
            .select_only()
            .column(recipe_tag::Column::RecipeId)
            .inner_join(Tag)
            .filter(tag::Column::Slug.is_in(filter.tags.clone()))
            .into_query();
        query = query.filter(recipe::Column::Id.in_subquery(tagged));
    }

    if let Some(user_id) = actor.user_id() {
        if filter.is_favorited {
            query = query.filter(
                recipe::Column::Id.in_subquery(Collection::Favorites.recipe_ids_of(user_id)),
            );
        }
        if filter.is_in_shopping_cart {
            query = query.filter(
                recipe::Column::Id.in_subquery(Collection::ShoppingCart.recipe_ids_of(user_id)),
            );
        }
    }

    let recipes = query.all(db).await?;
    tracing::debug!("Listing {} recipes", recipes.len());

    let mut details = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        details.push(recipe_details(db, actor, recipe).await?);
    }
    Ok(details)
}
