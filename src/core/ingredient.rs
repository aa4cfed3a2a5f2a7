//! Ingredient catalog - Lookups, prefix search and bulk seeding.

use crate::{
    config::catalog::IngredientSeed,
    core::validation::{MAX_NAME_LENGTH, validate_text},
    entities::{Ingredient, ingredient},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};

// Keeps each multi-row INSERT well below SQLite's bound-parameter limit.
const SEED_BATCH_SIZE: usize = 500;

/// Lists ingredients ordered by name, optionally restricted to names starting
/// with `prefix` (case-insensitive).
///
/// Matching happens in Rust rather than with `LIKE` because `SQLite` only folds
/// ASCII case, and ingredient names are often not ASCII.
pub async fn search_ingredients(
    db: &DatabaseConnection,
    prefix: Option<&str>,
) -> Result<Vec<ingredient::Model>> {
    let ingredients = Ingredient::find()
        .order_by_asc(ingredient::Column::Name)
        .order_by_asc(ingredient::Column::Id)
        .all(db)
        .await?;

    let prefix = prefix.map(str::trim).filter(|p| !p.is_empty());
    let Some(prefix) = prefix else {
        return Ok(ingredients);
    };

    let prefix_lower = prefix.to_lowercase();
    Ok(ingredients
        .into_iter()
        .filter(|i| i.name.to_lowercase().starts_with(&prefix_lower))
        .collect())
}

/// Finds an ingredient by id.
pub async fn get_ingredient_by_id(
    db: &DatabaseConnection,
    ingredient_id: i64,
) -> Result<ingredient::Model> {
    Ingredient::find_by_id(ingredient_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Ingredient", ingredient_id))
}

/// Adds a single ingredient to the catalog.
pub async fn create_ingredient(
    db: &DatabaseConnection,
    name: &str,
    measurement_unit: &str,
) -> Result<ingredient::Model> {
    validate_text("Ingredient name", name, MAX_NAME_LENGTH)?;
    validate_text("Measurement unit", measurement_unit, MAX_NAME_LENGTH)?;

    let ingredient = ingredient::ActiveModel {
        name: Set(name.trim().to_string()),
        measurement_unit: Set(measurement_unit.trim().to_string()),
        ..Default::default()
    };
    ingredient.insert(db).await.map_err(Into::into)
}

/// Seeds the catalog from `seeds` in a single transaction.
///
/// Does nothing when the catalog already has entries, so it can run on every
/// start-up. Returns the number of inserted ingredients.
pub async fn load_ingredients(db: &DatabaseConnection, seeds: &[IngredientSeed]) -> Result<usize> {
    if Ingredient::find().count(db).await? > 0 {
        tracing::info!("Ingredient catalog already populated, skipping seed");
        return Ok(0);
    }

    for seed in seeds {
        validate_text("Ingredient name", &seed.name, MAX_NAME_LENGTH)?;
        validate_text("Measurement unit", &seed.measurement_unit, MAX_NAME_LENGTH)?;
    }

    let txn = db.begin().await?;
    for batch in seeds.chunks(SEED_BATCH_SIZE) {
        let rows = batch.iter().map(|seed| ingredient::ActiveModel {
            name: Set(seed.name.trim().to_string()),
            measurement_unit: Set(seed.measurement_unit.trim().to_string()),
            ..Default::default()
        });
        Ingredient::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
    }
    txn.commit().await?;

    tracing::info!("Loaded {} ingredients into the catalog", seeds.len());
    Ok(seeds.len())
}
