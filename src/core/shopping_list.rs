//! Shopping list export.
//!
//! Sums the ingredient amounts of every recipe in a user's shopping cart,
//! grouped by ingredient name and measurement unit, in a single aggregate query.

use crate::{
    core::collection::Collection,
    entities::{RecipeIngredient, ingredient, recipe_ingredient},
    errors::Result,
};
use sea_orm::{
    FromQueryResult, JoinType, QueryOrder, QuerySelect, RelationTrait, prelude::*,
    sea_query::Expr,
};
use serde::Serialize;
use std::fmt::Write as _;

/// File name the export is offered under
pub const SHOPPING_LIST_FILENAME: &str = "shopping_cart.txt";

/// One aggregated line of the shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Aggregated ingredient totals for one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShoppingList {
    pub items: Vec<ShoppingListItem>,
}

impl ShoppingList {
    /// Renders one `"<name> - <amount> <unit>"` line per item.
    ///
    /// An empty list renders as an empty string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            // Writing to a String cannot fail
            let _ = writeln!(out, "{} - {} {}", item.name, item.amount, item.measurement_unit);
        }
        out
    }
}

/// Builds the shopping list for `user_id`.
///
/// Items are sorted by ingredient name, then unit. A user with an empty cart
/// gets an empty list.
pub async fn export_shopping_list(db: &DatabaseConnection, user_id: i64) -> Result<ShoppingList> {
    let items = RecipeIngredient::find()
        .select_only()
        .column_as(ingredient::Column::Name, "name")
        .column_as(ingredient::Column::MeasurementUnit, "measurement_unit")
        .column_as(
            Expr::col((RecipeIngredient, recipe_ingredient::Column::Amount)).sum(),
            "amount",
        )
        .join(
            JoinType::InnerJoin,
            recipe_ingredient::Relation::Ingredient.def(),
        )
        .filter(
            recipe_ingredient::Column::RecipeId
                .in_subquery(Collection::ShoppingCart.recipe_ids_of(user_id)),
        )
        .group_by(ingredient::Column::Name)
        .group_by(ingredient::Column::MeasurementUnit)
        .order_by_asc(ingredient::Column::Name)
        .order_by_asc(ingredient::Column::MeasurementUnit)
        .into_model::<ShoppingListItem>()
        .all(db)
        .await?;

    tracing::debug!(user_id, "Exported shopping list with {} items", items.len());
    Ok(ShoppingList { items })
}
