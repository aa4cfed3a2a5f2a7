//! Recipe entity - The central aggregate of the application.
//!
//! A recipe row carries the scalar fields only. Ingredients (with amounts) and
//! tags hang off it through the `recipe_ingredients` and `recipe_tags` join
//! tables, and users point at it through favorites and shopping cart edges.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recipe database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    /// Unique identifier for the recipe
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Title shown in listings
    pub name: String,
    /// Path of the stored image relative to the media root, if one was uploaded
    pub image: Option<String>,
    /// Free-form description and cooking instructions
    pub text: String,
    /// Cooking time in minutes, at least 1
    pub cooking_time: i32,
    /// When the recipe was published
    pub created_at: DateTimeUtc,
    /// ID of the user who published the recipe
    pub author_id: i64,
}

/// Defines relationships between Recipe and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each recipe belongs to one author
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
    /// Ingredient join rows with amounts
    #[sea_orm(has_many = "super::recipe_ingredient::Entity")]
    RecipeIngredients,
    /// Tag join rows
    #[sea_orm(has_many = "super::recipe_tag::Entity")]
    RecipeTags,
    /// Users who marked the recipe as favorite
    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorites,
    /// Users who put the recipe into their shopping cart
    #[sea_orm(has_many = "super::shopping_cart::Entity")]
    ShoppingCarts,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::recipe_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeIngredients.def()
    }
}

impl Related<super::recipe_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeTags.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl Related<super::shopping_cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShoppingCarts.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::recipe_tag::Relation::Tag.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::recipe_tag::Relation::Recipe.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
