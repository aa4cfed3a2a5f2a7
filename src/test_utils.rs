//! Shared test utilities for Foodgram.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        ingredient,
        media::MediaStore,
        recipe::{self, IngredientAmount, RecipeDraft},
        tag,
        user::{self, NewUser},
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tempfile::TempDir;

/// A 1x1 transparent GIF as a data URI.
pub const TEST_IMAGE: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a user named `username` with an `@example.com` address.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    user::register_user(
        db,
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        },
    )
    .await
}

/// Creates a catalog ingredient.
pub async fn create_test_ingredient(
    db: &DatabaseConnection,
    name: &str,
    unit: &str,
) -> Result<entities::ingredient::Model> {
    ingredient::create_ingredient(db, name, unit).await
}

/// Creates a tag whose name and slug are both `slug` and whose color is
/// derived from the slug so that several test tags never collide.
pub async fn create_test_tag(db: &DatabaseConnection, slug: &str) -> Result<entities::tag::Model> {
    let hash = slug
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    let color = format!("#{:06X}", hash & 0x00FF_FFFF);
    tag::create_tag(db, slug, &color, slug).await
}

/// Builds a recipe draft from `(ingredient_id, amount)` pairs and tag ids.
#[must_use]
pub fn test_draft(name: &str, ingredients: &[(i64, i32)], tags: &[i64]) -> RecipeDraft {
    RecipeDraft {
        name: name.to_string(),
        text: format!("How to cook {name}"),
        cooking_time: 30,
        image: None,
        ingredients: ingredients
            .iter()
            .map(|&(id, amount)| IngredientAmount { id, amount })
            .collect(),
        tags: tags.to_vec(),
    }
}

/// Database plus a media store in a temporary directory.
pub struct TestEnv {
    /// Fresh in-memory database with every table created
    pub db: DatabaseConnection,
    /// Store writing into `_media_dir`
    pub media: MediaStore,
    // Deleted on drop, so it must outlive `media`
    _media_dir: TempDir,
}

impl TestEnv {
    pub async fn new() -> Result<Self> {
        let media_dir = tempfile::tempdir()?;
        Ok(Self {
            db: setup_test_db().await?,
            media: MediaStore::new(media_dir.path()),
            _media_dir: media_dir,
        })
    }
}

/// A complete scenario: an author with one "Pancakes" recipe
/// (flour 200 g, sugar 100 g, tagged `breakfast`) and a second user, the reader.
pub struct RecipeFixture {
    pub db: DatabaseConnection,
    pub media: MediaStore,
    /// Owner of `recipe`
    pub author: entities::user::Model,
    /// A second user with no recipes, edges or subscriptions yet
    pub reader: entities::user::Model,
    /// `flour`, measured in `g`
    pub flour: entities::ingredient::Model,
    /// `sugar`, measured in `g`
    pub sugar: entities::ingredient::Model,
    /// The `breakfast` tag
    pub tag: entities::tag::Model,
    /// "Pancakes": flour 200 g, sugar 100 g
    pub recipe: entities::recipe::Model,
    _media_dir: TempDir,
}

impl RecipeFixture {
    pub async fn new() -> Result<Self> {
        let TestEnv {
            db,
            media,
            _media_dir,
        } = TestEnv::new().await?;

        let author = create_test_user(&db, "author").await?;
        let reader = create_test_user(&db, "reader").await?;
        let flour = create_test_ingredient(&db, "flour", "g").await?;
        let sugar = create_test_ingredient(&db, "sugar", "g").await?;
        let tag = create_test_tag(&db, "breakfast").await?;
        let recipe = recipe::create_recipe(
            &db,
            &media,
            author.id,
            test_draft("Pancakes", &[(flour.id, 200), (sugar.id, 100)], &[tag.id]),
        )
        .await?;

        Ok(Self {
            db,
            media,
            author,
            reader,
            flour,
            sugar,
            tag,
            recipe,
            _media_dir,
        })
    }

    /// Publishes another recipe by the fixture's author using flour and the fixture tag.
    pub async fn another_recipe(&self, name: &str) -> Result<entities::recipe::Model> {
        recipe::create_recipe(
            &self.db,
            &self.media,
            self.author.id,
            test_draft(name, &[(self.flour.id, 10)], &[self.tag.id]),
        )
        .await
    }
}
