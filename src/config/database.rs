//! Database configuration module for Foodgram.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema (including composite primary keys and cascading foreign keys) always
//! matches the Rust structs. Tables are created parents first so foreign keys resolve.

use crate::entities::{
    Favorite, Ingredient, Recipe, RecipeIngredient, RecipeTag, ShoppingCart, Subscription, Tag,
    User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};

/// Default location of the `SQLite` database when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://foodgram.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    tracing::debug!("Connecting to database at {database_url}");
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table<E, C>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables if they do not exist yet.
///
/// Safe to call on every start-up; existing tables and data are left untouched.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Ingredient).await?;
    create_table(db, &schema, Tag).await?;
    create_table(db, &schema, Recipe).await?;
    create_table(db, &schema, RecipeIngredient).await?;
    create_table(db, &schema, RecipeTag).await?;
    create_table(db, &schema, Subscription).await?;
    create_table(db, &schema, Favorite).await?;
    create_table(db, &schema, ShoppingCart).await?;

    tracing::debug!("Database schema is up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        User::find().limit(1).all(&db).await?;
        Ingredient::find().limit(1).all(&db).await?;
        Tag::find().limit(1).all(&db).await?;
        Recipe::find().limit(1).all(&db).await?;
        RecipeIngredient::find().limit(1).all(&db).await?;
        RecipeTag::find().limit(1).all(&db).await?;
        Subscription::find().limit(1).all(&db).await?;
        Favorite::find().limit(1).all(&db).await?;
        ShoppingCart::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
