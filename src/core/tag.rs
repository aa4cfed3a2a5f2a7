//! Tag catalog - Listing, creation with format checks, and seeding from config.

use crate::{
    config::catalog::TagConfig,
    core::validation::{MAX_NAME_LENGTH, validate_color, validate_slug, validate_text},
    entities::{Tag, tag},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves all tags ordered by name.
pub async fn list_tags(db: &DatabaseConnection) -> Result<Vec<tag::Model>> {
    Tag::find()
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a tag by id.
pub async fn get_tag_by_id(db: &DatabaseConnection, tag_id: i64) -> Result<tag::Model> {
    Tag::find_by_id(tag_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Tag", tag_id))
}

/// Finds a tag by slug, returning None if not found.
pub async fn get_tag_by_slug(db: &DatabaseConnection, slug: &str) -> Result<Option<tag::Model>> {
    Tag::find()
        .filter(tag::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new tag.
///
/// Name, color and slug are each unique; a clash is reported by the storage
/// constraint and surfaces as [`Error::AlreadyExists`].
pub async fn create_tag(
    db: &DatabaseConnection,
    name: &str,
    color: &str,
    slug: &str,
) -> Result<tag::Model> {
    validate_text("Tag name", name, MAX_NAME_LENGTH)?;
    validate_color(color)?;
    validate_slug(slug)?;

    let tag = tag::ActiveModel {
        name: Set(name.trim().to_string()),
        color: Set(color.to_string()),
        slug: Set(slug.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(tag_id = tag.id, "Created tag {}", tag.slug);
    Ok(tag)
}

/// Creates every configured tag whose slug is not present yet.
///
/// Returns the number of tags created.
pub async fn seed_tags(db: &DatabaseConnection, tags: &[TagConfig]) -> Result<usize> {
    let mut created = 0;
    for config in tags {
        if get_tag_by_slug(db, &config.slug).await?.is_some() {
            tracing::debug!("Tag {} already exists, skipping", config.slug);
            continue;
        }
        create_tag(db, &config.name, &config.color, &config.slug).await?;
        created += 1;
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_tag_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_tag(&db, "", "#FFFFFF", "empty").await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_tag(&db, "Lunch", "white", "lunch").await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_tag(&db, "Lunch", "#FFFFFF", "lunch time").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[tokio::test]
    async fn test_list_tags_ordered_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_tag(&db, "Lunch", "#00FF00", "lunch").await?;
        create_tag(&db, "Breakfast", "#FF0000", "breakfast").await?;
        create_tag(&db, "Dinner", "#0000FF", "dinner").await?;

        let names: Vec<String> = list_tags(&db).await?.into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Breakfast", "Dinner", "Lunch"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_tag_fields_are_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_tag(&db, "Lunch", "#00FF00", "lunch").await?;

        let same_slug = create_tag(&db, "Brunch", "#00FF01", "lunch").await;
        assert!(matches!(same_slug, Err(Error::AlreadyExists { .. })));

        let same_color = create_tag(&db, "Brunch", "#00FF00", "brunch").await;
        assert!(matches!(same_color, Err(Error::AlreadyExists { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_tags_skips_existing() -> Result<()> {
        let db = setup_test_db().await?;
        let configs = vec![
            TagConfig {
                name: "Breakfast".to_string(),
                color: "#E26C2D".to_string(),
                slug: "breakfast".to_string(),
            },
            TagConfig {
                name: "Dinner".to_string(),
                color: "#49B64E".to_string(),
                slug: "dinner".to_string(),
            },
        ];

        assert_eq!(seed_tags(&db, &configs).await?, 2);
        assert_eq!(seed_tags(&db, &configs).await?, 0);
        assert_eq!(list_tags(&db).await?.len(), 2);

        let tag = get_tag_by_slug(&db, "dinner").await?;
        assert_eq!(tag.map(|t| t.color), Some("#49B64E".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_tag_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(matches!(
            get_tag_by_id(&db, 1).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }
}
