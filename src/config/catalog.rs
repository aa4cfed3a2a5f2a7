//! Catalog configuration loading from catalog.toml
//!
//! The catalog file lists the tags to seed and, optionally, a JSON file with
//! the ingredient reference data. Both are applied on start-up by
//! [`crate::core::tag::seed_tags`] and [`crate::core::ingredient::load_ingredients`].

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration structure representing the entire catalog.toml file
#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
    /// JSON file with `[{"name": ..., "measurement_unit": ...}]` entries
    #[serde(default)]
    pub ingredients_file: Option<PathBuf>,
    /// Tags to create when missing
    #[serde(default)]
    pub tags: Vec<TagConfig>,
}

/// Configuration for a single tag
#[derive(Debug, Deserialize, Clone)]
pub struct TagConfig {
    /// Display name of the tag
    pub name: String,
    /// Hex color in `#RRGGBB` form
    pub color: String,
    /// URL-safe identifier used for filtering
    pub slug: String,
}

/// Ingredient record as it appears in the seed JSON file
#[derive(Debug, Deserialize, Clone)]
pub struct IngredientSeed {
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
}

/// Loads the catalog configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let path = path.as_ref();
    tracing::debug!("Loading catalog configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file {path:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog file {path:?}: {e}"),
    })
}

/// Reads the ingredient seed list from a JSON file
///
/// # Errors
/// Returns an error if the file cannot be read or is not a JSON array of ingredients.
pub fn load_ingredient_seeds<P: AsRef<Path>>(path: P) -> Result<Vec<IngredientSeed>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read ingredients file {path:?}: {e}"),
    })?;
    serde_json::from_str(&contents).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_catalog_config() {
        let toml_str = r##"
            ingredients_file = "data/ingredients.json"

            [[tags]]
            name = "Breakfast"
            color = "#E26C2D"
            slug = "breakfast"

            [[tags]]
            name = "Dinner"
            color = "#49B64E"
            slug = "dinner"
        "##;

        let config: CatalogConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.ingredients_file.as_deref(),
            Some(Path::new("data/ingredients.json"))
        );
        assert_eq!(config.tags.len(), 2);
        assert_eq!(config.tags[0].slug, "breakfast");
        assert_eq!(config.tags[1].color, "#49B64E");
    }

    #[test]
    fn test_empty_catalog_is_valid() {
        let config: CatalogConfig = toml::from_str("").unwrap();
        assert!(config.ingredients_file.is_none());
        assert!(config.tags.is_empty());
    }

    #[test]
    fn test_missing_catalog_file() {
        let result = load_catalog("/nonexistent/catalog.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_ingredient_seeds() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "flour", "measurement_unit": "g"}}, {{"name": "milk", "measurement_unit": "ml"}}]"#
        )
        .unwrap();

        let seeds = load_ingredient_seeds(file.path()).unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[1].name, "milk");
        assert_eq!(seeds[1].measurement_unit, "ml");
    }
}
