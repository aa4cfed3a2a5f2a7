//! Process-level settings read from the environment (and `.env` via `dotenvy`).

use std::path::PathBuf;

/// Runtime settings for the Foodgram service
#[derive(Debug, Clone)]
pub struct Settings {
    /// `SeaORM` connection string
    pub database_url: String,
    /// Directory uploaded recipe images are written to
    pub media_root: PathBuf,
    /// Path of the catalog TOML with seed tags and ingredients
    pub catalog_path: PathBuf,
}

impl Settings {
    /// Reads `DATABASE_URL`, `MEDIA_ROOT` and `CATALOG_PATH`, falling back to
    /// local defaults for anything unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            database_url: super::database::get_database_url(),
            media_root: std::env::var("MEDIA_ROOT")
                .map_or_else(|_| PathBuf::from("media"), PathBuf::from),
            catalog_path: std::env::var("CATALOG_PATH")
                .map_or_else(|_| PathBuf::from("catalog.toml"), PathBuf::from),
        }
    }
}
