use dotenvy::dotenv;
use foodgram::{
    api::{self, ApiContext},
    config::{Settings, catalog, database},
    core::{ingredient, media::MediaStore, tag},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();
    let settings = Settings::from_env();
    info!(?settings, "Loaded settings");

    // 3. Connect and make sure the schema exists
    let db = database::create_connection(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;

    // 4. Seed tags and ingredients from the catalog
    seed_catalog(&db, &settings.catalog_path).await?;

    // 5. Serve requests, one JSON object per line
    let ctx = ApiContext::new(db, MediaStore::new(&settings.media_root));
    info!("Ready for requests on stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let mut reply = api::handle_line(&ctx, &line).await;
        reply.push('\n');
        stdout.write_all(reply.as_bytes()).await?;
        stdout.flush().await?;
    }

    info!("Input closed, shutting down");
    Ok(())
}

async fn seed_catalog(db: &DatabaseConnection, catalog_path: &Path) -> Result<()> {
    if !catalog_path.exists() {
        warn!("Catalog file {catalog_path:?} not found, skipping seeding");
        return Ok(());
    }

    let catalog = catalog::load_catalog(catalog_path)?;
    let tags = tag::seed_tags(db, &catalog.tags).await?;
    info!("Seeded {tags} tags");

    if let Some(file) = &catalog.ingredients_file {
        // Relative paths are resolved against the catalog's directory
        let path = catalog_path
            .parent()
            .map_or_else(|| file.clone(), |dir| dir.join(file));
        let seeds = catalog::load_ingredient_seeds(&path)?;
        let loaded = ingredient::load_ingredients(db, &seeds).await?;
        info!("Loaded {loaded} ingredients from {path:?}");
    }

    Ok(())
}
