//! Media storage for recipe images.
//!
//! Clients upload images inline as base64 data URIs
//! (`data:image/png;base64,iVBORw0...`). The store decodes them and writes the
//! bytes to `<root>/recipes/<uuid>.<ext>`; recipes keep only the relative path.

use crate::errors::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::path::PathBuf;
use uuid::Uuid;

const RECIPE_IMAGE_DIR: &str = "recipes";

/// Filesystem-backed store for uploaded images
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

/// A decoded data URI
#[derive(Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// File extension derived from the MIME subtype (e.g. `png`)
    pub extension: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

/// Splits and decodes an `image/*` base64 data URI.
///
/// # Errors
/// Returns [`Error::Image`] if the string is not a base64 data URI with an
/// `image/<subtype>` MIME type, or if the payload is empty or not valid base64.
pub fn decode_data_uri(data_uri: &str) -> Result<DecodedImage> {
    let invalid = |message: &str| Error::Image {
        message: message.to_string(),
    };

    let rest = data_uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| invalid("expected a data URI"))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| invalid("expected base64 encoding"))?;
    let subtype = mime
        .strip_prefix("image/")
        .ok_or_else(|| invalid("MIME type must be image/*"))?;

    let extension = match subtype.to_ascii_lowercase().as_str() {
        "jpeg" => "jpg".to_string(),
        "svg+xml" => "svg".to_string(),
        other if !other.is_empty() && other.chars().all(|c| c.is_ascii_alphanumeric()) => {
            other.to_string()
        }
        _ => return Err(invalid("unsupported image type")),
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| invalid(&format!("bad base64 payload: {e}")))?;
    if bytes.is_empty() {
        return Err(invalid("image is empty"));
    }

    Ok(DecodedImage { extension, bytes })
}

impl MediaStore {
    /// Creates a store rooted at `root`. Directories are created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute location of a stored file given its relative path.
    #[must_use]
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Decodes a data URI and writes it as a new recipe image.
    ///
    /// Returns the path relative to the media root, suitable for the recipe row.
    pub async fn save_recipe_image(&self, data_uri: &str) -> Result<String> {
        let image = decode_data_uri(data_uri)?;
        let relative = format!("{RECIPE_IMAGE_DIR}/{}.{}", Uuid::new_v4(), image.extension);

        tokio::fs::create_dir_all(self.root.join(RECIPE_IMAGE_DIR)).await?;
        tokio::fs::write(self.resolve(&relative), &image.bytes).await?;

        tracing::debug!("Stored {} byte image at {relative}", image.bytes.len());
        Ok(relative)
    }

    /// Deletes a stored file. A missing file is logged and otherwise ignored,
    /// since the recipe row no longer references it either way.
    pub async fn remove(&self, relative: &str) {
        if let Err(e) = tokio::fs::remove_file(self.resolve(relative)).await {
            tracing::warn!("Could not remove media file {relative}: {e}");
        }
    }
}
