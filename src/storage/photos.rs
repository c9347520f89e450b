use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Accepts any `image/*` content type, otherwise falls back to the extension.
pub fn is_valid_image(filename: &str, content_type: Option<&str>) -> bool {
    if content_type.is_some_and(|value| value.starts_with("image/")) {
        return true;
    }
    allowed_extension(filename).is_some()
}

fn allowed_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

fn extension_for(filename: &str, content_type: Option<&str>) -> String {
    if let Some(ext) = allowed_extension(filename) {
        return format!(".{ext}");
    }
    let ext = match content_type {
        Some("image/png") => ".png",
        Some("image/webp") => ".webp",
        Some("image/gif") => ".gif",
        _ => ".jpg",
    };
    ext.to_string()
}

/// Photo files on local disk, addressed by paths relative to `root`.
#[derive(Debug, Clone)]
pub struct PhotoStorage {
    root: PathBuf,
}

impl PhotoStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// `{doll_id}/{YYYYMMDDTHHMMSSZ}_{8 hex}{ext}`
    pub fn generate_relative_path(
        doll_id: i64,
        filename: &str,
        content_type: Option<&str>,
    ) -> String {
        let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let suffix = Uuid::new_v4().simple().to_string();
        let ext = extension_for(filename, content_type);
        format!("{doll_id}/{timestamp}_{}{ext}", &suffix[..8])
    }

    /// Writes `bytes` under a fresh relative path and returns that path.
    pub async fn save(
        &self,
        doll_id: i64,
        filename: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, AppError> {
        let relative = Self::generate_relative_path(doll_id, filename, content_type);
        let full = self.root.join(&relative);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| AppError::internal_with_source("Failed to store photo", err))?;
        }
        tokio::fs::write(&full, bytes)
            .await
            .map_err(|err| AppError::internal_with_source("Failed to store photo", err))?;
        debug!(path = %relative, size = bytes.len(), "photo stored");
        Ok(relative)
    }

    /// Best-effort removal of a stored file.
    pub async fn remove(&self, relative: &str) {
        let Some(full) = self.resolve(relative) else {
            return;
        };
        if let Err(err) = tokio::fs::remove_file(&full).await {
            warn!(path = %relative, error = %err, "failed to remove photo file");
        }
    }

    /// Absolute path of an existing file under the root. `None` when the path
    /// escapes the root or names nothing.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let requested = Path::new(relative);
        let plain = requested
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if relative.is_empty() || !plain {
            return None;
        }

        let root = self.root.canonicalize().ok()?;
        let full = root.join(requested).canonicalize().ok()?;
        (full.starts_with(&root) && full.is_file()).then_some(full)
    }
}
