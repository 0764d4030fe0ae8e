//! Intermediate raster storage.
//!
//! The engine reads images from disk, so every request writes its rasters to
//! the artifact directory first. Each file is owned by an [`Artifact`] guard
//! and removed when the guard is dropped, on success and error paths alike.
//! File names carry a millisecond timestamp and a random UUID so concurrent
//! requests never collide.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{DynamicImage, ImageFormat};

use crate::Result;

const MAX_STEM_LEN: usize = 64;

/// Directory holding intermediate rasters.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open the store, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Unique file path for `original_name` with a role `suffix` such as `processed`.
    pub fn unique_path(&self, original_name: &str, suffix: &str) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let stem = sanitize_stem(original_name);
        let name = if suffix.is_empty() {
            format!("{}-{}-{}.png", millis, uuid::Uuid::new_v4(), stem)
        } else {
            format!("{}-{}-{}_{}.png", millis, uuid::Uuid::new_v4(), stem, suffix)
        };
        self.dir.join(name)
    }

    /// Write `image` as PNG and return the guard owning the file.
    pub fn persist(&self, original_name: &str, suffix: &str, image: &DynamicImage) -> Result<Artifact> {
        let path = self.unique_path(original_name, suffix);
        let artifact = Artifact { path };
        image.save_with_format(&artifact.path, ImageFormat::Png)?;
        tracing::debug!(path = %artifact.path.display(), "Wrote intermediate raster");
        Ok(artifact)
    }
}

/// An intermediate raster, deleted on drop.
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
}

impl Artifact {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed intermediate raster"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), "Failed to remove intermediate raster: {}", e),
        }
    }
}

/// File stem safe for any filesystem: ASCII alphanumerics, `-` and `_`.
fn sanitize_stem(original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    let stem: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(MAX_STEM_LEN)
        .collect();

    if stem.is_empty() { "image".to_string() } else { stem }
}
