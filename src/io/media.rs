// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame raster loading and persistence.
//!
//! Rasters are written once as JPEG beside their annotation file and never
//! overwritten afterwards. Decoding is a pure function of the source path so
//! it can run on a background thread.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat};

/// Extension used for persisted frame rasters.
pub const RASTER_EXTENSION: &str = "jpeg";

/// Sibling raster path of an annotation file (`frame.json` -> `frame.jpeg`).
pub fn raster_path_for(annotation_path: &Path) -> PathBuf {
    annotation_path.with_extension(RASTER_EXTENSION)
}

/// Decode an image file.
pub fn decode_raster(path: &Path) -> Result<DynamicImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to decode image {}", path.display()))?;
    log::debug!(
        "Decoded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Write `raster` as JPEG to `path` unless a file already exists there.
///
/// Returns `true` when a file was written.
pub fn write_raster_once(raster: &DynamicImage, path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    // JPEG has no alpha channel.
    raster
        .to_rgb8()
        .save_with_format(path, ImageFormat::Jpeg)
        .with_context(|| format!("Failed to write raster {}", path.display()))?;
    log::info!("Saved frame raster {}", path.display());
    Ok(true)
}
