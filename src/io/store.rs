// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation directory layout.
//!
//! A media source maps to one annotation directory (handed to us by the
//! caller). A still image `photo.png` is stored as `photo.json` plus
//! `photo.jpeg` there; a video `clip.mp4` gets a subdirectory `clip/`
//! holding `clip_0000012.json` / `clip_0000012.jpeg` per labeled frame.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::frame::FrameRecord;
use crate::models::video::VideoFrameIndex;

/// Digits in a video frame file ordinal.
pub const FRAME_ORDINAL_WIDTH: usize = 7;

/// File name without its extension (`clip.mp4` -> `clip`).
pub fn media_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

/// `<video_stem>_<frame_index padded to 7 digits>`.
pub fn frame_file_stem(video_stem: &str, frame_index: u32) -> String {
    format!(
        "{}_{:0width$}",
        video_stem,
        frame_index,
        width = FRAME_ORDINAL_WIDTH
    )
}

/// Ordinal encoded in a frame file stem, if any.
pub fn parse_frame_ordinal(file_stem: &str) -> Option<u32> {
    let (_, ordinal) = file_stem.rsplit_once('_')?;
    ordinal.parse().ok()
}

/// Annotation file of a still image.
pub fn image_annotation_path(annotation_dir: &Path, image_name: &str) -> PathBuf {
    annotation_dir.join(format!("{}.json", media_stem(image_name)))
}

/// Directory holding the labeled frames of a video.
pub fn video_annotation_dir(annotation_dir: &Path, video_name: &str) -> PathBuf {
    annotation_dir.join(media_stem(video_name))
}

/// Annotation file of one video frame inside `video_dir`.
pub fn frame_annotation_path(video_dir: &Path, video_stem: &str, frame_index: u32) -> PathBuf {
    video_dir.join(format!("{}.json", frame_file_stem(video_stem, frame_index)))
}

/// `.json` files directly inside `dir`, sorted by file name.
pub fn scan_annotation_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Load the annotations of a still image, if any.
pub fn load_image_record(annotation_dir: &Path, image_name: &str) -> Option<FrameRecord> {
    FrameRecord::load(&image_annotation_path(annotation_dir, image_name))
}

/// Save the annotations of a still image.
pub fn save_image_record(
    annotation_dir: &Path,
    image_name: &str,
    record: &FrameRecord,
) -> Result<()> {
    record.save(&image_annotation_path(annotation_dir, image_name))
}

/// Rebuild the sparse frame index of `video_name` from disk.
///
/// Files are visited in name order, but each record is keyed by the
/// `frameIndex` inside the file; the ordinal in the file name is only used to
/// warn about renamed files. Unreadable files are skipped. A missing
/// directory yields an empty index.
pub fn load_video_dir(annotation_dir: &Path, video_name: &str) -> VideoFrameIndex {
    let video_stem = media_stem(video_name);
    let dir = video_annotation_dir(annotation_dir, video_name);
    let mut index = VideoFrameIndex::new(video_stem);
    if !dir.is_dir() {
        return index;
    }
    let files = match scan_annotation_files(&dir) {
        Ok(files) => files,
        Err(e) => {
            log::warn!("Could not scan video annotations: {:#}", e);
            return index;
        }
    };
    for path in files {
        let Some(record) = FrameRecord::load(&path) else {
            continue;
        };
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(ordinal) = parse_frame_ordinal(&stem) {
            if ordinal != record.frame_index() {
                log::warn!(
                    "{} holds frame {}, not {}; using the stored frame index",
                    path.display(),
                    record.frame_index(),
                    ordinal
                );
            }
        }
        if let Some(previous) = index.register(record) {
            log::warn!(
                "Frame {} appears more than once in {}; keeping {}",
                previous.frame_index(),
                dir.display(),
                path.display()
            );
        }
    }
    log::info!(
        "Loaded {} labeled frames from {}",
        index.len(),
        dir.display()
    );
    index
}
