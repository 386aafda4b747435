// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Export of annotations to normalized text files.
//!
//! An export folder holds `labels.txt` (one label per line, line number is
//! the class index) and, mirroring the annotation directory tree, one
//! `<stem>.txt` per frame annotation plus a copy of each frame raster. Each
//! line of a frame file is `<class> <x> <y> ...` with coordinates divided by
//! the frame size.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{EditorConfig, RectangleFormat};
use crate::error::AnnotationError;
use crate::io::media::RASTER_EXTENSION;
use crate::io::serialization::{FrameData, ShapeData};
use crate::models::annotation::ShapeKind;
use crate::models::frame::FrameRecord;
use crate::models::label::LabelSet;
use crate::util::geometry::{normalize_coordinates, Point};

/// Name of the label index file in an export folder.
pub const LABELS_FILE: &str = "labels.txt";

/// Counts reported by [`export_project`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub output_dir: PathBuf,
    pub frames: usize,
    pub rasters: usize,
    pub skipped: usize,
}

/// `<prefix>_<yyyyMMdd_HHmmss_SSS>` in local time.
pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, chrono::Local::now().format("%Y%m%d_%H%M%S_%3f"))
}

/// Bounding corners of all points: `(min, max)`.
fn bounds(points: &[Point]) -> Option<(Point, Point)> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(lo, hi), p| {
        (
            Point::new(lo.x.min(p.x), lo.y.min(p.y)),
            Point::new(hi.x.max(p.x), hi.y.max(p.y)),
        )
    }))
}

/// Four corners clockwise from the top left: `xmin ymin xmax ymin xmax ymax xmin ymax`.
pub fn rectangle_quad(points: &[Point]) -> Option<[f64; 8]> {
    let (lo, hi) = bounds(points)?;
    Some([lo.x, lo.y, hi.x, lo.y, hi.x, hi.y, lo.x, hi.y])
}

/// Center and size of the bounding box: `cx cy w h`.
pub fn center_box(points: &[Point]) -> Option<[f64; 4]> {
    let (lo, hi) = bounds(points)?;
    Some([
        (lo.x + hi.x) / 2.0,
        (lo.y + hi.y) / 2.0,
        hi.x - lo.x,
        hi.y - lo.y,
    ])
}

fn convert_shape(
    shape: &ShapeData,
    width: u32,
    height: u32,
    label_index: &HashMap<String, usize>,
    format: RectangleFormat,
) -> Result<String, AnnotationError> {
    let class = *label_index
        .get(&shape.label)
        .ok_or_else(|| AnnotationError::UnknownLabel(shape.label.clone()))?;
    let kind: ShapeKind = shape.shape_type.parse()?;
    let points: Vec<Point> = shape
        .points
        .iter()
        .filter_map(|p| match p.as_slice() {
            [x, y] => Some(Point::new(*x, *y)),
            _ => None,
        })
        .collect();
    if points.len() < kind.min_points() {
        return Err(AnnotationError::TooFewPoints {
            kind: kind.as_str(),
            required: kind.min_points(),
            actual: points.len(),
        });
    }

    // Pixel-space x/y pairs, normalized below.
    let pixels: Vec<f64> = match (kind, format) {
        (ShapeKind::Rectangle, RectangleFormat::Quad) => {
            rectangle_quad(&points).map(Vec::from).unwrap_or_default()
        }
        (ShapeKind::Rectangle, RectangleFormat::CenterBox) => {
            center_box(&points).map(Vec::from).unwrap_or_default()
        }
        (ShapeKind::Polygon, _) => points.iter().flat_map(|p| [p.x, p.y]).collect(),
    };
    let coords = pixels.chunks_exact(2).flat_map(|pair| {
        let p = normalize_coordinates(pair[0], pair[1], width, height);
        [p.x, p.y]
    });
    let mut line = class.to_string();
    for c in coords {
        line.push(' ');
        line.push_str(&c.to_string());
    }
    Ok(line)
}

/// Export lines of one frame, one per shape in insertion order.
///
/// Shapes whose label is not in `label_index`, or that have too few points,
/// are left out with a warning.
pub fn convert_frame(
    data: &FrameData,
    label_index: &HashMap<String, usize>,
    format: RectangleFormat,
) -> String {
    if data.width == 0 || data.height == 0 {
        log::warn!(
            "Not exporting {}: {}",
            data.image_path,
            AnnotationError::ZeroDimensions {
                width: data.width,
                height: data.height
            }
        );
        return String::new();
    }
    data.shapes
        .iter()
        .filter_map(|shape| {
            match convert_shape(shape, data.width, data.height, label_index, format) {
                Ok(line) => Some(line),
                Err(e) => {
                    log::warn!("Skipping shape in {}: {}", data.image_path, e);
                    None
                }
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `labels.txt` into `dir`.
pub fn write_labels(labels: &LabelSet, dir: &Path) -> Result<()> {
    let path = dir.join(LABELS_FILE);
    let text = labels.labels().join("\n");
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Mirrors `source` into `target`. `exclude` is the canonical path of the
/// export folder itself, which may lie inside `source`.
fn export_dir(
    source: &Path,
    target: &Path,
    exclude: &Path,
    label_index: &HashMap<String, usize>,
    config: &EditorConfig,
    summary: &mut ExportSummary,
) -> Result<()> {
    fs::create_dir_all(target)
        .with_context(|| format!("Failed to create directory {}", target.display()))?;
    let mut entries: Vec<PathBuf> = fs::read_dir(source)
        .with_context(|| format!("Failed to read directory {}", source.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for path in entries {
        let Some(name) = path.file_name() else {
            continue;
        };
        if path.is_dir() {
            if fs::canonicalize(&path).is_ok_and(|p| p == exclude) {
                continue;
            }
            export_dir(&path, &target.join(name), exclude, label_index, config, summary)?;
            continue;
        }
        if name == config.labels_file.as_str() {
            continue;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => match FrameRecord::load(&path) {
                Some(record) => {
                    let out = target.join(name).with_extension("txt");
                    fs::write(&out, record.to_exportable(label_index, config.rectangle_format))
                        .with_context(|| format!("Failed to write {}", out.display()))?;
                    summary.frames += 1;
                }
                None => summary.skipped += 1,
            },
            Some(ext) if ext == RASTER_EXTENSION => {
                let out = target.join(name);
                fs::copy(&path, &out).with_context(|| {
                    format!("Failed to copy {} to {}", path.display(), out.display())
                })?;
                summary.rasters += 1;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Export everything under `annotation_root` into a new timestamped folder
/// inside `output_parent`.
///
/// Not transactional: on error, files written so far stay in place.
pub fn export_project(
    annotation_root: &Path,
    labels: &LabelSet,
    config: &EditorConfig,
    output_parent: &Path,
) -> Result<ExportSummary> {
    let output_dir = output_parent.join(unique_name("export"));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create directory {}", output_dir.display()))?;
    write_labels(labels, &output_dir)?;
    let exclude = fs::canonicalize(&output_dir)
        .with_context(|| format!("Failed to resolve {}", output_dir.display()))?;

    let mut summary = ExportSummary {
        output_dir: output_dir.clone(),
        ..ExportSummary::default()
    };
    export_dir(
        annotation_root,
        &output_dir,
        &exclude,
        &labels.index_map(),
        config,
        &mut summary,
    )?;
    log::info!(
        "Exported {} frames and {} rasters to {} ({} skipped)",
        summary.frames,
        summary.rasters,
        output_dir.display(),
        summary.skipped
    );
    Ok(summary)
}
