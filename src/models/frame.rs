// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation state of one frame.
//!
//! A `FrameRecord` holds the shapes drawn over a single still image or a
//! single video frame, the pixel size of that frame, and optionally the
//! decoded raster as a render cache.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use image::DynamicImage;

use crate::config::RectangleFormat;
use crate::error::AnnotationError;
use crate::io::export::convert_frame;
use crate::io::media::{raster_path_for, write_raster_once, RASTER_EXTENSION};
use crate::io::serialization::{export_json, import_json_lenient, FrameData, ShapeData};
use crate::io::store::frame_file_stem;
use crate::models::annotation::{Shape, ShapeKind};
use crate::models::label::LabelSet;
use crate::util::geometry::Point;
use crate::util::palette::Color;

#[derive(Debug, Clone)]
pub struct FrameRecord {
    pub width: u32,
    pub height: u32,
    frame_index: u32,
    image_path: String,
    shapes: Vec<Shape>,
    raster: Option<Arc<DynamicImage>>,
}

impl PartialEq for FrameRecord {
    // The raster is a cache and does not take part in identity.
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.frame_index == other.frame_index
            && self.image_path == other.image_path
            && self.shapes == other.shapes
    }
}

impl FrameRecord {
    pub fn new(image_path: impl Into<String>, width: u32, height: u32, frame_index: u32) -> Self {
        Self {
            width,
            height,
            frame_index,
            image_path: image_path.into(),
            shapes: Vec::new(),
            raster: None,
        }
    }

    /// Record for a still image whose file stem is `stem`.
    pub fn for_image(stem: &str, width: u32, height: u32) -> Self {
        Self::new(format!("{stem}.{RASTER_EXTENSION}"), width, height, 0)
    }

    /// Record for frame `frame_index` of the video whose file stem is `video_stem`.
    pub fn for_video_frame(video_stem: &str, frame_index: u32, width: u32, height: u32) -> Self {
        let stem = frame_file_stem(video_stem, frame_index);
        Self::new(format!("{stem}.{RASTER_EXTENSION}"), width, height, frame_index)
    }

    /// Attach a decoded raster as render cache.
    pub fn with_raster(mut self, raster: Arc<DynamicImage>) -> Self {
        self.raster = Some(raster);
        self
    }

    /// 0 for a still image, the frame ordinal for a video.
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// Display name written as `imagePath`.
    pub fn image_path(&self) -> &str {
        &self.image_path
    }

    pub fn raster(&self) -> Option<&Arc<DynamicImage>> {
        self.raster.as_ref()
    }

    pub fn set_raster(&mut self, raster: Option<Arc<DynamicImage>>) {
        self.raster = raster;
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    pub fn shape_mut(&mut self, index: usize) -> Option<&mut Shape> {
        self.shapes.get_mut(index)
    }

    pub fn push_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn remove_shape(&mut self, index: usize) -> Option<Shape> {
        (index < self.shapes.len()).then(|| self.shapes.remove(index))
    }

    /// Recolor every shape from its label's position in `labels`.
    pub fn apply_label_colors(&mut self, labels: &LabelSet, fallback: Color) {
        for shape in &mut self.shapes {
            shape.set_color(labels.color_of(shape.label(), fallback));
        }
    }

    /// Build a record from its stored form.
    ///
    /// Shapes with an unknown type are dropped, as are points that are not
    /// `[x, y]` pairs.
    pub fn from_data(data: FrameData) -> Result<Self, AnnotationError> {
        if data.width == 0 || data.height == 0 {
            return Err(AnnotationError::ZeroDimensions {
                width: data.width,
                height: data.height,
            });
        }
        let mut record = Self::new(data.image_path, data.width, data.height, data.frame_index);
        for shape_data in data.shapes {
            let kind: ShapeKind = match shape_data.shape_type.parse() {
                Ok(kind) => kind,
                Err(e) => {
                    log::warn!("Skipping shape in frame {}: {}", data.frame_index, e);
                    continue;
                }
            };
            let points: Vec<Point> = shape_data
                .points
                .iter()
                .filter_map(|p| match p.as_slice() {
                    [x, y] => Some(Point::new(*x, *y)),
                    _ => None,
                })
                .collect();
            record.push_shape(Shape::with_points(kind, shape_data.label, &points));
        }
        Ok(record)
    }

    /// Stored form of this record.
    pub fn to_data(&self) -> FrameData {
        FrameData {
            image_path: self.image_path.clone(),
            width: self.width,
            height: self.height,
            frame_index: self.frame_index,
            shapes: self
                .shapes
                .iter()
                .map(|shape| ShapeData {
                    shape_type: shape.kind().to_string(),
                    label: shape.label().to_string(),
                    points: shape.points().iter().map(|p| vec![p.x, p.y]).collect(),
                })
                .collect(),
        }
    }

    /// Read a record. Any failure means "no annotations for this frame yet".
    pub fn load(path: &Path) -> Option<Self> {
        let data = import_json_lenient::<FrameData>(path)?;
        match Self::from_data(data) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Ignoring {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write the shapes to `path` and, if a raster is cached and no raster
    /// file exists yet, the raster to the sibling `.jpeg` path.
    pub fn save(&self, path: &Path) -> Result<()> {
        export_json(&self.to_data(), path)?;
        if let Some(raster) = &self.raster {
            write_raster_once(raster, &raster_path_for(path))?;
        }
        log::info!(
            "Saved frame {} with {} shapes to {}",
            self.frame_index,
            self.shapes.len(),
            path.display()
        );
        Ok(())
    }

    /// Normalized export lines for this frame.
    pub fn to_exportable(
        &self,
        label_index: &HashMap<String, usize>,
        format: RectangleFormat,
    ) -> String {
        convert_frame(&self.to_data(), label_index, format)
    }
}
