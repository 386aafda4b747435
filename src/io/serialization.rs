// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! On-disk JSON schemas and their serialization.
//!
//! This module handles reading and writing the per-frame annotation files
//! and the project label file. Points are stored in absolute image pixels.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One shape as stored in a frame file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeData {
    /// `"rectangle"` or `"polygon"`. Kept as a string so an unknown type
    /// drops only that shape instead of the whole file.
    pub shape_type: String,
    pub label: String,
    pub points: Vec<Vec<f64>>,
}

/// One frame file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameData {
    #[serde(rename = "imagePath")]
    pub image_path: String,
    #[serde(rename = "imageWidth")]
    pub width: u32,
    #[serde(rename = "imageHeight")]
    pub height: u32,
    #[serde(rename = "frameIndex")]
    pub frame_index: u32,
    pub shapes: Vec<ShapeData>,
}

/// The project label file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelData {
    pub labels: Vec<String>,
}

/// Write any schema value as pretty JSON, creating parent directories.
pub fn export_json<T: Serialize>(data: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Read a schema value from a JSON file.
pub fn import_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(data)
}

/// Read a schema value, treating any failure as absence.
pub fn import_json_lenient<T: DeserializeOwned>(path: &Path) -> Option<T> {
    match import_json(path) {
        Ok(data) => Some(data),
        Err(e) => {
            log::warn!("Ignoring annotation file: {:#}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
  "imagePath": "clip_0000012.jpeg",
  "imageWidth": 640,
  "imageHeight": 480,
  "frameIndex": 12,
  "shapes": [
    { "shape_type": "rectangle", "label": "car", "points": [[10.0, 10.0], [50.5, 40.25]] }
  ]
}"#;

    #[test]
    fn test_parse_schema_field_names() {
        let data: FrameData = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(data.image_path, "clip_0000012.jpeg");
        assert_eq!((data.width, data.height, data.frame_index), (640, 480, 12));
        assert_eq!(data.shapes[0].shape_type, "rectangle");
        assert_eq!(data.shapes[0].points[1], vec![50.5, 40.25]);
    }

    #[test]
    fn test_written_json_uses_schema_names() {
        let data: FrameData = serde_json::from_str(SAMPLE).unwrap();
        let json = serde_json::to_string_pretty(&data).unwrap();
        for key in ["\"imagePath\"", "\"imageWidth\"", "\"frameIndex\"", "\"shape_type\""] {
            assert!(json.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_export_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("labels.json");
        let labels = LabelData {
            labels: vec!["car".into(), "person".into()],
        };
        export_json(&labels, &path).unwrap();
        let back: LabelData = import_json(&path).unwrap();
        assert_eq!(back, labels);
    }

    #[test]
    fn test_lenient_import_swallows_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(import_json_lenient::<FrameData>(&path).is_none());
        assert!(import_json_lenient::<FrameData>(&dir.path().join("absent.json")).is_none());
    }
}
