// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor configuration.
//!
//! Settings are stored as YAML. Every field has a default, so a partial file
//! (or no file at all) is fine.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::annotation::{DEFAULT_FILL_ALPHA, DEFAULT_VERTEX_SIDE};
use crate::util::palette::Color;

/// How rectangles are written by the exporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RectangleFormat {
    /// Four corners: `xmin ymin xmax ymin xmax ymax xmin ymax`.
    #[default]
    Quad,
    /// `cx cy w h`.
    CenterBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub vertex_side: f64,
    pub vertex_side_fixed: bool,
    pub fill_alpha: f32,
    /// Color of shapes whose label is missing from the label set.
    pub default_color: Color,
    pub highlight_color: Color,
    pub rectangle_format: RectangleFormat,
    pub labels_file: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            vertex_side: DEFAULT_VERTEX_SIDE,
            vertex_side_fixed: false,
            fill_alpha: DEFAULT_FILL_ALPHA,
            default_color: Color::rgb(173, 255, 47),
            highlight_color: Color::WHITE,
            rectangle_format: RectangleFormat::Quad,
            labels_file: "labels.json".to_string(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_yaml::from_str(&yaml)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults on any failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Using default editor config: {:#}", e);
                Self::default()
            }
        }
    }

    /// Write configuration as YAML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }
}
