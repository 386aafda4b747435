// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project label list.
//!
//! Labels are ordered; a label's position is both its export class index
//! and the input to its palette color.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;

use crate::io::serialization::{export_json, import_json_lenient, LabelData};
use crate::util::palette::{palette_color, Color};

/// Ordered list of labels, deduplicated without regard to case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, keeping the first spelling of each duplicate.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for label in labels {
            set.add(label);
        }
        set
    }

    /// Load `<dir>/<file_name>`. A missing or unreadable file yields an empty set.
    pub fn load(dir: &Path, file_name: &str) -> Self {
        import_json_lenient::<LabelData>(&dir.join(file_name))
            .map(|data| Self::from_labels(data.labels))
            .unwrap_or_default()
    }

    pub fn save(&self, dir: &Path, file_name: &str) -> Result<()> {
        let data = LabelData {
            labels: self.labels.clone(),
        };
        export_json(&data, &dir.join(file_name))?;
        log::debug!("Saved {} labels to {}", self.labels.len(), dir.display());
        Ok(())
    }

    /// Add a label and return its index. If the label already exists in any
    /// casing, nothing is added and the existing index is returned.
    pub fn add(&mut self, label: impl Into<String>) -> usize {
        let label = label.into();
        if let Some(index) = self.find_ignore_case(&label) {
            return index;
        }
        self.labels.push(label);
        self.labels.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.labels.len()).then(|| self.labels.remove(index))
    }

    /// Exact-match position of `label`.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn find_ignore_case(&self, label: &str) -> Option<usize> {
        let wanted = label.to_lowercase();
        self.labels.iter().position(|l| l.to_lowercase() == wanted)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Palette color of `label`, or `fallback` when it is not in the set.
    pub fn color_of(&self, label: &str, fallback: Color) -> Color {
        self.index_of(label).map(palette_color).unwrap_or(fallback)
    }

    /// Label to class index, as used by the exporter.
    pub fn index_map(&self) -> HashMap<String, usize> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect()
    }
}
