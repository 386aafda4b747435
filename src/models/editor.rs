// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Shape creation and editing for the active frame.
//!
//! The editor owns at most one unfinished shape. Committed shapes live in the
//! `FrameRecord` passed to each call; the editor refers to them by index only.
//! Every mutating call requires `Permission::Edit`.

use crate::config::EditorConfig;
use crate::error::AnnotationError;
use crate::models::annotation::{Shape, ShapeKind};
use crate::models::frame::FrameRecord;
use crate::models::label::LabelSet;
use crate::util::geometry::Point;
use crate::util::palette::palette_color;
use crate::view::permission::{Permission, PermissionSet};

#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    Idle,
    /// A shape is being drawn point by point. `awaiting_label` is set once
    /// the shape is complete and the caller should ask for a label.
    Building { shape: Shape, awaiting_label: bool },
    /// A committed shape is selected.
    Editing { shape: usize },
}

/// Result of adding a point while building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildProgress {
    Incomplete,
    ReadyForLabel,
}

/// What a drag gesture should act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Pan,
    MoveShape,
    MoveVertex(usize),
}

fn too_few_points(shape: &Shape) -> AnnotationError {
    AnnotationError::TooFewPoints {
        kind: shape.kind().as_str(),
        required: shape.kind().min_points(),
        actual: shape.len(),
    }
}

#[derive(Debug, Clone)]
pub struct Editor {
    state: EditorState,
    config: EditorConfig,
    permissions: PermissionSet,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            state: EditorState::Idle,
            config,
            permissions: PermissionSet::all(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == EditorState::Idle
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn set_permissions(&mut self, permissions: PermissionSet) {
        self.permissions = permissions;
    }

    /// The unfinished shape, if any.
    pub fn building(&self) -> Option<&Shape> {
        match &self.state {
            EditorState::Building { shape, .. } => Some(shape),
            _ => None,
        }
    }

    /// Index of the selected committed shape.
    pub fn selected(&self) -> Option<usize> {
        match self.state {
            EditorState::Editing { shape } => Some(shape),
            _ => None,
        }
    }

    fn ensure_edit(&self) -> Result<(), AnnotationError> {
        if self.permissions.allows(Permission::Edit) {
            Ok(())
        } else {
            Err(AnnotationError::EditDenied)
        }
    }

    /// Drop any unfinished shape and forget the selection, e.g. when the
    /// active frame changes.
    pub fn reset(&mut self) {
        if let EditorState::Building { shape, .. } = &self.state {
            log::debug!("Discarding unfinished {} with {} points", shape.kind(), shape.len());
        }
        self.state = EditorState::Idle;
    }

    /// Start drawing a new shape. An unfinished shape is discarded and any
    /// selection in `record` is cleared.
    pub fn begin(&mut self, record: &mut FrameRecord, kind: ShapeKind) -> Result<(), AnnotationError> {
        self.ensure_edit()?;
        self.deselect(record);
        self.reset();

        let mut shape = Shape::new(kind);
        shape.set_vertex_side(self.config.vertex_side, self.config.vertex_side_fixed);
        shape.set_fill_alpha(self.config.fill_alpha);
        shape.set_color(self.config.default_color);
        self.state = EditorState::Building {
            shape,
            awaiting_label: false,
        };
        Ok(())
    }

    /// Append a point (image space) to the unfinished shape.
    ///
    /// A rectangle is ready for its label at two points. Points arriving
    /// while a label is pending are ignored.
    pub fn add_point(&mut self, point: Point) -> Result<BuildProgress, AnnotationError> {
        self.ensure_edit()?;
        let EditorState::Building {
            shape,
            awaiting_label,
        } = &mut self.state
        else {
            return Err(AnnotationError::NotBuilding);
        };
        if *awaiting_label {
            return Ok(BuildProgress::ReadyForLabel);
        }
        shape.add_point(point);
        if shape.kind() == ShapeKind::Rectangle && shape.is_complete() {
            *awaiting_label = true;
            return Ok(BuildProgress::ReadyForLabel);
        }
        Ok(BuildProgress::Incomplete)
    }

    /// Finish point entry. Polygons need at least three points.
    pub fn close(&mut self) -> Result<(), AnnotationError> {
        self.ensure_edit()?;
        let EditorState::Building {
            shape,
            awaiting_label,
        } = &mut self.state
        else {
            return Err(AnnotationError::NotBuilding);
        };
        if !shape.is_complete() {
            return Err(too_few_points(shape));
        }
        *awaiting_label = true;
        Ok(())
    }

    /// Label the unfinished shape and append it to `record`.
    ///
    /// The label is added to `labels` if no label with the same spelling in
    /// any case exists; the shape takes the stored spelling and its palette
    /// color. Returns the shape's index in `record`.
    pub fn commit(
        &mut self,
        record: &mut FrameRecord,
        labels: &mut LabelSet,
        label: &str,
    ) -> Result<usize, AnnotationError> {
        self.ensure_edit()?;
        let label = label.trim();
        if label.is_empty() {
            return Err(AnnotationError::EmptyLabel);
        }

        let mut shape = match std::mem::replace(&mut self.state, EditorState::Idle) {
            EditorState::Building { shape, .. } if shape.is_complete() => shape,
            EditorState::Building {
                shape,
                awaiting_label,
            } => {
                let err = too_few_points(&shape);
                self.state = EditorState::Building {
                    shape,
                    awaiting_label,
                };
                return Err(err);
            }
            other => {
                self.state = other;
                return Err(AnnotationError::NotBuilding);
            }
        };

        let label_index = labels.add(label);
        shape.set_label(labels.get(label_index).unwrap_or(label));
        shape.set_color(palette_color(label_index));
        record.push_shape(shape);
        log::info!(
            "Added '{}' to frame {}, total shapes: {}",
            label,
            record.frame_index(),
            record.shapes().len()
        );
        Ok(record.shapes().len() - 1)
    }

    /// Discard the unfinished shape.
    pub fn cancel(&mut self) -> Option<Shape> {
        match std::mem::replace(&mut self.state, EditorState::Idle) {
            EditorState::Building { shape, .. } => Some(shape),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Remove the last point of the unfinished shape. With one point left
    /// the whole shape is cancelled.
    pub fn undo_last_point(&mut self) -> bool {
        if !self.permissions.allows(Permission::Edit) {
            return false;
        }
        let EditorState::Building {
            shape,
            awaiting_label,
        } = &mut self.state
        else {
            return false;
        };
        if shape.len() <= 1 {
            self.state = EditorState::Idle;
            return true;
        }
        shape.pop_point();
        *awaiting_label = false;
        true
    }

    /// The user dismissed the label prompt: take back the point that
    /// completed the shape.
    pub fn reject_label(&mut self) -> bool {
        match self.state {
            EditorState::Building {
                awaiting_label: true,
                ..
            } => self.undo_last_point(),
            _ => false,
        }
    }

    /// Select the topmost shape of `record` under `point`.
    ///
    /// Shapes are tested from the most recently added down; vertex handles
    /// count as part of a shape. A miss clears the selection.
    pub fn select_at(&mut self, record: &mut FrameRecord, point: Point, view_scale: f64) -> Option<usize> {
        if !self.permissions.allows(Permission::Edit) || self.building().is_some() {
            return None;
        }
        self.deselect(record);

        let (index, vertex) = record
            .shapes()
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, shape)| {
                let hit = shape.contains(point, true, view_scale);
                hit.hit.then_some((i, hit.vertex))
            })?;
        if let Some(shape) = record.shape_mut(index) {
            shape.select(vertex);
        }
        self.state = EditorState::Editing { shape: index };
        log::debug!("Selected shape {} (vertex {:?})", index, vertex);
        Some(index)
    }

    /// Clear the selection, if any.
    pub fn deselect(&mut self, record: &mut FrameRecord) {
        if let EditorState::Editing { shape } = self.state {
            if let Some(shape) = record.shape_mut(shape) {
                shape.clear_selection();
            }
            self.state = EditorState::Idle;
        }
    }

    /// Decide what a drag starting at `point` acts on.
    ///
    /// A drag that starts on the selected shape moves it, or only the vertex
    /// under the pointer. Anywhere else the view pans and the selection is
    /// cleared.
    pub fn drag_start(&mut self, record: &mut FrameRecord, point: Point, view_scale: f64) -> DragMode {
        let Some(index) = self.selected() else {
            return DragMode::Pan;
        };
        if !self.permissions.allows(Permission::Edit) {
            return DragMode::Pan;
        }
        let hit = match record.shape(index) {
            Some(shape) => shape.contains(point, true, view_scale),
            None => {
                self.state = EditorState::Idle;
                return DragMode::Pan;
            }
        };
        if !hit.hit {
            self.deselect(record);
            return DragMode::Pan;
        }
        if let Some(shape) = record.shape_mut(index) {
            shape.select(hit.vertex);
        }
        match hit.vertex {
            Some(vertex) => DragMode::MoveVertex(vertex),
            None => DragMode::MoveShape,
        }
    }

    /// Move the selection by an image-space delta: the selected vertex if
    /// there is one, otherwise the whole shape.
    pub fn drag_by(&mut self, record: &mut FrameRecord, dx: f64, dy: f64) -> bool {
        if !self.permissions.allows(Permission::Edit) {
            return false;
        }
        let Some(shape) = self.selected().and_then(|i| record.shape_mut(i)) else {
            return false;
        };
        match shape.selected_vertex() {
            Some(vertex) => shape.move_point(vertex, dx, dy),
            None => shape.move_all(dx, dy),
        }
        true
    }

    /// Remove the selected shape from `record`.
    pub fn delete_selected(&mut self, record: &mut FrameRecord) -> Result<Shape, AnnotationError> {
        self.ensure_edit()?;
        let index = self.selected().ok_or(AnnotationError::NothingSelected)?;
        self.state = EditorState::Idle;
        let mut shape = record
            .remove_shape(index)
            .ok_or(AnnotationError::NothingSelected)?;
        shape.clear_selection();
        log::info!(
            "Deleted '{}' from frame {}, total shapes: {}",
            shape.label(),
            record.frame_index(),
            record.shapes().len()
        );
        Ok(shape)
    }

    /// Change the label of the selected shape and recolor it.
    pub fn relabel(
        &mut self,
        record: &mut FrameRecord,
        labels: &mut LabelSet,
        label: &str,
    ) -> Result<(), AnnotationError> {
        self.ensure_edit()?;
        let label = label.trim();
        if label.is_empty() {
            return Err(AnnotationError::EmptyLabel);
        }
        let shape = self
            .selected()
            .and_then(|i| record.shape_mut(i))
            .ok_or(AnnotationError::NothingSelected)?;
        let label_index = labels.add(label);
        shape.set_label(labels.get(label_index).unwrap_or(label));
        shape.set_color(palette_color(label_index));
        Ok(())
    }
}
