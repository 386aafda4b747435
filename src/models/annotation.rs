// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation shapes.
//!
//! This module defines the shape variants (rectangles and polygons), the
//! vertex handles that shadow each shape point, and vertex-level
//! hit-testing. All coordinates are in image space.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;
use crate::util::geometry::{point_in_polygon, point_in_rect, Point};
use crate::util::palette::Color;

/// Default vertex handle side length.
pub const DEFAULT_VERTEX_SIDE: f64 = 50.0;

/// Default fill opacity of a shape.
pub const DEFAULT_FILL_ALPHA: f32 = 0.5;

/// Kind of shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Polygon,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Polygon => "polygon",
        }
    }

    /// Points needed before a shape of this kind can be committed.
    pub fn min_points(self) -> usize {
        match self {
            ShapeKind::Rectangle => 2,
            ShapeKind::Polygon => 3,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rectangle" => Ok(ShapeKind::Rectangle),
            "polygon" => Ok(ShapeKind::Polygon),
            other => Err(AnnotationError::UnknownShapeType(other.to_string())),
        }
    }
}

/// Square handle drawn over one shape point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub center: Point,
    /// Side length, always positive.
    pub side: f64,
    /// When set, `side` is a screen size and is divided by the view scale to
    /// get the image-space extent, so the handle keeps its on-screen size
    /// under zoom. Otherwise `side` is used in image space as is.
    pub fixed: bool,
    pub selected: bool,
}

impl Vertex {
    pub fn new(center: Point, side: f64, fixed: bool) -> Self {
        Self {
            center,
            side,
            fixed,
            selected: false,
        }
    }

    /// Image-space side length at the given view scale.
    pub fn extent(&self, view_scale: f64) -> f64 {
        if self.fixed && view_scale > 0.0 {
            self.side / view_scale
        } else {
            self.side
        }
    }

    /// Opposite corners of the handle square.
    pub fn bounds(&self, view_scale: f64) -> (Point, Point) {
        let half = 0.5 * self.extent(view_scale);
        (
            self.center.offset(-half, -half),
            self.center.offset(half, half),
        )
    }

    pub fn contains(&self, point: Point, view_scale: f64) -> bool {
        let (start, end) = self.bounds(view_scale);
        point_in_rect(point, start, end)
    }
}

/// Result of a hit test: whether the shape was hit, and which vertex if a
/// vertex handle was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hit {
    pub hit: bool,
    pub vertex: Option<usize>,
}

impl Hit {
    pub const MISS: Hit = Hit {
        hit: false,
        vertex: None,
    };

    fn body(hit: bool) -> Self {
        Self { hit, vertex: None }
    }

    fn vertex(index: usize) -> Self {
        Self {
            hit: true,
            vertex: Some(index),
        }
    }
}

/// Border and fill colors of a shape or a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeStyle {
    pub border: Color,
    pub fill: Color,
}

/// A rectangle or polygon with its label and vertex handles.
///
/// The point list is stored as the vertex centers, so the two can never
/// disagree in length.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    kind: ShapeKind,
    label: String,
    color: Color,
    fill_alpha: f32,
    vertices: Vec<Vertex>,
    vertex_side: f64,
    vertex_side_fixed: bool,
    selected: bool,
    selected_vertex: Option<usize>,
}

impl Shape {
    /// Create an empty shape of the given kind.
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            label: String::new(),
            color: Color::WHITE,
            fill_alpha: DEFAULT_FILL_ALPHA,
            vertices: Vec::new(),
            vertex_side: DEFAULT_VERTEX_SIDE,
            vertex_side_fixed: false,
            selected: false,
            selected_vertex: None,
        }
    }

    /// Create a shape from stored points. Extra rectangle points past the
    /// second are dropped.
    pub fn with_points(kind: ShapeKind, label: impl Into<String>, points: &[Point]) -> Self {
        let mut shape = Self::new(kind);
        shape.label = label.into();
        for &point in points {
            shape.add_point(point);
        }
        shape
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_fill_alpha(&mut self, alpha: f32) {
        self.fill_alpha = alpha;
    }

    /// Set the handle size for current and future vertices.
    pub fn set_vertex_side(&mut self, side: f64, fixed: bool) {
        if side > 0.0 {
            self.vertex_side = side;
        }
        self.vertex_side_fixed = fixed;
        for vertex in &mut self.vertices {
            vertex.side = self.vertex_side;
            vertex.fixed = fixed;
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn points(&self) -> Vec<Point> {
        self.vertices.iter().map(|v| v.center).collect()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether the shape has enough points to be committed and persisted.
    pub fn is_complete(&self) -> bool {
        match self.kind {
            ShapeKind::Rectangle => self.vertices.len() == 2,
            ShapeKind::Polygon => self.vertices.len() >= ShapeKind::Polygon.min_points(),
        }
    }

    /// Append a point. A rectangle refuses a third point.
    pub fn add_point(&mut self, point: Point) -> bool {
        if self.kind == ShapeKind::Rectangle && self.vertices.len() >= 2 {
            return false;
        }
        self.vertices
            .push(Vertex::new(point, self.vertex_side, self.vertex_side_fixed));
        true
    }

    /// Remove the point at `index`, returning it.
    pub fn remove_point(&mut self, index: usize) -> Option<Point> {
        if index >= self.vertices.len() {
            return None;
        }
        match self.selected_vertex {
            Some(sel) if sel == index => self.selected_vertex = None,
            Some(sel) if sel > index => self.selected_vertex = Some(sel - 1),
            _ => {}
        }
        Some(self.vertices.remove(index).center)
    }

    /// Remove and return the last point.
    pub fn pop_point(&mut self) -> Option<Point> {
        let last = self.vertices.len().checked_sub(1)?;
        self.remove_point(last)
    }

    pub fn move_point(&mut self, index: usize, dx: f64, dy: f64) {
        if let Some(vertex) = self.vertices.get_mut(index) {
            vertex.center = vertex.center.offset(dx, dy);
        }
    }

    pub fn move_point_to(&mut self, index: usize, point: Point) {
        if let Some(vertex) = self.vertices.get_mut(index) {
            vertex.center = point;
        }
    }

    pub fn move_all(&mut self, dx: f64, dy: f64) {
        for vertex in &mut self.vertices {
            vertex.center = vertex.center.offset(dx, dy);
        }
    }

    /// Hit-test `point`.
    ///
    /// With `include_vertices`, handles are tested first in insertion order
    /// and the first one containing the point wins. Otherwise only the body
    /// is tested. A rectangle without exactly two points never hits.
    pub fn contains(&self, point: Point, include_vertices: bool, view_scale: f64) -> Hit {
        if include_vertices {
            if let Some(index) = self
                .vertices
                .iter()
                .position(|v| v.contains(point, view_scale))
            {
                return Hit::vertex(index);
            }
        }
        match self.kind {
            ShapeKind::Rectangle => match self.vertices.as_slice() {
                [a, b] => Hit::body(point_in_rect(point, a.center, b.center)),
                _ => Hit::MISS,
            },
            ShapeKind::Polygon => Hit::body(point_in_polygon(point, &self.points())),
        }
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn selected_vertex(&self) -> Option<usize> {
        self.selected_vertex
    }

    /// Select the whole shape, or one of its vertices.
    pub fn select(&mut self, vertex: Option<usize>) {
        self.clear_selection();
        self.selected = true;
        self.selected_vertex = vertex.filter(|&i| i < self.vertices.len());
        if let Some(i) = self.selected_vertex {
            self.vertices[i].selected = true;
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = false;
        self.selected_vertex = None;
        for vertex in &mut self.vertices {
            vertex.selected = false;
        }
    }

    /// Colors for drawing the shape body.
    ///
    /// A selected shape without a selected vertex gets a highlighted border.
    /// The fill keeps the label color at reduced alpha.
    pub fn style(&self, highlight: Color) -> ShapeStyle {
        let border = if self.selected && self.selected_vertex.is_none() {
            highlight
        } else {
            self.color
        };
        ShapeStyle {
            border,
            fill: self.color.with_alpha(self.fill_alpha),
        }
    }

    /// Colors for drawing one vertex handle. Handles are opaque; the selected
    /// vertex is filled with the highlight color.
    pub fn vertex_style(&self, index: usize, highlight: Color) -> ShapeStyle {
        let border = self.style(highlight).border;
        let fill = if self.selected && self.selected_vertex == Some(index) {
            highlight
        } else {
            self.color
        };
        ShapeStyle { border, fill }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(a: (f64, f64), b: (f64, f64)) -> Shape {
        Shape::with_points(
            ShapeKind::Rectangle,
            "car",
            &[Point::new(a.0, a.1), Point::new(b.0, b.1)],
        )
    }

    fn unit_square() -> Shape {
        Shape::with_points(
            ShapeKind::Polygon,
            "field",
            &[
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
            ],
        )
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("rectangle".parse::<ShapeKind>().unwrap(), ShapeKind::Rectangle);
        assert_eq!("polygon".parse::<ShapeKind>().unwrap(), ShapeKind::Polygon);
        assert!("circle".parse::<ShapeKind>().is_err());
        assert_eq!(ShapeKind::Polygon.to_string(), "polygon");
    }

    #[test]
    fn test_rectangle_accepts_two_points() {
        let mut shape = Shape::new(ShapeKind::Rectangle);
        assert!(shape.add_point(Point::new(0.0, 0.0)));
        assert!(!shape.is_complete());
        assert!(shape.add_point(Point::new(5.0, 5.0)));
        assert!(shape.is_complete());
        assert!(!shape.add_point(Point::new(9.0, 9.0)));
        assert_eq!(shape.len(), 2);
        assert_eq!(shape.vertices().len(), shape.points().len());
    }

    #[test]
    fn test_rectangle_contains_is_order_independent() {
        let a = rect((10.0, 10.0), (50.0, 40.0));
        let b = rect((50.0, 40.0), (10.0, 10.0));
        for q in [
            Point::new(30.0, 20.0),
            Point::new(10.0, 40.0),
            Point::new(60.0, 20.0),
            Point::new(30.0, 5.0),
        ] {
            assert_eq!(a.contains(q, false, 1.0), b.contains(q, false, 1.0));
        }
        assert!(a.contains(Point::new(30.0, 20.0), false, 1.0).hit);
    }

    #[test]
    fn test_incomplete_rectangle_never_hits() {
        let mut shape = Shape::new(ShapeKind::Rectangle);
        assert_eq!(shape.contains(Point::new(0.0, 0.0), false, 1.0), Hit::MISS);
        shape.add_point(Point::new(0.0, 0.0));
        assert_eq!(shape.contains(Point::new(0.0, 0.0), false, 1.0), Hit::MISS);
    }

    #[test]
    fn test_polygon_unit_square() {
        let square = unit_square();
        assert!(square.contains(Point::new(0.5, 0.5), false, 1.0).hit);
        assert!(!square.contains(Point::new(2.0, 2.0), false, 1.0).hit);
    }

    #[test]
    fn test_vertex_hit_wins_in_insertion_order() {
        let mut shape = rect((10.0, 10.0), (12.0, 12.0));
        shape.set_vertex_side(10.0, false);
        // Both handles contain (11, 11); the first one wins.
        let hit = shape.contains(Point::new(11.0, 11.0), true, 1.0);
        assert_eq!(hit.vertex, Some(0));
        // Without vertices the body is hit.
        let body = shape.contains(Point::new(11.0, 11.0), false, 1.0);
        assert_eq!(body, Hit { hit: true, vertex: None });
    }

    #[test]
    fn test_vertex_bounds_are_inclusive() {
        let v = Vertex::new(Point::new(100.0, 100.0), 20.0, false);
        assert!(v.contains(Point::new(110.0, 90.0), 1.0));
        assert!(!v.contains(Point::new(110.1, 100.0), 1.0));
    }

    #[test]
    fn test_fixed_vertex_shrinks_with_zoom() {
        let v = Vertex::new(Point::new(0.0, 0.0), 20.0, true);
        assert_eq!(v.extent(2.0), 10.0);
        assert!(!v.contains(Point::new(6.0, 0.0), 2.0));
        let free = Vertex::new(Point::new(0.0, 0.0), 20.0, false);
        assert!(free.contains(Point::new(6.0, 0.0), 2.0));
    }

    #[test]
    fn test_vertex_outside_body_is_hit() {
        let mut shape = rect((10.0, 10.0), (50.0, 40.0));
        shape.set_vertex_side(10.0, false);
        let hit = shape.contains(Point::new(54.0, 44.0), true, 1.0);
        assert_eq!(hit.vertex, Some(1));
        assert!(!shape.contains(Point::new(54.0, 44.0), false, 1.0).hit);
    }

    #[test]
    fn test_move_point_and_move_all() {
        let mut shape = rect((0.0, 0.0), (10.0, 10.0));
        shape.move_point(1, 5.0, -5.0);
        assert_eq!(shape.points()[1], Point::new(15.0, 5.0));
        shape.move_all(1.0, 1.0);
        assert_eq!(shape.points(), vec![Point::new(1.0, 1.0), Point::new(16.0, 6.0)]);
        shape.move_point(7, 1.0, 1.0);
        assert_eq!(shape.len(), 2);
    }

    #[test]
    fn test_remove_point_keeps_selection_consistent() {
        let mut shape = unit_square();
        shape.select(Some(3));
        assert_eq!(shape.remove_point(1), Some(Point::new(1.0, 0.0)));
        assert_eq!(shape.selected_vertex(), Some(2));
        assert!(shape.vertices()[2].selected);
        assert_eq!(shape.remove_point(2), Some(Point::new(0.0, 1.0)));
        assert_eq!(shape.selected_vertex(), None);
        assert_eq!(shape.remove_point(10), None);
        assert_eq!(shape.len(), 2);
    }

    #[test]
    fn test_selection_styles() {
        let mut shape = unit_square();
        let red = Color::rgb(255, 0, 0);
        shape.set_color(red);

        let idle = shape.style(Color::WHITE);
        assert_eq!(idle.border, red);
        assert_eq!(idle.fill, red.with_alpha(DEFAULT_FILL_ALPHA));

        shape.select(None);
        assert_eq!(shape.style(Color::WHITE).border, Color::WHITE);
        assert_eq!(shape.vertex_style(0, Color::WHITE).fill, red);

        shape.select(Some(2));
        assert_eq!(shape.style(Color::WHITE).border, red);
        assert_eq!(shape.vertex_style(2, Color::WHITE).fill, Color::WHITE);
        assert_eq!(shape.vertex_style(1, Color::WHITE).fill, red);
        assert!(shape.vertices()[2].selected && !shape.vertices()[1].selected);

        shape.clear_selection();
        assert!(!shape.is_selected());
        assert!(shape.vertices().iter().all(|v| !v.selected));
    }
}
