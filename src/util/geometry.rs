// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the point type shared by view space and image
//! space, normalization of pixel coordinates, and the two point-in-shape
//! tests used by hit-testing.

use serde::{Deserialize, Serialize};

/// A 2D point. Whether it lives in view space or image space is decided by
/// the caller; the two are only converted through `AffineMapper`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Return this point shifted by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Convert pixel coordinates to normalized coordinates (0.0 to 1.0).
pub fn normalize_coordinates(pixel_x: f64, pixel_y: f64, width: u32, height: u32) -> Point {
    Point {
        x: pixel_x / width as f64,
        y: pixel_y / height as f64,
    }
}

/// Inclusive test against the axis-aligned box spanned by two opposite
/// corners given in any order.
pub fn point_in_rect(target: Point, a: Point, b: Point) -> bool {
    let left = a.x.min(b.x);
    let right = a.x.max(b.x);
    let top = a.y.min(b.y);
    let bottom = a.y.max(b.y);
    (left..=right).contains(&target.x) && (top..=bottom).contains(&target.y)
}

/// Even-odd crossing-number test.
///
/// Points exactly on an edge or vertex get whatever answer the crossing
/// count produces; horizontal edges never cross the ray.
pub fn point_in_polygon(target: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    let mut crossings = 0usize;
    for i in 0..n {
        let p1 = polygon[i];
        let p2 = polygon[(i + 1) % n];
        if (p1.y > target.y) != (p2.y > target.y) {
            let intercept = p1.x + (target.y - p1.y) * (p2.x - p1.x) / (p2.y - p1.y);
            if target.x < intercept {
                crossings += 1;
            }
        }
    }
    crossings % 2 == 1
}
