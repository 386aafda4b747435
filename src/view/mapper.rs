// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! View/image coordinate mapping.
//!
//! `AffineMapper` owns the scale+translate transform that places the image
//! inside the viewport. Every touch point goes through [`AffineMapper::to_image`]
//! before it reaches the shape model, and every zoom or pan re-applies the
//! boundary clamp so the image is either centered (when it fits) or covers
//! the viewport edge to edge (when it does not).

use crate::util::geometry::Point;
use crate::view::permission::{Permission, PermissionSet};

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Scale followed by translation: `view = image * s + t`.
///
/// `sx` and `sy` are always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub sx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    pub fn identity() -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Image space to view space.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.sx + self.tx, p.y * self.sy + self.ty)
    }

    /// View space to image space (exact inverse of [`apply`](Self::apply)).
    pub fn invert(&self, p: Point) -> Point {
        Point::new((p.x - self.tx) / self.sx, (p.y - self.ty) / self.sy)
    }
}

/// Translation that keeps one axis inside the viewport.
fn clamp_axis(translate: f64, image_len: f64, view_len: f64) -> f64 {
    if image_len <= view_len {
        (view_len - image_len) / 2.0
    } else {
        translate.clamp(view_len - image_len, 0.0)
    }
}

/// Pan/zoom state for one displayed raster.
#[derive(Debug, Clone)]
pub struct AffineMapper {
    transform: AffineTransform,
    intrinsic: Size,
    viewport: Size,
    permissions: PermissionSet,
}

impl AffineMapper {
    /// Identity transform for a raster of size `intrinsic` shown in `viewport`.
    ///
    /// No capabilities are granted until [`set_permissions`](Self::set_permissions).
    pub fn new(intrinsic: Size, viewport: Size) -> Self {
        let mut mapper = Self {
            transform: AffineTransform::identity(),
            intrinsic,
            viewport,
            permissions: PermissionSet::none(),
        };
        mapper.clamp();
        mapper
    }

    pub fn transform(&self) -> AffineTransform {
        self.transform
    }

    pub fn intrinsic(&self) -> Size {
        self.intrinsic
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Horizontal zoom factor.
    pub fn scale(&self) -> f64 {
        self.transform.sx
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn set_permissions(&mut self, permissions: PermissionSet) {
        self.permissions = permissions;
    }

    pub fn to_view(&self, p: Point) -> Point {
        self.transform.apply(p)
    }

    pub fn to_image(&self, p: Point) -> Point {
        self.transform.invert(p)
    }

    /// Convert a view-space displacement (a drag) into image space.
    pub fn to_image_delta(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx / self.transform.sx, dy / self.transform.sy)
    }

    /// Start over with a new raster: identity transform, then clamp.
    pub fn reset(&mut self, intrinsic: Size, viewport: Size) {
        self.transform = AffineTransform::identity();
        self.intrinsic = intrinsic;
        self.viewport = viewport;
        self.clamp();
    }

    /// The viewport was resized.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.clamp();
    }

    /// Multiply the zoom by `factor`, keeping `focal` (view space) fixed on
    /// screen before the clamp runs.
    ///
    /// Returns `false` and leaves the transform untouched when scaling is not
    /// permitted or `factor` is not a positive finite number.
    pub fn apply_scale(&mut self, factor: f64, focal: Point) -> bool {
        if !self.permissions.allows(Permission::Scale) {
            return false;
        }
        if !(factor.is_finite() && factor > 0.0) {
            log::warn!("Ignoring invalid scale factor {}", factor);
            return false;
        }
        let sx = self.transform.sx * factor;
        let sy = self.transform.sy * factor;
        if !(sx.is_finite() && sx > 0.0 && sy.is_finite() && sy > 0.0) {
            log::warn!("Ignoring scale factor {} that leaves the zoom out of range", factor);
            return false;
        }
        let t = &mut self.transform;
        t.sx = sx;
        t.sy = sy;
        t.tx = focal.x - (focal.x - t.tx) * factor;
        t.ty = focal.y - (focal.y - t.ty) * factor;
        self.clamp();
        true
    }

    /// Set an absolute zoom level around `focal`.
    pub fn set_scale(&mut self, scale: f64, focal: Point) -> bool {
        if !(scale.is_finite() && scale > 0.0) {
            log::warn!("Ignoring invalid scale {}", scale);
            return false;
        }
        let factor = scale / self.transform.sx;
        self.apply_scale(factor, focal)
    }

    /// Initial fit: image height matches the viewport height.
    pub fn fit_to_height(&mut self) -> bool {
        if self.intrinsic.height <= 0.0 || self.viewport.height <= 0.0 {
            return false;
        }
        self.set_scale(self.viewport.height / self.intrinsic.height, Point::default())
    }

    /// Move the image by `(dx, dy)` view pixels.
    ///
    /// Returns the displacement that survived the clamp, or `None` when
    /// panning is not permitted.
    pub fn apply_pan(&mut self, dx: f64, dy: f64) -> Option<Point> {
        if !self.permissions.allows(Permission::Pan) {
            return None;
        }
        let before = self.transform;
        self.transform.tx += dx;
        self.transform.ty += dy;
        self.clamp();
        Some(Point::new(
            self.transform.tx - before.tx,
            self.transform.ty - before.ty,
        ))
    }

    fn clamp(&mut self) {
        let t = &mut self.transform;
        let image_w = t.sx * self.intrinsic.width;
        let image_h = t.sy * self.intrinsic.height;
        t.tx = clamp_axis(t.tx, image_w, self.viewport.width);
        t.ty = clamp_axis(t.ty, image_h, self.viewport.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    fn mapper(intrinsic: (f64, f64), viewport: (f64, f64)) -> AffineMapper {
        let mut m = AffineMapper::new(
            Size::new(intrinsic.0, intrinsic.1),
            Size::new(viewport.0, viewport.1),
        );
        m.set_permissions(PermissionSet::all());
        m
    }

    #[test]
    fn test_to_image_inverts_to_view() {
        let t = AffineTransform {
            sx: 2.5,
            sy: 0.75,
            tx: -13.0,
            ty: 42.0,
        };
        let p = Point::new(17.0, -3.5);
        let back = t.invert(t.apply(p));
        assert!(close(back.x, p.x) && close(back.y, p.y));
    }

    #[test]
    fn test_small_image_is_centered() {
        let m = mapper((200.0, 100.0), (400.0, 300.0));
        let t = m.transform();
        assert!(close(t.tx, 100.0));
        assert!(close(t.ty, 100.0));
    }

    #[test]
    fn test_pan_ignored_on_fitting_axis() {
        let mut m = mapper((200.0, 1000.0), (400.0, 300.0));
        let applied = m.apply_pan(50.0, -100.0).unwrap();
        assert!(close(applied.x, 0.0));
        assert!(close(applied.y, -100.0));
        assert!(close(m.transform().tx, 100.0));
    }

    #[test]
    fn test_large_image_is_clamped_to_edges() {
        let mut m = mapper((1000.0, 1000.0), (400.0, 300.0));
        m.apply_pan(100.0, 100.0);
        assert!(close(m.transform().tx, 0.0));
        assert!(close(m.transform().ty, 0.0));

        m.apply_pan(-5000.0, -5000.0);
        assert!(close(m.transform().tx, -600.0));
        assert!(close(m.transform().ty, -700.0));
    }

    #[test]
    fn test_scale_then_reciprocal_restores_transform() {
        let mut m = mapper((1000.0, 1000.0), (500.0, 500.0));
        m.apply_pan(-250.0, -250.0);
        let before = m.transform();
        let focal = Point::new(250.0, 250.0);

        assert!(m.apply_scale(2.0, focal));
        assert!(m.apply_scale(0.5, focal));

        let after = m.transform();
        assert!(close(before.sx, after.sx));
        assert!(close(before.sy, after.sy));
        assert!(close(before.tx, after.tx));
        assert!(close(before.ty, after.ty));
    }

    #[test]
    fn test_scale_keeps_focal_point_fixed() {
        let mut m = mapper((1000.0, 1000.0), (500.0, 500.0));
        m.apply_pan(-250.0, -250.0);
        let focal = Point::new(200.0, 300.0);
        let anchor = m.to_image(focal);
        m.apply_scale(1.5, focal);
        let moved = m.to_view(anchor);
        assert!(close(moved.x, focal.x));
        assert!(close(moved.y, focal.y));
    }

    #[test]
    fn test_zooming_out_recenters() {
        let mut m = mapper((1000.0, 1000.0), (500.0, 500.0));
        m.apply_scale(0.25, Point::new(0.0, 0.0));
        let t = m.transform();
        assert!(close(t.sx, 0.25));
        assert!(close(t.tx, 125.0));
        assert!(close(t.ty, 125.0));
    }

    #[test]
    fn test_gated_operations_are_noops() {
        let mut m = AffineMapper::new(Size::new(1000.0, 1000.0), Size::new(500.0, 500.0));
        let before = m.transform();
        assert!(!m.apply_scale(2.0, Point::new(10.0, 10.0)));
        assert!(m.apply_pan(-10.0, -10.0).is_none());
        assert_eq!(m.transform(), before);

        m.set_permissions(PermissionSet::from_slice(&[Permission::Pan]));
        assert!(!m.apply_scale(2.0, Point::new(10.0, 10.0)));
        assert!(m.apply_pan(-10.0, -10.0).is_some());
    }

    #[test]
    fn test_invalid_factor_rejected() {
        let mut m = mapper((100.0, 100.0), (50.0, 50.0));
        let before = m.transform();
        assert!(!m.apply_scale(0.0, Point::default()));
        assert!(!m.apply_scale(-2.0, Point::default()));
        assert!(!m.apply_scale(f64::NAN, Point::default()));
        assert_eq!(m.transform(), before);
    }

    #[test]
    fn test_scale_cannot_collapse_to_zero() {
        let mut m = mapper((100.0, 100.0), (50.0, 50.0));
        assert!(m.apply_scale(1e-200, Point::default()));
        let before = m.transform();
        assert!(!m.apply_scale(1e-200, Point::default()));
        assert_eq!(m.transform(), before);
        assert!(m.transform().sx > 0.0 && m.transform().sy > 0.0);

        let p = m.to_image(Point::new(10.0, 10.0));
        assert!(p.x.is_finite() && p.y.is_finite());
        assert!(m.set_scale(1.0, Point::default()));
        assert!(close(m.scale(), 1.0));
    }

    #[test]
    fn test_scale_cannot_overflow() {
        let mut m = mapper((100.0, 100.0), (50.0, 50.0));
        assert!(m.apply_scale(1e300, Point::default()));
        let before = m.transform();
        assert!(!m.apply_scale(1e300, Point::default()));
        assert_eq!(m.transform(), before);
    }

    #[test]
    fn test_fit_to_height() {
        let mut m = mapper((1920.0, 1080.0), (800.0, 540.0));
        assert!(m.fit_to_height());
        let t = m.transform();
        assert!(close(t.sx, 0.5));
        assert!(close(t.ty, 0.0));
        // 960 wide image in an 800 wide view starts at its left edge.
        assert!(close(t.tx, 0.0));
    }

    #[test]
    fn test_delta_conversion() {
        let mut m = mapper((1000.0, 1000.0), (500.0, 500.0));
        m.set_scale(4.0, Point::default());
        let (dx, dy) = m.to_image_delta(8.0, -2.0);
        assert!(close(dx, 2.0));
        assert!(close(dy, -0.5));
    }
}
