// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Framelabel - frame annotation core
//!
//! Shapes (rectangles and polygons) drawn over still images and video
//! frames, the pan/zoom mapping between image and view space, sparse
//! per-frame storage for videos, and export to normalized text files.
//!
//! The crate has no user interface. A front end owns one [`models::editor::Editor`]
//! and one [`view::mapper::AffineMapper`] per displayed frame and feeds them
//! pointer input already converted to image space.

pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod task;
pub mod util;
pub mod view;
