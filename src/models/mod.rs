// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data models.

pub mod annotation;
pub mod editor;
pub mod frame;
pub mod label;
pub mod video;
