// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for annotation, label and raster files.

pub mod export;
pub mod media;
pub mod serialization;
pub mod store;
