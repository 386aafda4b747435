// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Domain errors.
//!
//! I/O failures travel as `anyhow::Error` with the offending path attached;
//! the variants here describe annotation data that is well-formed JSON but
//! does not make sense.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnnotationError {
    #[error("unknown shape type '{0}'")]
    UnknownShapeType(String),

    #[error("frame dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("label '{0}' is not part of the label set")]
    UnknownLabel(String),

    #[error("label must not be empty")]
    EmptyLabel,

    #[error("{kind} needs at least {required} points, has {actual}")]
    TooFewPoints {
        kind: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("no shape is being built")]
    NotBuilding,

    #[error("no shape is selected")]
    NothingSelected,

    #[error("editing is not permitted in the current mode")]
    EditDenied,
}
