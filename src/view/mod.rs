// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image-to-view mapping and capability gating.

pub mod mapper;
pub mod permission;
