// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label colors.
//!
//! The palette is a fixed table computed at compile time. Each channel is
//! either fully on or off depending on one of the three low bits of the
//! raw entry index, so only 8 distinct colors exist. Raw entry 0 (black) is
//! dropped from the table; raw entries 8, 16, ... are black again.

use serde::{Deserialize, Serialize};

/// Number of entries handed out by [`palette_color`].
pub const PALETTE_SIZE: usize = 255;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with its alpha scaled by `factor` (clamped to 0..=1).
    pub fn with_alpha(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        Self {
            a: (self.a as f32 * factor) as u8,
            ..self
        }
    }
}

const fn channel(index: usize, bit: usize) -> u8 {
    if (index >> bit) & 1 == 1 {
        255
    } else {
        0
    }
}

const fn raw_color(index: usize) -> Color {
    Color::rgb(channel(index, 0), channel(index, 1), channel(index, 2))
}

const fn build_table() -> [Color; PALETTE_SIZE] {
    let mut table = [Color::BLACK; PALETTE_SIZE];
    let mut i = 0;
    while i < PALETTE_SIZE {
        table[i] = raw_color(i + 1);
        i += 1;
    }
    table
}

static PALETTE: [Color; PALETTE_SIZE] = build_table();

/// Color for the label at `index` of the label set.
pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE_SIZE]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_entries() {
        assert_eq!(palette_color(0), Color::rgb(255, 0, 0));
        assert_eq!(palette_color(1), Color::rgb(0, 255, 0));
        assert_eq!(palette_color(2), Color::rgb(255, 255, 0));
        assert_eq!(palette_color(3), Color::rgb(0, 0, 255));
        assert_eq!(palette_color(6), Color::rgb(255, 255, 255));
    }

    #[test]
    fn test_only_eight_distinct_colors() {
        let distinct: std::collections::HashSet<Color> =
            (0..PALETTE_SIZE).map(palette_color).collect();
        assert_eq!(distinct.len(), 8);
        // Index 7 maps to raw entry 8, whose low three bits are zero.
        assert_eq!(palette_color(7), Color::BLACK);
    }

    #[test]
    fn test_wraps_at_table_size() {
        assert_eq!(palette_color(PALETTE_SIZE), palette_color(0));
        assert_eq!(palette_color(PALETTE_SIZE + 4), palette_color(4));
    }

    #[test]
    fn test_with_alpha() {
        let c = Color::rgb(10, 20, 30).with_alpha(0.5);
        assert_eq!(c.a, 127);
        assert_eq!((c.r, c.g, c.b), (10, 20, 30));
        assert_eq!(Color::WHITE.with_alpha(2.0).a, 255);
    }
}
