// SPDX-License-Identifier: GPL-3.0-only

//! Deterministic synthetic depth scenes
//!
//! A flat floor seen straight down by the sensor, optionally with a
//! rectangular box standing on it. Used by tests and the `synth` command.

use crate::config::Optics;
use crate::measurement::DepthGrid;

/// A box standing on the floor, centered in the frame (millimeters)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticBox {
    pub width_mm: f64,
    pub length_mm: f64,
    pub height_mm: u16,
}

/// Empty floor plus an optional box
#[derive(Debug, Clone)]
pub struct SyntheticScene {
    pub grid_width: u32,
    pub grid_height: u32,
    pub floor_mm: u16,
    pub optics: Optics,
    pub object: Option<SyntheticBox>,
}

impl SyntheticScene {
    pub fn new(grid_width: u32, grid_height: u32, floor_mm: u16) -> Self {
        Self {
            grid_width,
            grid_height,
            floor_mm,
            optics: Optics::default(),
            object: None,
        }
    }

    pub fn with_box(mut self, object: SyntheticBox) -> Self {
        self.object = Some(object);
        self
    }

    /// The scene without the box
    pub fn baseline(&self) -> DepthGrid {
        DepthGrid::filled(self.grid_width, self.grid_height, self.floor_mm)
    }

    /// Pixel footprint `(columns, rows)` of the box's top face
    pub fn footprint(&self) -> Option<(u32, u32)> {
        let object = self.object?;
        let top_mm = f64::from(self.floor_mm.saturating_sub(object.height_mm));
        let pixels = |size_mm: f64, fov_deg: f64, total: u32| {
            let span = 2.0 * top_mm * (fov_deg / 2.0).to_radians().tan();
            ((size_mm / span * f64::from(total)).round() as u32).min(total)
        };
        Some((
            pixels(object.width_mm, self.optics.horizontal_fov_deg, self.grid_width),
            pixels(object.length_mm, self.optics.vertical_fov_deg, self.grid_height),
        ))
    }

    /// The scene with the box, if any
    pub fn frame(&self) -> DepthGrid {
        let mut grid = self.baseline();
        let (Some(object), Some((columns, rows))) = (self.object, self.footprint()) else {
            return grid;
        };

        let top_mm = self.floor_mm.saturating_sub(object.height_mm);
        let x0 = (self.grid_width - columns) / 2;
        let y0 = (self.grid_height - rows) / 2;
        for row in y0..y0 + rows {
            for column in x0..x0 + columns {
                grid.set(column, row, top_mm);
            }
        }
        grid
    }
}
