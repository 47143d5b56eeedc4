mod pack;
mod partition;
mod pie;
mod stack;
mod treemap;

use std::f64::consts::{FRAC_PI_2, TAU};

use thiserror::Error;

use crate::hierarchy::Hierarchy;

pub use pack::{PackConfig, PackLayout, enclose, pack, pack_siblings};
pub use partition::{PartitionConfig, PartitionLayout, partition};
pub use pie::{PieConfig, pie};
pub use stack::{StackSegment, stack};
pub use treemap::{TreemapConfig, TreemapLayout, treemap};

/// Degenerate inputs that still produce an (empty or zero-size) layout.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("hierarchy has no nodes below the root")]
    EmptyHierarchy,
    #[error("hierarchy total value is zero")]
    ZeroTotalValue,
    #[error("canvas has no drawable area")]
    DegenerateCanvas,
}

/// Reports why a hierarchy/canvas pair lays out as an empty picture.
pub fn check_input(tree: &Hierarchy, width: f64, height: f64) -> Result<(), LayoutError> {
    if !(width > 0.0 && height > 0.0) {
        return Err(LayoutError::DegenerateCanvas);
    }
    if tree.is_empty() {
        return Err(LayoutError::EmptyHierarchy);
    }
    if tree.value(tree.root()) <= 0.0 {
        return Err(LayoutError::ZeroTotalValue);
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let (dx, dy) = (x - self.x, y - self.y);
        dx * dx + dy * dy <= self.r * self.r
    }
}

/// Angular band. Angles run clockwise from 12 o'clock, in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArcGeometry {
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl ArcGeometry {
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Midpoint of the band in centre-relative screen coordinates.
    pub fn centroid(&self) -> (f64, f64) {
        let radius = (self.inner_radius + self.outer_radius) / 2.0;
        let angle = (self.start_angle + self.end_angle) / 2.0 - FRAC_PI_2;
        (angle.cos() * radius, angle.sin() * radius)
    }

    /// Text rotation in degrees that keeps labels upright along the radius.
    pub fn label_rotation(&self) -> f64 {
        let angle = (self.start_angle + self.end_angle) / 2.0 * 180.0 / std::f64::consts::PI;
        if angle < 180.0 { angle - 90.0 } else { angle + 90.0 }
    }

    /// Centre-relative point hit test.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let radius = (x * x + y * y).sqrt();
        if radius < self.inner_radius || radius >= self.outer_radius {
            return false;
        }
        let angle = clockwise_angle(x, y);
        angle >= self.start_angle && angle < self.end_angle
    }
}

/// Angle of `(x, y)` measured clockwise from 12 o'clock in `[0, 2π)`.
pub fn clockwise_angle(x: f64, y: f64) -> f64 {
    let angle = x.atan2(-y);
    if angle < 0.0 { angle + TAU } else { angle }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Positive-area intersection test; shared edges do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }
}
