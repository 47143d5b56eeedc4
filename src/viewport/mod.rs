//! Zoom and pan state shared by the charts that support it.
//!
//! A `ViewportTransform` maps world coordinates to screen coordinates as
//! `screen = world × scale + translate`. The controller owns one, clamps the
//! scale, keeps the visible window inside the translate extent and runs
//! animated zooms along a smooth zoom path.

mod zoom;

use serde::Deserialize;
use tracing::debug;

pub use zoom::{ZoomAnimation, ZoomPath, ZoomView, ease_cubic_in_out, interpolate_zoom};

/// `[[x0, y0], [x1, y1]]` in world coordinates.
pub type Extent = [[f64; 2]; 2];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewportTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    pub fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            scale,
            translate_x,
            translate_y,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.apply_x(x), self.apply_y(y))
    }

    pub fn apply_x(&self, x: f64) -> f64 {
        x * self.scale + self.translate_x
    }

    pub fn apply_y(&self, y: f64) -> f64 {
        y * self.scale + self.translate_y
    }

    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        (self.invert_x(x), self.invert_y(y))
    }

    pub fn invert_x(&self, x: f64) -> f64 {
        (x - self.translate_x) / self.scale
    }

    pub fn invert_y(&self, y: f64) -> f64 {
        (y - self.translate_y) / self.scale
    }

    /// Shift by a world-space offset.
    fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            translate_x: self.translate_x + self.scale * dx,
            translate_y: self.translate_y + self.scale * dy,
            ..self
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// World-space bounds the visible window must stay inside. `None` leaves
    /// panning unbounded.
    pub translate_extent: Option<Extent>,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
            min_scale: 0.5,
            max_scale: 2.0,
            translate_extent: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    /// Screen-space drag delta.
    Pan { dx: f64, dy: f64 },
    /// Multiplicative zoom keeping the screen point `anchor` fixed.
    Zoom { factor: f64, anchor: (f64, f64) },
}

#[derive(Clone, Copy, Debug)]
struct Transition {
    animation: ZoomAnimation,
    target: ViewportTransform,
    /// Side length of the viewport used to convert views back to scales.
    side: f64,
}

#[derive(Clone, Debug)]
pub struct ViewportController {
    config: ViewportConfig,
    transform: ViewportTransform,
    transition: Option<Transition>,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        let mut controller = Self {
            config,
            transform: ViewportTransform::IDENTITY,
            transition: None,
        };
        controller.transform = controller.constrain(ViewportTransform::IDENTITY);
        controller
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn current_transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Resizes the viewport and re-applies the constraint.
    pub fn set_size(&mut self, width: f64, height: f64) {
        if self.config.width == width && self.config.height == height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.transform = self.constrain(self.transform);
    }

    /// Applies a user gesture immediately, interrupting any animation.
    /// Out-of-range gestures are clipped to the nearest valid transform.
    pub fn apply_user_gesture(&mut self, gesture: Gesture) -> ViewportTransform {
        self.transition = None;
        let next = match gesture {
            Gesture::Pan { dx, dy } => ViewportTransform {
                translate_x: self.transform.translate_x + dx,
                translate_y: self.transform.translate_y + dy,
                ..self.transform
            },
            Gesture::Zoom { factor, anchor } => {
                let scale = self.clamp_scale(self.transform.scale * factor);
                let (wx, wy) = self.transform.invert(anchor.0, anchor.1);
                ViewportTransform::new(scale, anchor.0 - wx * scale, anchor.1 - wy * scale)
            }
        };
        self.transform = self.constrain(next);
        self.transform
    }

    /// Animates so that the world rectangle `target` fills the viewport.
    pub fn zoom_to(&mut self, target: Extent, duration_ms: f64) {
        let [[x0, y0], [x1, y1]] = target;
        let (width, height) = (self.config.width, self.config.height);
        let (dx, dy) = ((x1 - x0).abs(), (y1 - y0).abs());
        let scale = if dx > 0.0 && dy > 0.0 {
            (width / dx).min(height / dy)
        } else {
            self.transform.scale
        };
        let scale = self.clamp_scale(scale);
        let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
        let transform =
            ViewportTransform::new(scale, width / 2.0 - cx * scale, height / 2.0 - cy * scale);
        self.animate_to(transform, duration_ms);
    }

    /// Animates to an explicit transform (scale clamped, pan constrained).
    pub fn animate_to(&mut self, target: ViewportTransform, duration_ms: f64) {
        let target = self.constrain(ViewportTransform {
            scale: self.clamp_scale(target.scale),
            ..target
        });
        if duration_ms <= 0.0 {
            self.transition = None;
            self.transform = target;
            return;
        }

        let side = self.config.width.max(self.config.height);
        let from = self.view_of(self.transform, side);
        let to = self.view_of(target, side);
        debug!(?target, duration_ms, "viewport transition started");
        self.transition = Some(Transition {
            animation: ZoomAnimation::new(from, to, duration_ms),
            target,
            side,
        });
    }

    /// Advances a running animation; returns whether it is still running.
    pub fn tick(&mut self, elapsed_ms: f64) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            return false;
        };
        let view = transition.animation.advance(elapsed_ms);
        if transition.animation.is_finished() {
            self.transform = transition.target;
            self.transition = None;
            return false;
        }

        // The path may swing outside the scale range mid-flight.
        let side = transition.side;
        let scale = self.clamp_scale(side / view.width);
        let (px, py) = (self.config.width / 2.0, self.config.height / 2.0);
        self.transform = self.constrain(ViewportTransform::new(
            scale,
            px - view.cx * scale,
            py - view.cy * scale,
        ));
        true
    }

    /// Stops an animation where it is.
    pub fn cancel(&mut self) {
        self.transition = None;
    }

    pub fn reset(&mut self) {
        self.transition = None;
        self.transform = self.constrain(ViewportTransform::IDENTITY);
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        let (min, max) = (self.config.min_scale, self.config.max_scale.max(self.config.min_scale));
        if scale.is_finite() { scale.clamp(min, max) } else { min }
    }

    /// World-space view centred on the viewport centre.
    fn view_of(&self, transform: ViewportTransform, side: f64) -> ZoomView {
        let (cx, cy) = transform.invert(self.config.width / 2.0, self.config.height / 2.0);
        ZoomView::new(cx, cy, side / transform.scale)
    }

    /// Keeps the visible window inside the translate extent; if the window is
    /// larger than the extent along an axis, centres the extent instead.
    fn constrain(&self, transform: ViewportTransform) -> ViewportTransform {
        let Some([[ex0, ey0], [ex1, ey1]]) = self.config.translate_extent else {
            return transform;
        };
        let dx0 = transform.invert_x(0.0) - ex0;
        let dx1 = transform.invert_x(self.config.width) - ex1;
        let dy0 = transform.invert_y(0.0) - ey0;
        let dy1 = transform.invert_y(self.config.height) - ey1;
        transform.translated(axis_correction(dx0, dx1), axis_correction(dy0, dy1))
    }
}

fn axis_correction(d0: f64, d1: f64) -> f64 {
    if d1 > d0 {
        (d0 + d1) / 2.0
    } else if d0 < 0.0 {
        d0
    } else {
        d1.max(0.0)
    }
}
