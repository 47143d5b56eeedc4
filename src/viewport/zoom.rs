use std::f64::consts::SQRT_2;

const RHO: f64 = SQRT_2;
const RHO2: f64 = 2.0;
const RHO4: f64 = 4.0;
const EPSILON2: f64 = 1e-12;

/// A square window onto world space: centre and side length.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ZoomView {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
}

impl ZoomView {
    pub fn new(cx: f64, cy: f64, width: f64) -> Self {
        Self { cx, cy, width }
    }

    /// World to screen for a canvas of `width × height` showing this view.
    pub fn project(&self, x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
        let k = self.scale(width);
        ((x - self.cx) * k + width / 2.0, (y - self.cy) * k + height / 2.0)
    }

    pub fn unproject(&self, x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
        let k = self.scale(width);
        if k == 0.0 {
            return (self.cx, self.cy);
        }
        ((x - width / 2.0) / k + self.cx, (y - height / 2.0) / k + self.cy)
    }

    pub fn scale(&self, width: f64) -> f64 {
        if self.width > 0.0 { width / self.width } else { 0.0 }
    }
}

/// Smooth pan-and-zoom path between two views (van Wijk and Nuij), ρ = √2.
#[derive(Clone, Copy, Debug)]
pub struct ZoomPath {
    from: ZoomView,
    to: ZoomView,
    kind: PathKind,
    length: f64,
}

#[derive(Clone, Copy, Debug)]
enum PathKind {
    /// Views share a centre: pure exponential zoom.
    Concentric,
    /// Hyperbolic arc; `r0` is the start parameter, `d` the centre distance.
    Arc { r0: f64, d: f64 },
    /// A degenerate (zero-width) endpoint: plain linear blend.
    Linear,
}

pub fn interpolate_zoom(from: ZoomView, to: ZoomView) -> ZoomPath {
    let (dx, dy) = (to.cx - from.cx, to.cy - from.cy);
    let d2 = dx * dx + dy * dy;
    let (w0, w1) = (from.width, to.width);

    if !(w0 > 0.0 && w1 > 0.0) {
        return ZoomPath {
            from,
            to,
            kind: PathKind::Linear,
            length: d2.sqrt(),
        };
    }

    if d2 < EPSILON2 {
        return ZoomPath {
            from,
            to,
            kind: PathKind::Concentric,
            length: (w1 / w0).ln() / RHO,
        };
    }

    let d = d2.sqrt();
    let b0 = (w1 * w1 - w0 * w0 + RHO4 * d2) / (2.0 * w0 * RHO2 * d);
    let b1 = (w1 * w1 - w0 * w0 - RHO4 * d2) / (2.0 * w1 * RHO2 * d);
    let r0 = ((b0 * b0 + 1.0).sqrt() - b0).ln();
    let r1 = ((b1 * b1 + 1.0).sqrt() - b1).ln();
    ZoomPath {
        from,
        to,
        kind: PathKind::Arc { r0, d },
        length: (r1 - r0) / RHO,
    }
}

impl ZoomPath {
    /// View at `t ∈ [0, 1]`; the endpoints are returned exactly.
    pub fn at(&self, t: f64) -> ZoomView {
        if t <= 0.0 {
            return self.from;
        }
        if t >= 1.0 {
            return self.to;
        }
        let (dx, dy) = (self.to.cx - self.from.cx, self.to.cy - self.from.cy);
        let w0 = self.from.width;
        match self.kind {
            PathKind::Linear => ZoomView::new(
                self.from.cx + t * dx,
                self.from.cy + t * dy,
                w0 + t * (self.to.width - w0),
            ),
            PathKind::Concentric => ZoomView::new(
                self.from.cx + t * dx,
                self.from.cy + t * dy,
                w0 * (RHO * t * self.length).exp(),
            ),
            PathKind::Arc { r0, d } => {
                let s = t * self.length;
                let cosh_r0 = r0.cosh();
                let u = w0 / (RHO2 * d) * (cosh_r0 * (RHO * s + r0).tanh() - r0.sinh());
                ZoomView::new(
                    self.from.cx + u * dx,
                    self.from.cy + u * dy,
                    w0 * cosh_r0 / (RHO * s + r0).cosh(),
                )
            }
        }
    }

    /// Recommended duration in milliseconds, proportional to path length.
    pub fn natural_duration_ms(&self) -> f64 {
        self.length.abs() * 1000.0 * RHO / SQRT_2
    }
}

pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Eased traversal of a `ZoomPath` driven by elapsed frame time.
#[derive(Clone, Copy, Debug)]
pub struct ZoomAnimation {
    path: ZoomPath,
    elapsed_ms: f64,
    duration_ms: f64,
}

impl ZoomAnimation {
    pub fn new(from: ZoomView, to: ZoomView, duration_ms: f64) -> Self {
        Self {
            path: interpolate_zoom(from, to),
            elapsed_ms: 0.0,
            duration_ms: duration_ms.max(0.0),
        }
    }

    pub fn advance(&mut self, elapsed_ms: f64) -> ZoomView {
        self.elapsed_ms += elapsed_ms.max(0.0);
        self.current()
    }

    pub fn current(&self) -> ZoomView {
        if self.is_finished() {
            return self.path.to;
        }
        self.path.at(ease_cubic_in_out(self.elapsed_ms / self.duration_ms))
    }

    pub fn target(&self) -> ZoomView {
        self.path.to
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: ZoomView, b: ZoomView) -> bool {
        (a.cx - b.cx).abs() < 1e-6 && (a.cy - b.cy).abs() < 1e-6 && (a.width - b.width).abs() < 1e-6
    }

    #[test]
    fn path_hits_both_endpoints() {
        let from = ZoomView::new(350.0, 350.0, 700.0);
        let to = ZoomView::new(200.0, 420.0, 120.0);
        let path = interpolate_zoom(from, to);
        assert!(close(path.at(0.0), from));
        assert!(close(path.at(1.0), to));
        assert!(close(path.at(1.0 - 1e-12), to));
    }

    #[test]
    fn concentric_zoom_is_geometric() {
        let path = interpolate_zoom(ZoomView::new(0.0, 0.0, 100.0), ZoomView::new(0.0, 0.0, 400.0));
        assert!((path.at(0.5).width - 200.0).abs() < 1e-9);
    }

    #[test]
    fn arc_path_zooms_out_mid_flight() {
        let from = ZoomView::new(0.0, 0.0, 10.0);
        let to = ZoomView::new(1000.0, 0.0, 10.0);
        let middle = interpolate_zoom(from, to).at(0.5);
        assert!(middle.width > 10.0);
        assert!((middle.cx - 500.0).abs() < 1e-6);
    }

    #[test]
    fn easing_is_symmetric() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert!((ease_cubic_in_out(0.25) + ease_cubic_in_out(0.75) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn animation_lands_on_target() {
        let to = ZoomView::new(10.0, 20.0, 30.0);
        let mut animation = ZoomAnimation::new(ZoomView::new(0.0, 0.0, 100.0), to, 750.0);
        let early = animation.advance(100.0);
        assert!(!animation.is_finished());
        assert!(early.width < 100.0);
        assert_eq!(animation.advance(700.0), to);
        assert!(animation.is_finished());
    }

    #[test]
    fn projection_round_trips() {
        let view = ZoomView::new(100.0, 50.0, 200.0);
        let (sx, sy) = view.project(150.0, 75.0, 400.0, 400.0);
        assert_eq!((sx, sy), (300.0, 250.0));
        assert_eq!(view.unproject(sx, sy, 400.0, 400.0), (150.0, 75.0));
    }
}
