use eframe::egui::{Painter, PointerButton, Pos2, Rect, Sense, Ui, pos2, vec2};

use chart_atlas::interaction::Tooltip;

/// A chart's drawing surface: the chart's own `width × height` coordinate
/// space, centred in the space the panel gives it.
pub(super) struct Canvas {
    rect: Rect,
    origin: Pos2,
}

/// Pointer activity over the canvas this frame, in chart coordinates.
#[derive(Debug, Default)]
pub(super) struct PointerInput {
    pub hover: Option<(f64, f64)>,
    pub clicked: Option<(f64, f64)>,
    pub drag_started: Option<(f64, f64)>,
    pub dragging: bool,
    pub drag_delta: (f64, f64),
    pub drag_stopped: bool,
    pub scroll: f32,
}

impl PointerInput {
    /// Wheel zoom factor for this frame, if the wheel moved.
    pub fn zoom_factor(&self) -> Option<f64> {
        (self.scroll.abs() > f32::EPSILON)
            .then(|| f64::from((1.0 + self.scroll * 0.0018).clamp(0.85, 1.15)))
    }
}

impl Canvas {
    pub fn allocate(ui: &mut Ui, size: (f64, f64)) -> (Self, Painter, PointerInput) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        let (width, height) = (size.0 as f32, size.1 as f32);
        let origin = rect.min
            + vec2(
                ((rect.width() - width) / 2.0).max(0.0),
                ((rect.height() - height) / 2.0).max(0.0),
            );
        let canvas = Self { rect, origin };

        let pointer = response
            .interact_pointer_pos()
            .or_else(|| response.hover_pos())
            .map(|pos| canvas.to_local(pos));
        let scroll = if response.hovered() {
            ui.input(|input| input.raw_scroll_delta.y)
        } else {
            0.0
        };
        let delta = response.drag_delta();

        let input = PointerInput {
            hover: pointer,
            clicked: pointer.filter(|_| response.clicked_by(PointerButton::Primary)),
            drag_started: pointer.filter(|_| response.drag_started_by(PointerButton::Primary)),
            dragging: response.dragged_by(PointerButton::Primary),
            drag_delta: (f64::from(delta.x), f64::from(delta.y)),
            drag_stopped: response.drag_stopped(),
            scroll,
        };
        (canvas, painter, input)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn pos(&self, x: f64, y: f64) -> Pos2 {
        pos2(self.origin.x + x as f32, self.origin.y + y as f32)
    }

    pub fn to_local(&self, pos: Pos2) -> (f64, f64) {
        (
            f64::from(pos.x - self.origin.x),
            f64::from(pos.y - self.origin.y),
        )
    }

    pub fn screen_rect(&self, rect: &chart_atlas::layout::Rect) -> Rect {
        Rect::from_min_max(self.pos(rect.x0, rect.y0), self.pos(rect.x1, rect.y1))
    }

    /// Moves a chart tooltip into screen space.
    pub fn tooltip(&self, tooltip: &Tooltip) -> Tooltip {
        let pos = self.pos(tooltip.x, tooltip.y);
        Tooltip {
            x: f64::from(pos.x),
            y: f64::from(pos.y),
            text: tooltip.text.clone(),
        }
    }
}
