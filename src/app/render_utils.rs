use std::f64::consts::FRAC_PI_2;

use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2, pos2};

use chart_atlas::layout::ArcGeometry;

/// Tableau 10, the gallery's categorical palette.
const CATEGORY_PALETTE: [Color32; 10] = [
    Color32::from_rgb(78, 121, 167),
    Color32::from_rgb(242, 142, 44),
    Color32::from_rgb(225, 87, 89),
    Color32::from_rgb(118, 183, 178),
    Color32::from_rgb(89, 161, 79),
    Color32::from_rgb(237, 201, 73),
    Color32::from_rgb(175, 122, 161),
    Color32::from_rgb(255, 157, 167),
    Color32::from_rgb(156, 117, 95),
    Color32::from_rgb(186, 176, 171),
];

/// Radians per polygon step when tessellating arcs.
const ARC_STEP: f64 = 0.04;

pub(super) fn category_color(index: usize) -> Color32 {
    CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()]
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// Applies an opacity in `[0, 1]` on top of the colour's own alpha.
pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, offset: Vec2, scale: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * scale.clamp(0.6, 1.8)).max(20.0);
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (offset.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (offset.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
        y += step;
    }
}

/// Fills an annular sector centred on `center` as a run of convex quads.
pub(super) fn fill_arc(painter: &Painter, center: Pos2, arc: &ArcGeometry, color: Color32) {
    let span = arc.span();
    if span <= 0.0 || arc.outer_radius <= arc.inner_radius {
        return;
    }

    let steps = ((span / ARC_STEP).ceil() as usize).max(1);
    let point = |angle: f64, radius: f64| {
        let angle = angle - FRAC_PI_2;
        pos2(
            center.x + (angle.cos() * radius) as f32,
            center.y + (angle.sin() * radius) as f32,
        )
    };

    for step in 0..steps {
        let a0 = arc.start_angle + span * step as f64 / steps as f64;
        let a1 = arc.start_angle + span * (step + 1) as f64 / steps as f64;
        painter.add(Shape::convex_polygon(
            vec![
                point(a0, arc.inner_radius),
                point(a0, arc.outer_radius),
                point(a1, arc.outer_radius),
                point(a1, arc.inner_radius),
            ],
            color,
            Stroke::NONE,
        ));
    }
}

/// Outline of a rectangle from four segments.
pub(super) fn outline_rect(painter: &Painter, rect: Rect, stroke: Stroke) {
    painter.line_segment([rect.left_top(), rect.right_top()], stroke);
    painter.line_segment([rect.right_top(), rect.right_bottom()], stroke);
    painter.line_segment([rect.right_bottom(), rect.left_bottom()], stroke);
    painter.line_segment([rect.left_bottom(), rect.left_top()], stroke);
}
