use eframe::egui::{Align2, Color32, CursorIcon, FontId, Painter, Pos2, Stroke, Ui, vec2};

use chart_atlas::charts::{CirclePackChart, SunburstChart, TreemapChart};
use chart_atlas::hierarchy::{Hierarchy, NodeId};

use super::canvas::Canvas;
use super::render_utils::{blend_color, category_color, fill_arc, outline_rect, with_opacity};

const DEPTH_LIGHT: Color32 = Color32::from_rgb(163, 245, 207);
const DEPTH_DARK: Color32 = Color32::from_rgb(71, 83, 133);
/// Depth at which the circle-pack ramp reaches its dark end.
const DEPTH_RAMP: f32 = 5.0;

/// Palette slot of the top-level branch containing `id`.
fn branch_color(tree: &Hierarchy, id: NodeId) -> Color32 {
    let slot = tree
        .ancestor_at_depth(id, 1)
        .and_then(|branch| tree.children(tree.root()).iter().position(|child| *child == branch))
        .unwrap_or(0);
    category_color(slot)
}

pub(super) fn circle_pack(ui: &mut Ui, chart: &mut CirclePackChart, elapsed_ms: f64) -> Canvas {
    if chart.tick(elapsed_ms) {
        ui.ctx().request_repaint();
    }

    let (canvas, painter, input) = Canvas::allocate(ui, chart.size());
    if let Some((x, y)) = input.clicked {
        chart.click(x, y);
        ui.ctx().request_repaint();
    }
    match input.hover {
        Some((x, y)) => chart.pointer_moved(x, y),
        None => chart.pointer_left(),
    };

    let tree = chart.tree();
    let hovered = chart.interaction().hovered().copied();
    for id in tree.ids() {
        let node = tree.node(id);
        let circle = chart.projected(id);
        let center = canvas.pos(circle.x, circle.y);
        let fill = if node.is_leaf() {
            Color32::WHITE
        } else {
            blend_color(DEPTH_LIGHT, DEPTH_DARK, node.depth as f32 / DEPTH_RAMP)
        };
        painter.circle_filled(center, circle.r as f32, fill);
        if hovered == Some(id) {
            painter.circle_stroke(center, circle.r as f32, Stroke::new(1.5, Color32::BLACK));
        }
    }

    for id in tree.ids().filter(|id| chart.label_visible(*id)) {
        let circle = chart.projected(id);
        painter.text(
            canvas.pos(circle.x, circle.y),
            Align2::CENTER_CENTER,
            &tree.node(id).name,
            FontId::proportional(12.0),
            Color32::BLACK,
        );
    }

    if hovered.is_some() {
        ui.output_mut(|output| output.cursor_icon = CursorIcon::PointingHand);
    }
    canvas
}

pub(super) fn sunburst(ui: &mut Ui, chart: &mut SunburstChart) -> Canvas {
    let (canvas, painter, input) = Canvas::allocate(ui, chart.size());
    match input.hover {
        Some((x, y)) => chart.pointer_moved(x, y),
        None => chart.pointer_left(),
    };

    let (width, height) = chart.size();
    let center = canvas.pos(width / 2.0, height / 2.0);
    let tree = chart.tree();
    for (id, arc) in chart.arcs() {
        let color = with_opacity(branch_color(tree, id), chart.opacity(id));
        fill_arc(&painter, center, &arc, color);
    }

    for (id, arc) in chart.arcs().filter(|(id, _)| chart.label_visible(*id)) {
        let (x, y) = arc.centroid();
        let color = with_opacity(Color32::WHITE, chart.opacity(id));
        painter.text(
            center + vec2(x as f32, y as f32),
            Align2::CENTER_CENTER,
            &tree.node(id).name,
            FontId::proportional(10.0),
            color,
        );
    }
    canvas
}

pub(super) fn treemap(ui: &mut Ui, chart: &mut TreemapChart) -> Canvas {
    let (canvas, painter, input) = Canvas::allocate(ui, chart.size());
    match input.hover {
        Some((x, y)) => chart.pointer_moved(x, y),
        None => chart.pointer_left(),
    };

    let tree = chart.tree();
    let hovered = chart.interaction().hovered().copied();
    let border = Stroke::new(1.0, Color32::WHITE);
    for (id, rect) in chart.leaves() {
        let screen = canvas.screen_rect(&rect);
        let mut fill = branch_color(tree, id);
        if hovered == Some(id) {
            fill = blend_color(fill, Color32::WHITE, 0.3);
        }
        painter.rect_filled(screen, 0.0, fill);
        outline_rect(&painter, screen, border);
        if let Some(lines) = chart.label(id) {
            draw_tile_label(&painter, screen.left_top() + vec2(4.0, 4.0), &lines);
        }
    }
    canvas
}

fn draw_tile_label(painter: &Painter, top_left: Pos2, lines: &[String; 2]) {
    for (row, line) in lines.iter().enumerate() {
        painter.text(
            top_left + vec2(0.0, row as f32 * 13.0),
            Align2::LEFT_TOP,
            line,
            FontId::proportional(11.0),
            Color32::WHITE,
        );
    }
}
