use eframe::egui::{Color32, CursorIcon, Stroke, Ui};

use chart_atlas::charts::ForceGraphChart;

use super::canvas::{Canvas, PointerInput};
use super::render_utils::{category_color, draw_background, with_opacity};

const EDGE_COLOR: Color32 = Color32::from_rgb(153, 153, 153);

pub(super) fn force_graph(ui: &mut Ui, chart: &mut ForceGraphChart, elapsed_ms: f64) -> Canvas {
    let (canvas, painter, input) = Canvas::allocate(ui, chart.size());
    handle_input(chart, &canvas, &input);

    if chart.step(elapsed_ms) {
        ui.ctx().request_repaint();
    }

    let transform = chart.transform();
    let offset = canvas.pos(transform.translate_x, transform.translate_y);
    draw_background(&painter, canvas.rect(), offset.to_vec2(), transform.scale as f32);

    let simulation = chart.simulation();
    let nodes = simulation.nodes();
    let screen = |index: usize| {
        let (x, y) = chart.to_screen(nodes[index].position);
        canvas.pos(x, y)
    };

    let edge_width = (1.5 * transform.scale as f32).max(0.5);
    for (index, edge) in simulation.graph().edges().iter().enumerate() {
        let color = with_opacity(EDGE_COLOR, chart.edge_opacity(index));
        painter.line_segment([screen(edge.source), screen(edge.target)], Stroke::new(edge_width, color));
    }

    let mut groups: Vec<&str> = Vec::new();
    let radius = simulation.config().node_radius * transform.scale as f32;
    let hovered = chart.interaction().hovered().copied();
    for (index, node) in nodes.iter().enumerate() {
        let slot = match groups.iter().position(|group| *group == node.group) {
            Some(slot) => slot,
            None => {
                groups.push(&node.group);
                groups.len() - 1
            }
        };
        let opacity = chart.node_opacity(index);
        let center = screen(index);
        painter.circle_filled(center, radius, with_opacity(category_color(slot), opacity));
        let outline = if hovered == Some(index) { Color32::WHITE } else { Color32::from_gray(40) };
        painter.circle_stroke(center, radius, Stroke::new(1.5, with_opacity(outline, opacity)));
    }

    if hovered.is_some() || simulation.dragged().is_some() {
        ui.output_mut(|output| output.cursor_icon = CursorIcon::Grab);
    }
    canvas
}

/// A drag that starts on a node pins it; any other drag pans the view.
fn handle_input(chart: &mut ForceGraphChart, canvas: &Canvas, input: &PointerInput) {
    if let Some((x, y)) = input.drag_started {
        chart.drag_start(x, y);
    }

    if input.dragging && chart.simulation().dragged().is_none() {
        let (dx, dy) = input.drag_delta;
        chart.pan(dx, dy);
    }

    match input.hover {
        Some((x, y)) => chart.pointer_moved(x, y),
        None => chart.pointer_left(),
    };

    if input.drag_stopped {
        chart.drag_end();
    }

    if let Some(factor) = input.zoom_factor() {
        let anchor = input.hover.unwrap_or_else(|| canvas.to_local(canvas.rect().center()));
        chart.zoom(factor, anchor);
    }
}
