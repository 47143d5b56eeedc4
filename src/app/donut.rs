use eframe::egui::{Align2, Color32, FontId, Ui, vec2};

use chart_atlas::charts::{DonutChart, SliceId};

use super::canvas::Canvas;
use super::render_utils::{category_color, fill_arc};

pub(super) fn donut(ui: &mut Ui, chart: &mut DonutChart) -> Canvas {
    let (canvas, painter, input) = Canvas::allocate(ui, chart.size());
    if let Some((x, y)) = input.clicked {
        chart.click(x, y);
    }
    match input.hover {
        Some((x, y)) => chart.pointer_moved(x, y),
        None => chart.pointer_left(),
    };

    let radius = chart.radius();
    for (panel_index, panel) in chart.panels().iter().enumerate() {
        let (cx, cy) = chart.panel_center(panel_index);
        let center = canvas.pos(cx, cy);

        for slice in 0..panel.arcs.len() {
            let id = SliceId { panel: panel_index, slice };
            let Some(arc) = chart.arc(id) else {
                continue;
            };
            fill_arc(&painter, center, &arc, category_color(slice));
            if arc.span() <= 0.0 {
                continue;
            }
            if let Some(text) = chart.label_text(id) {
                let (x, y) = arc.centroid();
                painter.text(
                    center + vec2(x as f32, y as f32),
                    Align2::CENTER_CENTER,
                    text,
                    FontId::proportional(11.0),
                    Color32::WHITE,
                );
            }
        }

        painter.text(
            canvas.pos(cx, cy + radius + 18.0),
            Align2::CENTER_CENTER,
            format!("{} ({})", panel.country, panel.year),
            FontId::proportional(13.0),
            Color32::from_gray(220),
        );
    }
    canvas
}
