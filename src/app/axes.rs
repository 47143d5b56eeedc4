use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Stroke, Ui, vec2};

use chart_atlas::charts::{MultiLineChart, SeriesKind, StackedBarChart};
use chart_atlas::layout::Rect;
use chart_atlas::util::format_si;

use super::canvas::Canvas;
use super::render_utils::{blend_color, category_color, outline_rect, with_opacity};

const AXIS_COLOR: Color32 = Color32::from_gray(170);
const TICK_LENGTH: f32 = 6.0;
/// Year labels closer together than this are thinned out.
const MIN_YEAR_LABEL_GAP: f64 = 32.0;

fn axis_font() -> FontId {
    FontId::proportional(11.0)
}

fn horizontal_axis(painter: &Painter, canvas: &Canvas, area: &Rect, ticks: &[(f64, String)]) {
    let stroke = Stroke::new(1.0, AXIS_COLOR);
    painter.line_segment([canvas.pos(area.x0, area.y1), canvas.pos(area.x1, area.y1)], stroke);
    for (x, label) in ticks {
        let base = canvas.pos(*x, area.y1);
        painter.line_segment([base, base + vec2(0.0, TICK_LENGTH)], stroke);
        painter.text(
            base + vec2(0.0, TICK_LENGTH + 2.0),
            Align2::CENTER_TOP,
            label,
            axis_font(),
            AXIS_COLOR,
        );
    }
}

/// Vertical axis at canvas `x`; labels hang off the side facing away from
/// the plot.
fn vertical_axis(painter: &Painter, canvas: &Canvas, x: f64, area: &Rect, ticks: &[(f64, String)], left: bool) {
    let stroke = Stroke::new(1.0, AXIS_COLOR);
    let direction = if left { -1.0 } else { 1.0 };
    painter.line_segment([canvas.pos(x, area.y0), canvas.pos(x, area.y1)], stroke);
    for (y, label) in ticks {
        let base = canvas.pos(x, *y);
        let tip = base + vec2(direction * TICK_LENGTH, 0.0);
        painter.line_segment([base, tip], stroke);
        let anchor = if left { Align2::RIGHT_CENTER } else { Align2::LEFT_CENTER };
        painter.text(
            tip + vec2(direction * 2.0, 0.0),
            anchor,
            label,
            axis_font(),
            AXIS_COLOR,
        );
    }
}

fn caption(painter: &Painter, pos: Pos2, text: &str) {
    painter.text(pos, Align2::CENTER_CENTER, text, FontId::proportional(13.0), Color32::from_gray(220));
}

pub(super) fn multi_line(ui: &mut Ui, chart: &mut MultiLineChart) -> Canvas {
    let (canvas, painter, input) = Canvas::allocate(ui, chart.size());

    if input.dragging {
        let (dx, dy) = input.drag_delta;
        chart.pan(dx, dy);
    }
    if let Some(factor) = input.zoom_factor()
        && let Some(anchor) = input.hover
    {
        chart.zoom(factor, anchor);
    }
    match input.hover {
        Some((x, y)) if !input.dragging => chart.pointer_moved(x, y),
        _ => chart.pointer_left(),
    };

    let area = chart.plot_area();
    let x = chart.x_scale();
    let population = chart.y_scale(SeriesKind::Population);
    let gdp = chart.y_scale(SeriesKind::Gdp);

    let x_ticks = x
        .ticks(10)
        .into_iter()
        .map(|year| (area.x0 + x.apply(year), format!("{year:.0}")))
        .filter(|(px, _)| (area.x0..=area.x1).contains(px))
        .collect::<Vec<_>>();
    let left_ticks = population
        .ticks(8)
        .into_iter()
        .map(|value| (area.y0 + population.apply(value), format_si(value)))
        .filter(|(py, _)| (area.y0..=area.y1).contains(py))
        .collect::<Vec<_>>();
    let right_ticks = gdp
        .ticks(8)
        .into_iter()
        .map(|value| (area.y0 + gdp.apply(value), format!("${}", format_si(value))))
        .filter(|(py, _)| (area.y0..=area.y1).contains(py))
        .collect::<Vec<_>>();

    horizontal_axis(&painter, &canvas, &area, &x_ticks);
    vertical_axis(&painter, &canvas, area.x0, &area, &left_ticks, true);
    vertical_axis(&painter, &canvas, area.x1, &area, &right_ticks, false);
    caption(&painter, canvas.pos((area.x0 + area.x1) / 2.0, area.y1 + 40.0), "Year");
    caption(&painter, canvas.pos(area.x0 - 80.0, area.y0 - 20.0), SeriesKind::Population.label());
    caption(&painter, canvas.pos(area.x1 + 40.0, area.y0 - 20.0), SeriesKind::Gdp.label());

    let plot = painter.with_clip_rect(canvas.screen_rect(&area));
    for index in chart.visible_series() {
        let line = &chart.series()[index];
        let slot = chart
            .countries()
            .iter()
            .position(|country| *country == line.country)
            .unwrap_or(index);
        let color = match line.kind {
            SeriesKind::Population => category_color(slot),
            SeriesKind::Gdp => blend_color(category_color(slot), Color32::WHITE, 0.45),
        };
        let points = chart
            .line_points(index)
            .into_iter()
            .map(|(px, py)| canvas.pos(px, py))
            .collect::<Vec<_>>();
        plot.line(points, Stroke::new(2.0, color));
    }

    let hovered = chart.interaction().hovered().copied();
    for marker in chart.markers() {
        let radius = if hovered == Some(marker.id) { 5.0 } else { 3.0 };
        painter.circle_filled(canvas.pos(marker.x, marker.y), radius, Color32::from_gray(230));
    }

    draw_legend(&painter, &canvas, chart, area);
    canvas
}

fn draw_legend(painter: &Painter, canvas: &Canvas, chart: &MultiLineChart, area: Rect) {
    for (slot, country) in chart.countries().iter().enumerate() {
        let pos = canvas.pos(area.x0 + 10.0, area.y0 + 10.0 + slot as f64 * 16.0);
        let opacity = if chart.is_selected(country) { 1.0 } else { 0.35 };
        painter.circle_filled(pos, 5.0, with_opacity(category_color(slot), opacity));
        painter.text(
            pos + vec2(10.0, 0.0),
            Align2::LEFT_CENTER,
            country,
            axis_font(),
            with_opacity(Color32::from_gray(220), opacity),
        );
    }
}

/// `brush` is the in-progress gesture as `[anchor, current]` canvas x.
pub(super) fn stacked_bar(ui: &mut Ui, chart: &mut StackedBarChart, brush: &mut Option<[f64; 2]>) -> Canvas {
    let (canvas, painter, input) = Canvas::allocate(ui, chart.size());
    let area = chart.plot_area();

    if let Some((x, y)) = input.drag_started
        && area.contains_point(x, y)
    {
        *brush = Some([x, x]);
    }
    if let (Some([_, current]), Some((x, _))) = (brush.as_mut(), input.hover)
        && input.dragging
    {
        *current = x.clamp(area.x0, area.x1);
    }
    if input.drag_stopped
        && let Some([a, b]) = brush.take()
    {
        chart.brush_end(Some([a.min(b), a.max(b)]));
    } else if input.clicked.is_some() {
        chart.brush_end(None);
    }

    for bar in chart.bars() {
        let slot = chart
            .countries()
            .iter()
            .position(|country| *country == bar.country)
            .unwrap_or(0);
        let rect = canvas.screen_rect(&bar.rect);
        painter.rect_filled(rect, 0.0, category_color(slot));
        if let Some(label) = bar.label() {
            painter.text(rect.center(), Align2::CENTER_CENTER, label, FontId::proportional(9.0), Color32::WHITE);
        }
    }

    let x = chart.x_scale();
    let every = (MIN_YEAR_LABEL_GAP / x.step().max(1.0)).ceil().max(1.0) as usize;
    let x_ticks = x
        .domain
        .iter()
        .step_by(every)
        .filter_map(|year| Some((area.x0 + x.center(year)?, year.to_string())))
        .collect::<Vec<_>>();
    let y_ticks = chart
        .y_ticks()
        .into_iter()
        .map(|(_, y, label)| (y, label))
        .collect::<Vec<_>>();
    horizontal_axis(&painter, &canvas, &area, &x_ticks);
    vertical_axis(&painter, &canvas, area.x0, &area, &y_ticks, true);
    caption(&painter, canvas.pos((area.x0 + area.x1) / 2.0, area.y1 + 45.0), "Year");
    caption(&painter, canvas.pos(area.x0 - 60.0, area.y0 - 25.0), "CO2 Emissions (kt)");

    if let Some([a, b]) = *brush {
        let selection = Rect::new(a.min(b), area.y0, a.max(b), area.y1);
        let rect = canvas.screen_rect(&selection);
        painter.rect_filled(rect, 0.0, Color32::from_rgba_unmultiplied(120, 140, 170, 60));
        outline_rect(&painter, rect, Stroke::new(1.0, Color32::from_gray(200)));
    }

    let [first, last] = chart.year_range();
    painter.text(
        canvas.pos(area.x1, area.y0 - 25.0),
        Align2::RIGHT_CENTER,
        format!("{first} - {last}"),
        axis_font(),
        AXIS_COLOR,
    );
    canvas
}
