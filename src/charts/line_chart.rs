use indexmap::IndexSet;
use serde::Deserialize;

use crate::data::Record;
use crate::interaction::{InteractionEvent, InteractionOutcome, InteractionState, Tooltip};
use crate::layout::Rect;
use crate::scale::{Axis, LinearScale};
use crate::util::format_thousands;
use crate::viewport::{Gesture, ViewportConfig, ViewportController};

use super::Margins;

/// Extra pick distance around a marker, in pixels.
const MARKER_HIT_SLOP: f64 = 2.0;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LineChartConfig {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    /// Field holding the country name in both datasets.
    pub key_field: String,
    pub years: [i32; 2],
    pub marker_every: i32,
    pub marker_radius: f64,
    pub max_zoom: f64,
}

impl Default for LineChartConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            margins: Margins::new(120.0, 100.0, 40.0, 80.0),
            key_field: "CName".to_owned(),
            years: [1960, 2023],
            marker_every: 5,
            marker_radius: 3.0,
            max_zoom: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    /// Plotted against the left axis.
    Population,
    /// GDP per capita, plotted against the right axis.
    Gdp,
}

impl SeriesKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Population => "Population",
            Self::Gdp => "GDP per Capita",
        }
    }

    fn describe(self, value: f64) -> String {
        match self {
            Self::Population => format_thousands(value),
            Self::Gdp => format!("${value:.2}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineSeries {
    pub country: String,
    pub kind: SeriesKind,
    /// `(year, value)` sorted by year; zero cells are gaps and are left out.
    pub points: Vec<(i32, f64)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MarkerId {
    pub series: usize,
    pub year: i32,
}

/// A marker dot in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Population and GDP per capita over time, one line pair per country, with
/// zoom that rescales every axis.
pub struct MultiLineChart {
    config: LineChartConfig,
    series: Vec<LineSeries>,
    countries: Vec<String>,
    x: LinearScale,
    y_population: LinearScale,
    y_gdp: LinearScale,
    viewport: ViewportController,
    interaction: InteractionState<MarkerId>,
    /// Country toggles; `selected` holds the visible countries.
    selection: InteractionState<String>,
}

impl MultiLineChart {
    pub fn new(gdp: &[Record], population: &[Record], config: &LineChartConfig) -> Self {
        let mut series = Vec::new();
        series.extend(read_series(population, SeriesKind::Population, config));
        series.extend(read_series(gdp, SeriesKind::Gdp, config));

        let countries = series
            .iter()
            .map(|line| line.country.clone())
            .collect::<IndexSet<_>>();

        let mut selection = InteractionState::new();
        selection.set_selected(countries.iter().cloned());

        let area = config.margins.plot_area(config.width, config.height);
        let max_of = |kind: SeriesKind| {
            series
                .iter()
                .filter(|line| line.kind == kind)
                .flat_map(|line| line.points.iter().map(|(_, value)| *value))
                .fold(0.0, f64::max)
        };
        let [first, last] = config.years;

        Self {
            x: LinearScale::new([f64::from(first), f64::from(last)], [0.0, area.width()]),
            y_population: LinearScale::new([0.0, max_of(SeriesKind::Population)], [area.height(), 0.0]),
            y_gdp: LinearScale::new([0.0, max_of(SeriesKind::Gdp)], [area.height(), 0.0]),
            viewport: ViewportController::new(ViewportConfig {
                width: area.width(),
                height: area.height(),
                min_scale: 1.0,
                max_scale: config.max_zoom,
                translate_extent: Some([[0.0, 0.0], [area.width(), area.height()]]),
            }),
            interaction: InteractionState::new(),
            selection,
            countries: countries.into_iter().collect(),
            series,
            config: config.clone(),
        }
    }

    pub fn size(&self) -> (f64, f64) {
        (self.config.width, self.config.height)
    }

    pub fn plot_area(&self) -> Rect {
        self.config.margins.plot_area(self.config.width, self.config.height)
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn series(&self) -> &[LineSeries] {
        &self.series
    }

    pub fn is_selected(&self, country: &str) -> bool {
        self.selection.is_selected(&country.to_owned())
    }

    pub fn selection(&self) -> &InteractionState<String> {
        &self.selection
    }

    pub fn interaction(&self) -> &InteractionState<MarkerId> {
        &self.interaction
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.interaction.tooltip()
    }

    /// Year axis seen through the current zoom.
    pub fn x_scale(&self) -> LinearScale {
        self.x.rescale(&self.viewport.current_transform(), Axis::X)
    }

    pub fn y_scale(&self, kind: SeriesKind) -> LinearScale {
        let base = match kind {
            SeriesKind::Population => &self.y_population,
            SeriesKind::Gdp => &self.y_gdp,
        };
        base.rescale(&self.viewport.current_transform(), Axis::Y)
    }

    /// Series indices of the selected countries.
    pub fn visible_series(&self) -> impl Iterator<Item = usize> + '_ {
        self.series
            .iter()
            .enumerate()
            .filter(|(_, line)| self.selection.is_selected(&line.country))
            .map(|(index, _)| index)
    }

    /// Polyline of one series in canvas coordinates.
    pub fn line_points(&self, index: usize) -> Vec<(f64, f64)> {
        let Some(line) = self.series.get(index) else {
            return Vec::new();
        };
        let (x, y) = (self.x_scale(), self.y_scale(line.kind));
        let area = self.plot_area();
        line.points
            .iter()
            .map(|(year, value)| (area.x0 + x.apply(f64::from(*year)), area.y0 + y.apply(*value)))
            .collect()
    }

    /// Markers of the visible series that fall inside the plot area.
    pub fn markers(&self) -> Vec<Marker> {
        let area = self.plot_area();
        let x = self.x_scale();
        let [first, _] = self.config.years;
        let every = self.config.marker_every.max(1);

        let mut markers = Vec::new();
        for index in self.visible_series() {
            let line = &self.series[index];
            let y = self.y_scale(line.kind);
            for &(year, value) in &line.points {
                if (year - first) % every != 0 {
                    continue;
                }
                let (px, py) = (area.x0 + x.apply(f64::from(year)), area.y0 + y.apply(value));
                if px < area.x0 || px > area.x1 || py < area.y0 || py > area.y1 {
                    continue;
                }
                markers.push(Marker {
                    id: MarkerId { series: index, year },
                    x: px,
                    y: py,
                    value,
                });
            }
        }
        markers
    }

    pub fn marker_at(&self, x: f64, y: f64) -> Option<Marker> {
        let reach = self.config.marker_radius + MARKER_HIT_SLOP;
        self.markers()
            .into_iter()
            .map(|marker| (marker, (marker.x - x).hypot(marker.y - y)))
            .filter(|(_, distance)| *distance <= reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(marker, _)| marker)
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) -> InteractionOutcome<MarkerId> {
        let Some(marker) = self.marker_at(x, y) else {
            return self.pointer_left();
        };
        let kind = self.series[marker.id.series].kind;
        self.interaction.handle(
            InteractionEvent::PointerEnter { id: marker.id, x, y },
            |id| format!("Year: {}\n{}: {}", id.year, kind.label(), kind.describe(marker.value)),
        )
    }

    pub fn pointer_left(&mut self) -> InteractionOutcome<MarkerId> {
        self.interaction.handle(InteractionEvent::PointerLeave, |_| String::new())
    }

    /// Shows or hides a country's lines. Unknown countries are ignored.
    pub fn toggle_selection(&mut self, country: &str) -> InteractionOutcome<String> {
        if !self.countries.iter().any(|name| name == country) {
            return InteractionOutcome::Unchanged;
        }
        self.pointer_left();
        self.selection
            .handle(InteractionEvent::ToggleSelection(country.to_owned()), |_| String::new())
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.apply_user_gesture(Gesture::Pan { dx, dy });
    }

    /// Zooms around a canvas-space anchor.
    pub fn zoom(&mut self, factor: f64, anchor: (f64, f64)) {
        let area = self.plot_area();
        let anchor = (anchor.0 - area.x0, anchor.1 - area.y0);
        self.viewport.apply_user_gesture(Gesture::Zoom { factor, anchor });
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset();
    }

    pub fn zoom_scale(&self) -> f64 {
        self.viewport.current_transform().scale
    }
}

fn read_series(rows: &[Record], kind: SeriesKind, config: &LineChartConfig) -> Vec<LineSeries> {
    let [first, last] = config.years;
    rows.iter()
        .map(|row| LineSeries {
            country: row.text(&config.key_field),
            kind,
            points: row
                .year_columns()
                .into_iter()
                .filter(|(year, value)| (first..=last).contains(year) && *value > 0.0)
                .collect(),
        })
        .filter(|line| !line.country.is_empty() && !line.points.is_empty())
        .collect()
}
