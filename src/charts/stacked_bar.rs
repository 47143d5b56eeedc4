use serde::Deserialize;
use tracing::debug;

use crate::data::Record;
use crate::interaction::{InteractionEvent, InteractionOutcome, InteractionState};
use crate::layout::{Rect, stack};
use crate::scale::{BandScale, LinearScale};
use crate::util::format_si;

use super::Margins;

/// Segments shorter than this (pixels) get no value label.
const MIN_LABEL_HEIGHT: f64 = 12.0;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StackedBarConfig {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    pub key_field: String,
    pub default_years: [i32; 2],
    pub band_padding: f64,
    pub y_ticks: usize,
}

impl Default for StackedBarConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            margins: Margins::new(50.0, 20.0, 80.0, 120.0),
            key_field: "CName".to_owned(),
            default_years: [1990, 2020],
            band_padding: 0.3,
            y_ticks: 6,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Cell {
    country: String,
    year: i32,
    value: f64,
}

/// One drawn segment, in canvas coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct StackedBar {
    pub year: i32,
    pub country: String,
    pub value: f64,
    pub rect: Rect,
}

impl StackedBar {
    pub fn label(&self) -> Option<String> {
        (self.rect.height() >= MIN_LABEL_HEIGHT).then(|| format_si(self.value))
    }
}

/// Per-year emissions stacked by country, with a year brush and country
/// toggles. The selection lives in the interaction state.
pub struct StackedBarChart {
    config: StackedBarConfig,
    cells: Vec<Cell>,
    countries: Vec<String>,
    year_range: [i32; 2],
    interaction: InteractionState<String>,
    x: BandScale<i32>,
    y: LinearScale,
    bars: Vec<StackedBar>,
}

impl StackedBarChart {
    pub fn new(rows: &[Record], config: &StackedBarConfig) -> Self {
        let mut countries = Vec::new();
        let mut cells = Vec::new();
        for row in rows {
            let country = row.text(&config.key_field);
            if country.is_empty() {
                continue;
            }
            if !countries.contains(&country) {
                countries.push(country.clone());
            }
            cells.extend(row.year_columns().into_iter().map(|(year, value)| Cell {
                country: country.clone(),
                year,
                value,
            }));
        }

        let mut interaction = InteractionState::new();
        interaction.set_selected(countries.iter().cloned());
        let mut chart = Self {
            year_range: config.default_years,
            config: config.clone(),
            cells,
            countries,
            interaction,
            x: BandScale::new(Vec::new(), [0.0, 0.0], config.band_padding),
            y: LinearScale::new([0.0, 0.0], [0.0, 0.0]),
            bars: Vec::new(),
        };
        chart.refresh();
        chart
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

    pub fn year_range(&self) -> [i32; 2] {
        self.year_range
    }

    pub fn is_selected(&self, country: &str) -> bool {
        self.interaction.is_selected(&country.to_owned())
    }

    pub fn bars(&self) -> &[StackedBar] {
        &self.bars
    }

    /// Year bands in plot-local pixels.
    pub fn x_scale(&self) -> &BandScale<i32> {
        &self.x
    }

    pub fn y_scale(&self) -> &LinearScale {
        &self.y
    }

    /// `(tick value, canvas y, label)` for the value axis.
    pub fn y_ticks(&self) -> Vec<(f64, f64, String)> {
        let top = self.plot_area().y0;
        self.y
            .ticks(self.config.y_ticks)
            .into_iter()
            .map(|tick| (tick, top + self.y.apply(tick), format_si(tick)))
            .collect()
    }

    /// Finishes a brush gesture over canvas x coordinates. The year range
    /// narrows to the bands whose centres lie inside; a brush covering no band
    /// leaves it unchanged.
    pub fn brush_end(&mut self, selection: Option<[f64; 2]>) -> InteractionOutcome<String> {
        let left = self.plot_area().x0;
        let local = selection.map(|[a, b]| [a - left, b - left]);
        let outcome = self.interaction.handle(InteractionEvent::BrushEnd(local), |_| String::new());
        let InteractionOutcome::BrushChanged([x0, x1]) = outcome else {
            return outcome;
        };

        let years = self
            .x
            .domain
            .iter()
            .copied()
            .filter(|year| {
                self.x
                    .center(year)
                    .is_some_and(|center| center >= x0 && center <= x1)
            })
            .collect::<Vec<_>>();
        self.interaction.set_brush_range(None);

        let (Some(&first), Some(&last)) = (years.iter().min(), years.iter().max()) else {
            return InteractionOutcome::Unchanged;
        };
        self.year_range = [first, last];
        debug!(first, last, "stacked bar year range narrowed");
        self.refresh();
        outcome
    }

    pub fn toggle_country(&mut self, country: &str) -> InteractionOutcome<String> {
        let outcome = self
            .interaction
            .handle(InteractionEvent::ToggleSelection(country.to_owned()), |_| String::new());
        self.refresh();
        outcome
    }

    /// Restores the default year range and selects every country.
    pub fn reset(&mut self) {
        self.year_range = self.config.default_years;
        self.interaction.reset();
        self.interaction.set_selected(self.countries.iter().cloned());
        self.refresh();
    }

    fn refresh(&mut self) {
        let [first, last] = self.year_range;
        // An empty selection shows every country.
        let filter_countries = !self.interaction.selected().is_empty();
        let visible = self
            .cells
            .iter()
            .filter(|cell| (first..=last).contains(&cell.year))
            .filter(|cell| !filter_countries || self.interaction.is_selected(&cell.country))
            .collect::<Vec<_>>();

        let bands = stack(&visible, |cell| cell.year.to_string(), |cell| cell.value);
        let mut years = bands
            .values()
            .filter_map(|segments| segments.first().map(|segment| visible[segment.row].year))
            .collect::<Vec<_>>();
        years.sort_unstable();
        let top = bands
            .values()
            .filter_map(|segments| segments.last().map(|segment| segment.y1))
            .fold(0.0, f64::max);

        let area = self.plot_area();
        self.x = BandScale::new(years, [0.0, area.width()], self.config.band_padding);
        self.y = LinearScale::new([0.0, top], [area.height(), 0.0]);

        let bandwidth = self.x.bandwidth();
        self.bars = bands
            .values()
            .flatten()
            .filter_map(|segment| {
                let cell = visible[segment.row];
                let x = area.x0 + self.x.position(&cell.year)?;
                Some(StackedBar {
                    year: cell.year,
                    country: cell.country.clone(),
                    value: segment.value(),
                    rect: Rect::new(
                        x,
                        area.y0 + self.y.apply(segment.y1),
                        x + bandwidth,
                        area.y0 + self.y.apply(segment.y0),
                    ),
                })
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FieldValue;

    fn chart() -> StackedBarChart {
        let rows = ["China", "India", "Japan"]
            .into_iter()
            .enumerate()
            .map(|(index, country)| {
                let mut row = Record::from_iter([("CName", FieldValue::from(country))]);
                for year in 1985..=2022 {
                    row.insert(year.to_string(), (index as f64 + 1.0) * 1_000.0);
                }
                row
            })
            .collect::<Vec<_>>();
        StackedBarChart::new(&rows, &StackedBarConfig::default())
    }

    #[test]
    fn defaults_cover_1990_to_2020_for_all_countries() {
        let chart = chart();
        assert_eq!(chart.year_range(), [1990, 2020]);
        assert_eq!(chart.x_scale().domain.len(), 31);
        assert_eq!(chart.bars().len(), 31 * 3);
        assert_eq!(chart.y_scale().domain, [0.0, 6_000.0]);

        let column = chart.bars().iter().filter(|bar| bar.year == 1990).collect::<Vec<_>>();
        assert_eq!(column[0].country, "China");
        assert_eq!(column[0].rect.y1, chart.plot_area().y1);
        assert!((column[0].rect.y0 - column[1].rect.y1).abs() < 1e-9);
    }

    #[test]
    fn brush_narrows_the_year_range() {
        let mut chart = chart();
        let left = chart.plot_area().x0;
        let (a, b) = (
            chart.x_scale().position(&2000).unwrap(),
            chart.x_scale().position(&2004).unwrap() + chart.x_scale().bandwidth(),
        );
        let outcome = chart.brush_end(Some([left + a, left + b]));
        assert!(matches!(outcome, InteractionOutcome::BrushChanged(_)));
        assert_eq!(chart.year_range(), [2000, 2004]);
        assert_eq!(chart.x_scale().domain, vec![2000, 2001, 2002, 2003, 2004]);
    }

    #[test]
    fn empty_brush_keeps_the_range() {
        let mut chart = chart();
        chart.brush_end(None);
        chart.brush_end(Some([0.0, 1.0]));
        assert_eq!(chart.year_range(), [1990, 2020]);
    }

    #[test]
    fn toggles_and_reset() {
        let mut chart = chart();
        chart.toggle_country("India");
        assert!(!chart.is_selected("India"));
        assert_eq!(chart.bars().len(), 31 * 2);
        assert_eq!(chart.y_scale().domain, [0.0, 4_000.0]);

        chart.brush_end(Some([0.0, 10_000.0]));
        chart.reset();
        assert_eq!(chart.year_range(), [1990, 2020]);
        assert!(chart.is_selected("India"));
        assert_eq!(chart.bars().len(), 31 * 3);
    }

    #[test]
    fn years_run_in_order_when_rows_start_late() {
        let late = Record::from_iter([
            ("CName", FieldValue::from("Chad")),
            ("1995", FieldValue::from(3.0)),
            ("1996", FieldValue::from(4.0)),
        ]);
        let mut early = Record::from_iter([("CName", FieldValue::from("Peru"))]);
        for year in 1990..=1996 {
            early.insert(year.to_string(), 1.0);
        }
        let chart = StackedBarChart::new(&[late, early], &StackedBarConfig::default());

        assert_eq!(chart.x_scale().domain, (1990..=1996).collect::<Vec<_>>());
        let x = |year: i32| chart.x_scale().position(&year).unwrap();
        assert!(x(1990) < x(1995));
        let chad = chart.bars().iter().find(|bar| bar.country == "Chad" && bar.year == 1995).unwrap();
        assert_eq!(chad.rect.x0, chart.plot_area().x0 + x(1995));
    }

    #[test]
    fn value_axis_uses_si_ticks() {
        let chart = chart();
        let ticks = chart.y_ticks();
        assert_eq!(ticks.first().map(|tick| tick.2.as_str()), Some("0.0"));
        assert_eq!(ticks.last().map(|tick| tick.2.as_str()), Some("6.0k"));
    }
}
