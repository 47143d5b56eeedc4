use serde::Deserialize;

use crate::data::Record;
use crate::interaction::{InteractionEvent, InteractionOutcome, InteractionState, Tooltip};
use crate::layout::{ArcGeometry, PieConfig, pie};

/// Age groups in slice order.
pub const AGE_GROUPS: [&str; 3] = ["0-14", "15-64", "65+"];

const PANEL_GAP: f64 = 20.0;
/// Room under each donut for the country and year caption.
const CAPTION_HEIGHT: f64 = 36.0;
const HOVER_GROWTH: f64 = 1.1;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DonutConfig {
    pub key_field: String,
    pub group_field: String,
    pub countries: Vec<String>,
    pub years: Vec<String>,
    pub radius: f64,
}

impl Default for DonutConfig {
    fn default() -> Self {
        Self {
            key_field: "NAME".to_owned(),
            group_field: "AgeGroup".to_owned(),
            countries: ["China", "India", "Japan", "Russian Federation", "United States"]
                .map(str::to_owned)
                .to_vec(),
            years: vec!["1960".to_owned(), "2023".to_owned()],
            radius: 100.0,
        }
    }
}

/// What a slice's static label shows; clicking a slice flips it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SliceLabel {
    #[default]
    Percent,
    AgeGroup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SliceId {
    pub panel: usize,
    pub slice: usize,
}

/// One country-year donut.
#[derive(Clone, Debug)]
pub struct DonutPanel {
    pub country: String,
    pub year: String,
    /// Share of the population per age group, in percent.
    pub shares: Vec<f64>,
    pub arcs: Vec<ArcGeometry>,
    pub labels: Vec<SliceLabel>,
}

/// A grid of donuts: one row per year, one column per country.
pub struct DonutChart {
    config: DonutConfig,
    panels: Vec<DonutPanel>,
    interaction: InteractionState<SliceId>,
}

impl DonutChart {
    pub fn new(rows: &[Record], config: &DonutConfig) -> Self {
        let pie_config = PieConfig {
            inner_radius: config.radius * 0.5,
            outer_radius: config.radius,
            ..PieConfig::default()
        };

        let mut panels = Vec::with_capacity(config.years.len() * config.countries.len());
        for year in &config.years {
            for country in &config.countries {
                let shares = AGE_GROUPS
                    .iter()
                    .map(|group| {
                        rows.iter()
                            .find(|row| {
                                row.text(&config.key_field) == *country
                                    && row.text(&config.group_field) == *group
                            })
                            .map_or(0.0, |row| row.number(year))
                    })
                    .collect::<Vec<_>>();
                panels.push(DonutPanel {
                    country: country.clone(),
                    year: year.clone(),
                    arcs: pie(&shares, &pie_config),
                    labels: vec![SliceLabel::default(); shares.len()],
                    shares,
                });
            }
        }

        Self {
            config: config.clone(),
            panels,
            interaction: InteractionState::new(),
        }
    }

    pub fn panels(&self) -> &[DonutPanel] {
        &self.panels
    }

    pub fn radius(&self) -> f64 {
        self.config.radius
    }

    fn columns(&self) -> usize {
        self.config.countries.len().max(1)
    }

    fn cell_size(&self) -> (f64, f64) {
        let side = self.config.radius * 2.0;
        (side + PANEL_GAP, side + CAPTION_HEIGHT + PANEL_GAP)
    }

    pub fn size(&self) -> (f64, f64) {
        let (cell_w, cell_h) = self.cell_size();
        let rows = self.config.years.len().max(1);
        (cell_w * self.columns() as f64, cell_h * rows as f64)
    }

    /// Canvas position of a panel's donut centre.
    pub fn panel_center(&self, panel: usize) -> (f64, f64) {
        let (cell_w, cell_h) = self.cell_size();
        let (row, column) = (panel / self.columns(), panel % self.columns());
        let offset = PANEL_GAP / 2.0 + self.config.radius;
        (column as f64 * cell_w + offset, row as f64 * cell_h + offset)
    }

    /// Slice geometry as drawn: the hovered slice grows outward.
    pub fn arc(&self, id: SliceId) -> Option<ArcGeometry> {
        let mut arc = *self.panels.get(id.panel)?.arcs.get(id.slice)?;
        if self.interaction.hovered() == Some(&id) {
            arc.outer_radius = self.config.radius * HOVER_GROWTH;
        }
        Some(arc)
    }

    pub fn label_text(&self, id: SliceId) -> Option<String> {
        let panel = self.panels.get(id.panel)?;
        Some(match panel.labels.get(id.slice)? {
            SliceLabel::Percent => format!("{:.1}%", panel.shares[id.slice]),
            SliceLabel::AgeGroup => AGE_GROUPS[id.slice].to_owned(),
        })
    }

    pub fn slice_at(&self, x: f64, y: f64) -> Option<SliceId> {
        (0..self.panels.len()).find_map(|panel| {
            let (cx, cy) = self.panel_center(panel);
            (0..self.panels[panel].arcs.len())
                .map(|slice| SliceId { panel, slice })
                .find(|id| {
                    self.arc(*id)
                        .is_some_and(|arc| arc.span() > 0.0 && arc.contains_point(x - cx, y - cy))
                })
        })
    }

    pub fn interaction(&self) -> &InteractionState<SliceId> {
        &self.interaction
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.interaction.tooltip()
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) -> InteractionOutcome<SliceId> {
        let Some(id) = self.slice_at(x, y) else {
            return self.pointer_left();
        };
        let panels = &self.panels;
        self.interaction.handle(InteractionEvent::PointerEnter { id, x, y }, |id| {
            format!("{}: {:.1}%", AGE_GROUPS[id.slice], panels[id.panel].shares[id.slice])
        })
    }

    pub fn pointer_left(&mut self) -> InteractionOutcome<SliceId> {
        self.interaction.handle(InteractionEvent::PointerLeave, |_| String::new())
    }

    /// Flips the clicked slice's label between its share and its age group.
    pub fn click(&mut self, x: f64, y: f64) -> InteractionOutcome<SliceId> {
        let Some(id) = self.slice_at(x, y) else {
            return InteractionOutcome::Unchanged;
        };
        if let Some(label) = self.panels[id.panel].labels.get_mut(id.slice) {
            *label = match *label {
                SliceLabel::Percent => SliceLabel::AgeGroup,
                SliceLabel::AgeGroup => SliceLabel::Percent,
            };
        }
        self.interaction.handle(InteractionEvent::Click(id), |_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FieldValue;

    fn chart() -> DonutChart {
        let rows = [
            ("India", "0-14", 40.5, 25.3),
            ("India", "15-64", 56.3, 67.8),
            ("India", "65+", 3.2, 6.9),
        ]
        .into_iter()
        .map(|(country, group, early, late)| {
            Record::from_iter([
                ("NAME", FieldValue::from(country)),
                ("AgeGroup", group.into()),
                ("1960", early.into()),
                ("2023", late.into()),
            ])
        })
        .collect::<Vec<_>>();
        let config = DonutConfig {
            countries: vec!["India".to_owned(), "Japan".to_owned()],
            ..DonutConfig::default()
        };
        DonutChart::new(&rows, &config)
    }

    fn point_in(chart: &DonutChart, id: SliceId) -> (f64, f64) {
        let (cx, cy) = chart.panel_center(id.panel);
        let (x, y) = chart.arc(id).unwrap().centroid();
        (cx + x, cy + y)
    }

    #[test]
    fn panels_are_years_by_countries() {
        let chart = chart();
        assert_eq!(chart.panels().len(), 4);
        assert_eq!(chart.panels()[2].year, "2023");
        assert_eq!(chart.panels()[2].shares, vec![25.3, 67.8, 6.9]);
        // Missing countries draw empty donuts.
        assert!(chart.panels()[1].arcs.iter().all(|arc| arc.span() == 0.0));
        assert_eq!(chart.size(), (440.0, 512.0));
    }

    #[test]
    fn hover_grows_the_slice_and_shows_its_share() {
        let mut chart = chart();
        let id = SliceId { panel: 0, slice: 1 };
        let (x, y) = point_in(&chart, id);
        chart.pointer_moved(x, y);

        assert_eq!(chart.tooltip().unwrap().text, "15-64: 56.3%");
        assert!((chart.arc(id).unwrap().outer_radius - 110.0).abs() < 1e-9);
        assert_eq!(chart.arc(SliceId { panel: 0, slice: 0 }).unwrap().outer_radius, 100.0);
    }

    #[test]
    fn click_flips_the_label() {
        let mut chart = chart();
        let id = SliceId { panel: 2, slice: 2 };
        assert_eq!(chart.label_text(id).as_deref(), Some("6.9%"));
        let (x, y) = point_in(&chart, id);
        chart.click(x, y);
        assert_eq!(chart.label_text(id).as_deref(), Some("65+"));
        chart.click(x, y);
        assert_eq!(chart.label_text(id).as_deref(), Some("6.9%"));
    }
}
