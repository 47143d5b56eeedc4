use eframe::egui::{self, Ui};

use chart_atlas::charts::{Chart, TreemapYear};
use chart_atlas::force::SimulationState;
use chart_atlas::util::format_thousands;

use super::super::ChartView;

impl ChartView {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading(self.chart.kind().label());
        ui.separator();

        match &mut self.chart {
            Chart::CirclePack(chart) => {
                let focus = chart.tree().node(chart.focus()).name.clone();
                ui.label(format!("Focus: {focus}"));
                let root = chart.tree().root();
                if ui.add_enabled(chart.focus() != root, egui::Button::new("Zoom out")).clicked() {
                    chart.zoom_to(root);
                }
                ui.add_space(6.0);
                ui.label("Click a circle to zoom in, the background to zoom out.");
            }
            Chart::Sunburst(chart) => {
                ui.label(format!("Nodes: {}", chart.tree().len()));
                ui.label("Hover a ring to trace its branch.");
            }
            Chart::Treemap(chart) => {
                let mut year = chart.year();
                ui.horizontal(|ui| {
                    ui.label("Year");
                    for option in TreemapYear::ALL {
                        ui.radio_value(&mut year, option, option.label());
                    }
                });
                chart.set_year(year);
                ui.label(format!("Total: {}", format_thousands(chart.tree().value(chart.tree().root()))));
            }
            Chart::ForceGraph(chart) => {
                let simulation = chart.simulation();
                ui.label(format!("Nodes: {}", simulation.graph().len()));
                ui.label(format!("Links: {}", simulation.graph().edges().len()));
                ui.label(format!("Ticks: {}", simulation.ticks()));
                ui.label(format!("Alpha: {:.3}", simulation.alpha()));
                let state = match simulation.state() {
                    SimulationState::Running => "running",
                    SimulationState::Dragging => "dragging",
                    SimulationState::Idle => "settled",
                };
                ui.label(format!("Simulation: {state}"));
                ui.label(format!("Zoom: {:.2}x", chart.transform().scale));
                ui.add_space(6.0);
                ui.label("Drag a node to pin it, drag the background to pan, scroll to zoom.");
            }
            Chart::MultiLine(chart) => {
                ui.label(format!("Zoom: {:.2}x", chart.zoom_scale()));
                if ui.button("Reset zoom").clicked() {
                    chart.reset_zoom();
                }
                ui.separator();
                let countries = chart.countries().to_vec();
                for country in countries {
                    let mut shown = chart.is_selected(&country);
                    if ui.checkbox(&mut shown, country.as_str()).changed() {
                        chart.toggle_selection(&country);
                    }
                }
            }
            Chart::StackedBar(chart) => {
                let [first, last] = chart.year_range();
                ui.label(format!("Years: {first} - {last}"));
                if ui.button("Reset").clicked() {
                    chart.reset();
                    self.brush = None;
                }
                ui.label("Drag across the bars to narrow the years.");
                ui.separator();
                let countries = chart.countries().to_vec();
                for country in countries {
                    let mut shown = chart.is_selected(&country);
                    if ui.checkbox(&mut shown, country.as_str()).changed() {
                        chart.toggle_country(&country);
                    }
                }
            }
            Chart::Donut(chart) => {
                ui.label(format!("Panels: {}", chart.panels().len()));
                ui.label("Click a slice to switch its label.");
            }
        }
    }
}
