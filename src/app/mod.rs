use std::path::PathBuf;

use eframe::egui::{self, Context, Ui};
use tracing::{error, info};

use chart_atlas::charts::{Chart, ChartData, ChartKind};
use chart_atlas::config::GalleryConfig;
use chart_atlas::data::Fetcher;
use chart_atlas::interaction::{TooltipLease, TooltipService};

mod axes;
mod canvas;
mod donut;
mod graph;
mod hierarchy;
mod render_utils;
mod ui;

pub struct ChartAtlasApp {
    data_dir: PathBuf,
    config: GalleryConfig,
    active: ChartKind,
    fetcher: Fetcher<ChartData>,
    tooltips: TooltipService,
    state: AppState,
}

enum AppState {
    Loading,
    Ready(Box<ChartView>),
    Error(String),
}

/// A mounted chart and its claim on the tooltip overlay.
struct ChartView {
    chart: Chart,
    lease: TooltipLease,
    /// In-progress stacked-bar brush, `[anchor, current]` in canvas x.
    brush: Option<[f64; 2]>,
}

impl ChartView {
    fn new(chart: Chart, tooltips: &TooltipService) -> Self {
        let lease = tooltips.acquire(chart.kind().label());
        Self {
            chart,
            lease,
            brush: None,
        }
    }

    fn show(&mut self, ui: &mut Ui) {
        let elapsed_ms = f64::from(ui.input(|input| input.stable_dt)) * 1000.0;
        let canvas = match &mut self.chart {
            Chart::CirclePack(chart) => hierarchy::circle_pack(ui, chart, elapsed_ms),
            Chart::Sunburst(chart) => hierarchy::sunburst(ui, chart),
            Chart::Treemap(chart) => hierarchy::treemap(ui, chart),
            Chart::ForceGraph(chart) => graph::force_graph(ui, chart, elapsed_ms),
            Chart::MultiLine(chart) => axes::multi_line(ui, chart),
            Chart::StackedBar(chart) => axes::stacked_bar(ui, chart, &mut self.brush),
            Chart::Donut(chart) => donut::donut(ui, chart),
        };

        let tooltip = self.chart.tooltip().map(|tooltip| canvas.tooltip(tooltip));
        self.lease.sync(tooltip.as_ref());
    }
}

impl Drop for ChartView {
    fn drop(&mut self) {
        if let Chart::ForceGraph(chart) = &mut self.chart {
            chart.stop();
        }
    }
}

impl ChartAtlasApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        data_dir: PathBuf,
        config: GalleryConfig,
        initial: ChartKind,
    ) -> Self {
        let mut app = Self {
            data_dir,
            config,
            active: initial,
            fetcher: Fetcher::new(),
            tooltips: TooltipService::new(),
            state: AppState::Loading,
        };
        app.load(initial);
        app
    }

    /// Unmounts the current chart and fetches data for `kind`. A request
    /// issued while another is in flight supersedes it.
    fn load(&mut self, kind: ChartKind) {
        info!(chart = %kind, data_dir = %self.data_dir.display(), "loading chart data");
        self.active = kind;
        self.state = AppState::Loading;
        let data_dir = self.data_dir.clone();
        self.fetcher.request(move || ChartData::load(kind, &data_dir));
    }

    fn mount(&self, result: anyhow::Result<ChartData>) -> AppState {
        match result.and_then(|data| Chart::build(self.active, data, &self.config)) {
            Ok(chart) => {
                info!(chart = %self.active, "chart mounted");
                AppState::Ready(Box::new(ChartView::new(chart, &self.tooltips)))
            }
            Err(error) => {
                let message = format!("{error:#}");
                error!(chart = %self.active, error = %message, "failed to load chart");
                AppState::Error(message)
            }
        }
    }
}

impl eframe::App for ChartAtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if let Some(result) = self.fetcher.poll() {
            self.state = self.mount(result);
        }

        let mut requested = None;
        self.draw_top_bar(ctx, &mut requested);

        match &mut self.state {
            AppState::Loading => {
                ctx.request_repaint();
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading(format!("Loading {}...", self.active.title()));
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading(format!("Failed to load {}", self.active.title()));
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        requested = Some(self.active);
                    }
                });
            }
            AppState::Ready(view) => {
                egui::SidePanel::left("controls")
                    .resizable(true)
                    .default_width(260.0)
                    .show(ctx, |ui| view.draw_controls(ui));
                egui::CentralPanel::default().show(ctx, |ui| view.show(ui));
            }
        }

        self.draw_tooltip(ctx);

        if let Some(kind) = requested {
            self.load(kind);
        }
    }
}
