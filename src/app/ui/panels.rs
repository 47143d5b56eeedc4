use eframe::egui::{self, Align, Context, Layout};

use chart_atlas::charts::ChartKind;

use super::super::ChartAtlasApp;

impl ChartAtlasApp {
    /// Chart tabs and reload. Writes the chart to (re)load into `requested`.
    pub(in crate::app) fn draw_top_bar(&self, ctx: &Context, requested: &mut Option<ChartKind>) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("chart-atlas");
                    ui.separator();
                    for kind in ChartKind::ALL {
                        let tab = ui.selectable_label(self.active == kind, kind.label());
                        if tab.clicked() && self.active != kind {
                            *requested = Some(kind);
                        }
                    }
                    ui.separator();
                    let reload = ui.add_enabled(!self.fetcher.is_pending(), egui::Button::new("Reload data"));
                    if reload.clicked() {
                        *requested = Some(self.active);
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!("data: {}", self.data_dir.display()));
                        ui.label(self.active.title());
                    });
                });
            });
    }

    /// The shared overlay; whichever chart holds the live lease decides what
    /// it shows.
    pub(in crate::app) fn draw_tooltip(&self, ctx: &Context) {
        let Some(tooltip) = self.tooltips.current() else {
            return;
        };

        egui::Area::new(egui::Id::new("chart_tooltip"))
            .order(egui::Order::Tooltip)
            .fixed_pos(egui::pos2(tooltip.x as f32, tooltip.y as f32))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(tooltip.text.as_str());
                });
            });
    }
}
