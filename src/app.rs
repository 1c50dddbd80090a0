use eframe::egui;

use crate::state::{AppState, Tab};
use crate::ui::{charts, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ReviewLensApp {
    pub state: AppState,
}

impl eframe::App for ReviewLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard / data tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.state.tab, Tab::Dashboard, "📊 Dashboard");
                ui.selectable_value(&mut self.state.tab, Tab::Data, "📋 Data");
            });
            ui.separator();

            match self.state.tab {
                Tab::Dashboard => charts::dashboard(ui, &self.state),
                Tab::Data => table::data_tab(ui, &mut self.state),
            }
        });
    }
}
