use std::path::Path;

use anyhow::Result;
use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::export::{self, ExportRow};
use crate::state::{AppState, SortKey};

// ---------------------------------------------------------------------------
// Data tab (central panel)
// ---------------------------------------------------------------------------

/// Render the filtered reviews as a table with sort controls and
/// CSV/JSON export.
pub fn data_tab(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to browse reviews  (File → Open…)");
        });
        return;
    }

    controls(ui, state);
    ui.separator();

    let order = state.display_order();
    let Some(ds) = &state.dataset else { return };

    ui.label(format!(
        "Filtered Reviews ({} of {} total)",
        order.len(),
        ds.len()
    ));
    ui.add_space(4.0);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto()) // brand
        .column(Column::auto()) // customer
        .column(Column::auto()) // date
        .column(Column::auto()) // rating
        .column(Column::auto().at_least(120.0)) // categories
        .column(Column::remainder()) // text
        .header(20.0, |mut header| {
            for title in ["Brand", "Customer", "Date", "Rating", "Categories", "Review"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, order.len(), |mut row| {
                let r = &ds.reviews[order[row.index()]];
                row.col(|ui: &mut Ui| {
                    ui.label(&r.brand);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&r.customer);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(r.date.format("%Y-%m-%d").to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label("★".repeat(r.rating as usize));
                });
                row.col(|ui: &mut Ui| {
                    let cats = r
                        .categories
                        .iter()
                        .map(|c| c.label())
                        .collect::<Vec<_>>()
                        .join("; ");
                    ui.label(cats);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&r.text).on_hover_text(&r.text);
                });
            });
        });
}

// ---------------------------------------------------------------------------
// Sort / export controls
// ---------------------------------------------------------------------------

fn controls(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Sort by");
        egui::ComboBox::from_id_salt("sort_key")
            .selected_text(state.sort_key.label())
            .show_ui(ui, |ui: &mut Ui| {
                for key in SortKey::ALL {
                    ui.selectable_value(&mut state.sort_key, key, key.label());
                }
            });
        let arrow = if state.sort_ascending { "Ascending" } else { "Descending" };
        if ui.button(arrow).clicked() {
            state.sort_ascending = !state.sort_ascending;
        }

        ui.separator();

        if ui.button("Export CSV…").clicked() {
            export_dialog(state, "csv");
        }
        if ui.button("Export JSON…").clicked() {
            export_dialog(state, "json");
        }
    });
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

fn export_dialog(state: &mut AppState, extension: &str) {
    let brand_suffix = state
        .brand
        .as_deref()
        .unwrap_or("all_brands")
        .to_lowercase()
        .replace(' ', "_");
    let stamp = chrono::Local::now().format("%Y%m%d");
    let default_name = format!("{brand_suffix}_reviews_{stamp}.{extension}");

    let file = rfd::FileDialog::new()
        .set_title("Export filtered reviews")
        .set_file_name(&default_name)
        .add_filter(extension.to_uppercase(), &[extension])
        .save_file();

    let Some(path) = file else { return };
    let Some(ds) = &state.dataset else { return };

    // Exports keep the filter order, not the table's sort order.
    let rows = export::export_rows(ds, &state.visible);
    match write_export(&path, extension, &rows) {
        Ok(()) => {
            log::info!("Exported {} rows to {}", rows.len(), path.display());
            state.status_message = Some(format!("Exported {} rows", rows.len()));
        }
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Export failed: {e:#}"));
        }
    }
}

fn write_export(path: &Path, extension: &str, rows: &[ExportRow]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    match extension {
        "json" => export::write_json(file, rows),
        _ => export::write_csv(file, rows),
    }
}
