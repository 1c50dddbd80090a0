use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::filter::CategoryMatch;
use crate::data::model::Category;
use crate::data::summary::TimeBucket;
use crate::state::{AppState, DatePreset};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Brand selector ----
            let brands = state
                .dataset
                .as_ref()
                .map(|ds| ds.brands.clone())
                .unwrap_or_default();
            ui.strong("Brand");
            let brand_text = state.brand.clone().unwrap_or_else(|| "All Brands".to_string());
            egui::ComboBox::from_id_salt("brand")
                .selected_text(brand_text)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(state.brand.is_none(), "All Brands")
                        .clicked()
                    {
                        state.brand = None;
                        changed = true;
                    }
                    for brand in &brands {
                        if ui
                            .selectable_label(state.brand.as_deref() == Some(brand), brand)
                            .clicked()
                        {
                            state.brand = Some(brand.clone());
                            changed = true;
                        }
                    }
                });
            ui.separator();

            // ---- Date range ----
            ui.strong("Date range");
            egui::ComboBox::from_id_salt("date_preset")
                .selected_text(state.date_preset.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for preset in DatePreset::ALL {
                        if ui
                            .selectable_label(state.date_preset == preset, preset.label())
                            .clicked()
                        {
                            state.date_preset = preset;
                            changed = true;
                        }
                    }
                });
            if state.date_preset == DatePreset::Custom {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("from");
                    if ui
                        .add(DatePickerButton::new(&mut state.custom_start).id_salt("start_date"))
                        .changed()
                    {
                        changed = true;
                    }
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("to");
                    if ui
                        .add(DatePickerButton::new(&mut state.custom_end).id_salt("end_date"))
                        .changed()
                    {
                        changed = true;
                    }
                });
            } else if let Some(range) = state.resolved_date_range() {
                ui.label(format!("{} to {}", range.start, range.end));
            }
            ui.separator();

            // ---- Ratings ----
            ui.strong("Ratings");
            for rating in 1..=5u8 {
                let label = if rating == 1 {
                    "1 Star".to_string()
                } else {
                    format!("{rating} Stars")
                };
                let mut checked = state.ratings.contains(&rating);
                if ui.checkbox(&mut checked, label).changed() {
                    if checked {
                        state.ratings.insert(rating);
                    } else {
                        state.ratings.remove(&rating);
                    }
                    changed = true;
                }
            }
            ui.separator();

            // ---- Categories ----
            ui.strong("Categories");
            for category in Category::ALL {
                let mut checked = state.categories.contains(&category);
                let response = ui.checkbox(&mut checked, category.label());
                if response.changed() {
                    if checked {
                        state.categories.insert(category);
                    } else {
                        state.categories.remove(&category);
                    }
                    changed = true;
                }
                response.on_hover_text(category.keywords().join(", "));
            }

            let match_label = match state.category_match {
                CategoryMatch::Intersects => "any selected category",
                CategoryMatch::ContainsAll => "all selected categories",
            };
            egui::ComboBox::from_id_salt("category_match")
                .selected_text(match_label)
                .show_ui(ui, |ui: &mut Ui| {
                    for (mode, label) in [
                        (CategoryMatch::Intersects, "any selected category"),
                        (CategoryMatch::ContainsAll, "all selected categories"),
                    ] {
                        if ui
                            .selectable_label(state.category_match == mode, label)
                            .clicked()
                        {
                            state.category_match = mode;
                            changed = true;
                        }
                    }
                });
            ui.separator();

            // ---- Timeline bucket ----
            ui.strong("Timeline buckets");
            egui::ComboBox::from_id_salt("bucket")
                .selected_text(state.bucket.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for bucket in [TimeBucket::Day, TimeBucket::Week, TimeBucket::Month] {
                        if ui
                            .selectable_label(state.bucket == bucket, bucket.label())
                            .clicked()
                        {
                            state.bucket = bucket;
                            changed = true;
                        }
                    }
                });
        });

    if changed {
        state.refilter();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state, false);
                ui.close_menu();
            }
            if ui.button("Append…").clicked() {
                open_file_dialog(state, true);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.loading {
            ui.spinner();
        }

        if let Some(ds) = &state.dataset {
            let span = ds
                .date_span
                .map(|(lo, hi)| format!(", {lo} to {hi}"))
                .unwrap_or_default();
            ui.label(format!(
                "{} reviews loaded, {} visible{span}",
                ds.len(),
                state.visible.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, append: bool) {
    let file = rfd::FileDialog::new()
        .set_title(if append {
            "Append review data"
        } else {
            "Open review data"
        })
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        // offset row-number fallback ids past the loaded dataset on append
        let id_offset = if append {
            state.dataset.as_ref().map(|ds| ds.len() as u64).unwrap_or(0)
        } else {
            0
        };
        match crate::data::loader::load_file(&path, id_offset) {
            Ok(reviews) => {
                log::info!("Loaded {} reviews from {}", reviews.len(), path.display());
                if append && state.dataset.is_some() {
                    state.append_reviews(reviews);
                } else {
                    state.set_dataset(crate::data::model::ReviewDataset::from_reviews(reviews));
                }
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                state.loading = false;
            }
        }
    }
}
