use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::metrics::year_totals_by_country;
use crate::data::model::{CountryTotal, Metric};
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – parameter widgets
// ---------------------------------------------------------------------------

/// Render the controls that feed `QueryParams`.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    if let Some(notice) = state.controls_unavailable() {
        ui.label(notice);
        return;
    }
    let Some((min_year, max_year)) = state.year_bounds() else {
        return;
    };

    // ---- Highlighted years ----
    ui.strong("Highlighted years");
    let presets = state.preset_years.clone();
    let current = presets.contains(&state.year).then_some(state.year);
    egui::ComboBox::from_id_salt("preset_year")
        .selected_text(current.map_or("None".to_string(), |y| y.to_string()))
        .show_ui(ui, |ui: &mut Ui| {
            for y in presets {
                if ui.selectable_label(current == Some(y), y.to_string()).clicked() {
                    state.year = y;
                }
            }
        });

    ui.add_space(4.0);
    ui.strong("Year");
    ui.add(egui::Slider::new(&mut state.year, min_year..=max_year));
    ui.label(
        RichText::new("Drives the map, the ranking and the Lorenz curve.")
            .small()
            .color(Color32::GRAY),
    );

    if state.tab != Tab::Comparison {
        return;
    }

    ui.separator();

    // ---- Year range ----
    ui.strong("Year range");
    ui.add(egui::Slider::new(&mut state.range_lo, min_year..=max_year).text("from"));
    ui.add(egui::Slider::new(&mut state.range_hi, min_year..=max_year).text("to"));

    ui.add_space(4.0);
    ui.strong("Metric");
    for metric in [Metric::Absolute, Metric::GlobalSharePercent] {
        ui.radio_value(&mut state.metric, metric, metric.label());
    }

    ui.separator();

    // ---- Country selection ----
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(format!("Countries ({} selected)", state.selected.len()));
        if ui.small_button("None").clicked() {
            state.selected.clear();
        }
    });
    ui.add(egui::TextEdit::singleline(&mut state.country_search).hint_text("Search…"));

    let visible: Vec<String> = state
        .visible_countries()
        .into_iter()
        .map(str::to_string)
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for country in &visible {
                let mut checked = state.selected.contains(country);
                let text = RichText::new(country).color(state.country_colors.color_for(country));
                if ui.checkbox(&mut checked, text).changed() {
                    state.selected.toggle(country);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open emissions…").clicked() {
                open_emissions_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open boundaries…").clicked() {
                open_boundaries_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            let has_table = state.table.is_some();
            if ui
                .add_enabled(has_table, egui::Button::new("Export year totals…"))
                .clicked()
            {
                export_year_totals_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} rows, {} countries",
                table.len(),
                state.countries.len()
            ));
        }
        if let Some(b) = &state.boundaries {
            ui.separator();
            ui.label(format!("{} boundary countries", b.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_emissions_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open emissions table")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_emissions(&path) {
            log::error!("Failed to load emissions: {e:#}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}

pub fn open_boundaries_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open country boundaries (attribute table)")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match state.load_boundaries(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to load boundaries: {e:#}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

/// Save the selected year's per-country totals as pretty-printed JSON.
pub fn export_year_totals_dialog(state: &mut AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let year = state.year;
    let file = rfd::FileDialog::new()
        .set_title("Export year totals")
        .set_file_name(format!("co2_{year}.json"))
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        let totals = year_totals_by_country(table, year);
        match write_json(&path, &totals) {
            Ok(()) => log::info!("Exported {} rows to {}", totals.len(), path.display()),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn write_json(path: &Path, totals: &[CountryTotal]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), totals).context("writing JSON")?;
    Ok(())
}
