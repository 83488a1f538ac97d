use eframe::egui::{self, Color32, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::{reds, NO_DATA};
use crate::data::model::{CountryTotal, MapCell};
use crate::ui::format_tonnes;

const ROW_HEIGHT: f32 = 18.0;

fn swatch(ui: &mut Ui, color: Color32) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, 2.0, color);
}

/// Emissions of every country for the selected year, largest first.
pub fn year_totals_table(ui: &mut Ui, totals: &[CountryTotal]) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(180.0))
        .column(Column::auto().at_least(50.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Country");
            });
            header.col(|ui| {
                ui.strong("Code");
            });
            header.col(|ui| {
                ui.strong("CO₂");
            });
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, totals.len(), |mut row| {
                let t = &totals[row.index()];
                row.col(|ui| {
                    ui.label(t.country.as_str());
                });
                row.col(|ui| {
                    ui.monospace(t.code.as_str());
                });
                row.col(|ui| {
                    ui.label(format_tonnes(t.co2));
                });
            });
        });
}

/// Boundary countries joined with the year's emissions. Countries without
/// data are listed in grey.
pub fn map_table(ui: &mut Ui, cells: &[MapCell]) {
    let max = cells
        .iter()
        .filter_map(|c| c.co2)
        .fold(0.0_f64, f64::max);

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::exact(20.0))
        .column(Column::auto().at_least(50.0))
        .column(Column::auto().at_least(180.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|_| {});
            header.col(|ui| {
                ui.strong("Code");
            });
            header.col(|ui| {
                ui.strong("Country");
            });
            header.col(|ui| {
                ui.strong("CO₂");
            });
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, cells.len(), |mut row| {
                let cell = &cells[row.index()];
                let color = match cell.co2 {
                    Some(v) if max > 0.0 => reds(v / max),
                    Some(_) => reds(0.0),
                    None => NO_DATA,
                };
                row.col(|ui| swatch(ui, color));
                row.col(|ui| {
                    ui.monospace(cell.code.as_str());
                });
                row.col(|ui| {
                    ui.label(cell.country.as_str());
                });
                row.col(|ui| match cell.co2 {
                    Some(v) => {
                        ui.label(format_tonnes(v));
                    }
                    None => {
                        ui.colored_label(Color32::GRAY, "no data");
                    }
                });
            });
        });
}
