use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::boundaries::map_view;
use crate::data::metrics::{
    comparison, global_yearly_totals, lorenz_curve, rank_evolution, top_n,
    year_totals_by_country,
};
use crate::data::model::EmissionsTable;
use crate::state::{AppState, Tab};
use crate::ui::{no_data, panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct Co2ExplorerApp {
    pub state: AppState,
}

impl Co2ExplorerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for Co2ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: parameters ----
        egui::SidePanel::left("controls")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Interactive CO₂ emissions explorer");
            ui.horizontal(|ui: &mut Ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.state.tab, tab, tab.label());
                }
            });
            ui.separator();

            let Some(table) = self.state.table.clone() else {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open an emissions table to begin  (File → Open emissions…)");
                });
                return;
            };

            match self.state.tab {
                Tab::Map => map_tab(ui, &self.state, &table),
                Tab::Comparison => comparison_tab(ui, &self.state, &table),
                Tab::GlobalTrends => {
                    ui.strong("Global CO₂ emissions over time");
                    plot::global_trend_plot(ui, &global_yearly_totals(&table));
                }
                Tab::Inequality => {
                    ui.strong(format!("Distribution of emissions across countries, {}", self.state.year));
                    plot::lorenz_plot(ui, self.state.year, &lorenz_curve(&table, self.state.year));
                }
                Tab::About => about_tab(ui, &table),
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

fn map_tab(ui: &mut Ui, state: &AppState, table: &EmissionsTable) {
    let year = state.year;
    let totals = year_totals_by_country(table, year);

    match &state.boundaries {
        Some(boundaries) => {
            let cells = map_view(boundaries, table, year);
            let missing = cells.iter().filter(|c| c.co2.is_none()).count();
            ui.strong(format!("Emissions by country in {year}"));
            ui.label(
                RichText::new(format!(
                    "{missing} of {} countries have no data for the selected year (grey).",
                    cells.len()
                ))
                .color(Color32::GRAY),
            );
            ui.push_id("map_table", |ui: &mut Ui| {
                ui.set_max_height(ui.available_height() * 0.5);
                tables::map_table(ui, &cells);
            });
            ui.separator();
        }
        None => {
            ui.label(
                RichText::new("Load a boundary file (File → Open boundaries…) to list countries without data.")
                    .color(Color32::GRAY),
            );
        }
    }

    ui.strong(format!("Country totals in {year}"));
    if totals.is_empty() {
        no_data(ui, &format!("No emissions recorded for {year}."));
        return;
    }
    ui.push_id("year_totals", |ui: &mut Ui| {
        tables::year_totals_table(ui, &totals);
    });
}

fn comparison_tab(ui: &mut Ui, state: &AppState, table: &EmissionsTable) {
    let params = match state.query() {
        Ok(params) => params,
        Err(e) => {
            log::warn!("rejected comparison query: {e}");
            ui.colored_label(Color32::YELLOW, format!("⚠ {e}. Pick a start year before the end year."));
            return;
        }
    };

    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.strong(params.metric.label());
        plot::comparison_plot(ui, &comparison(table, &params), &state.country_colors);

        ui.separator();
        ui.strong(format!("Top {} emitters in {}", state.config.top_n, params.year));
        plot::top_emitters_chart(ui, params.year, &top_n(table, params.year, state.config.top_n));

        ui.separator();
        ui.strong("Rank among all countries");
        let range = params.year_range;
        match rank_evolution(table, &params.countries, range.lo(), range.hi()) {
            Ok(ranks) => plot::rank_plot(ui, &ranks, &state.country_colors),
            Err(e) => {
                ui.colored_label(Color32::YELLOW, format!("⚠ {e}"));
            }
        }
    });
}

fn about_tab(ui: &mut Ui, table: &EmissionsTable) {
    ui.heading("About the data");
    ui.add_space(6.0);
    ui.strong("Source");
    ui.label("Global Carbon Budget, as processed by Our World in Data.");
    ui.add_space(6.0);
    ui.strong("Units");
    ui.label(format!(
        "Tonnes of CO₂ emitted per year (value column: '{}').",
        table.value_column()
    ));
    ui.add_space(6.0);
    ui.strong("Design decisions");
    ui.label("• Countries without data for the selected year are shown in grey.");
    ui.label("• A continuous red scale maps higher emissions to higher intensity.");
    ui.label("• The year control drives the map, the ranking and the Lorenz curve.");
    ui.add_space(6.0);
    ui.strong("Limitations");
    ui.label("• Only entities with a three-letter code are kept; regions such as World or Asia are excluded.");
    ui.label("• Not every country has a complete series.");
    ui.label("• Emissions are territorial, not adjusted for consumption.");
}
