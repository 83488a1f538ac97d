use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, LineStyle, Plot, PlotPoints, Points};

use crate::color::{reds, CountryColors};
use crate::data::model::{ComparisonView, LorenzPoint, RankPoint, RankedCountry, YearTotal};
use crate::ui::{format_tonnes, no_data};

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Country comparison (absolute or share)
// ---------------------------------------------------------------------------

/// One line per country. Undefined shares split the line into segments.
pub fn comparison_plot(ui: &mut Ui, view: &ComparisonView, colors: &CountryColors) {
    if view.is_empty() {
        no_data(ui, "Select countries and a valid year range.");
        return;
    }

    // country -> [(year, value or gap)]
    let mut by_country: BTreeMap<&str, Vec<(i64, Option<f64>)>> = BTreeMap::new();
    let y_label = match view {
        ComparisonView::Absolute(points) => {
            for p in points {
                by_country.entry(&p.country).or_default().push((p.year, Some(p.co2)));
            }
            "CO₂ emissions (t)"
        }
        ComparisonView::Share(points) => {
            for p in points {
                by_country.entry(&p.country).or_default().push((p.year, p.share));
            }
            "Share of global emissions (%)"
        }
    };

    Plot::new("comparison_plot")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label(y_label)
        .include_y(0.0)
        .show(ui, |plot_ui| {
            for (country, mut points) in by_country {
                points.sort_by_key(|(year, _)| *year);
                let color = colors.color_for(country);
                for segment in segments(&points) {
                    plot_ui.line(Line::new(PlotPoints::from(segment)).name(country).color(color).width(1.5));
                }
            }
        });
}

/// Split a series at gaps into contiguous runs of `[x, y]` points.
fn segments(points: &[(i64, Option<f64>)]) -> Vec<Vec<[f64; 2]>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for &(year, value) in points {
        match value {
            Some(v) => current.push([year as f64, v]),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

// ---------------------------------------------------------------------------
// Top emitters
// ---------------------------------------------------------------------------

/// Horizontal bars, largest emitter on top.
pub fn top_emitters_chart(ui: &mut Ui, year: i64, ranked: &[RankedCountry]) {
    if ranked.is_empty() {
        no_data(ui, &format!("No emissions recorded for {year}."));
        return;
    }

    let n = ranked.len();
    let max = ranked.first().map_or(1.0, |r| r.co2.max(f64::MIN_POSITIVE));
    let bars: Vec<Bar> = ranked
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Bar::new((n - i) as f64, r.co2)
                .name(format!("{} – {}", r.country, format_tonnes(r.co2)))
                .fill(reds(0.25 + 0.75 * r.co2 / max))
        })
        .collect();

    let names: Vec<String> = ranked.iter().map(|r| r.country.clone()).collect();
    Plot::new("top_emitters")
        .height(CHART_HEIGHT)
        .x_axis_label("CO₂ emissions (t)")
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            bar_label(&names, mark.value)
        })
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

/// Axis label for the bar at position `value` (top bar = `names.len()`).
fn bar_label(names: &[String], value: f64) -> String {
    let pos = value.round();
    if (value - pos).abs() > 1e-6 || pos < 1.0 || pos > names.len() as f64 {
        return String::new();
    }
    names[names.len() - pos as usize].clone()
}

// ---------------------------------------------------------------------------
// Rank evolution
// ---------------------------------------------------------------------------

/// Bump chart: rank 1 at the top.
pub fn rank_plot(ui: &mut Ui, ranks: &[RankPoint], colors: &CountryColors) {
    if ranks.is_empty() {
        no_data(ui, "No ranking for this selection.");
        return;
    }

    let mut by_country: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for p in ranks {
        by_country
            .entry(&p.country)
            .or_default()
            .push([p.year as f64, -(p.rank as f64)]);
    }

    Plot::new("rank_plot")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Rank")
        .y_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            if mark.value < 0.0 && mark.value.fract() == 0.0 {
                format!("#{}", -mark.value as i64)
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            for (country, points) in by_country {
                let color = colors.color_for(country);
                plot_ui.line(Line::new(PlotPoints::from(points.clone())).name(country).color(color));
                plot_ui.points(Points::new(PlotPoints::from(points)).name(country).color(color).radius(3.0));
            }
        });
}

// ---------------------------------------------------------------------------
// Global trend
// ---------------------------------------------------------------------------

pub fn global_trend_plot(ui: &mut Ui, totals: &[YearTotal]) {
    if totals.is_empty() {
        no_data(ui, "The loaded table has no rows to total.");
        return;
    }

    let points: PlotPoints = totals.iter().map(|t| [t.year as f64, t.co2]).collect();
    Plot::new("global_trend")
        .x_axis_label("Year")
        .y_axis_label("Global CO₂ emissions (t)")
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("Global emissions")
                    .color(reds(0.8))
                    .width(2.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Lorenz curve
// ---------------------------------------------------------------------------

/// Lorenz curve with the line of perfect equality for reference.
pub fn lorenz_plot(ui: &mut Ui, year: i64, curve: &[LorenzPoint]) {
    if curve.is_empty() {
        no_data(ui, &format!("No country has positive emissions in {year}."));
        return;
    }

    let points: PlotPoints = std::iter::once([0.0, 0.0])
        .chain(curve.iter().map(|p| [p.country_share, p.emissions_share]))
        .collect();

    Plot::new("lorenz_plot")
        .legend(Legend::default())
        .data_aspect(1.0)
        .x_axis_label("Cumulative share of countries")
        .y_axis_label("Cumulative share of emissions")
        .include_x(0.0)
        .include_x(1.0)
        .include_y(0.0)
        .include_y(1.0)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(vec![[0.0, 0.0], [1.0, 1.0]]))
                    .name("Perfect equality")
                    .color(Color32::GRAY)
                    .style(LineStyle::dashed_dense()),
            );
            plot_ui.line(
                Line::new(points)
                    .name(format!("Lorenz curve {year}"))
                    .color(reds(0.8))
                    .width(2.0),
            );
        });
}
