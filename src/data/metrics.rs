//! Derived views over an [`EmissionsTable`].
//!
//! Every function here is pure: it reads the table, builds a small result
//! and never mutates shared state. Grouping goes through `BTreeMap`, so
//! groups enter each sort in ascending key order, and every sort is Rust's
//! stable `sort_by`; ties therefore keep key order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use super::error::QueryError;
use super::filter::{in_range, in_selection, in_year};
use super::model::{
    ComparisonView, CountrySelection, CountryTotal, EmissionsTable, LorenzPoint, Metric,
    QueryParams, RankPoint, RankedCountry, SeriesPoint, SharePoint, YearRange, YearTotal,
};

/// Default length of the top-emitters ranking.
pub const DEFAULT_TOP_N: usize = 10;

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

/// Emissions per `(country, code)` for one year, largest first.
pub fn year_totals_by_country(table: &EmissionsTable, year: i64) -> Vec<CountryTotal> {
    let mut groups: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for r in table.records().iter().filter(in_year(year)) {
        *groups.entry((r.country.as_str(), r.code.as_str())).or_insert(0.0) += r.co2;
    }

    let mut totals: Vec<CountryTotal> = groups
        .into_iter()
        .map(|((country, code), co2)| CountryTotal {
            country: country.to_string(),
            code: code.to_string(),
            co2,
        })
        .collect();
    totals.sort_by(|a, b| descending(a.co2, b.co2));
    totals
}

/// Sum over all countries per year, oldest year first.
pub fn global_yearly_totals(table: &EmissionsTable) -> Vec<YearTotal> {
    yearly_sums(table)
        .into_iter()
        .map(|(year, co2)| YearTotal { year, co2 })
        .collect()
}

fn yearly_sums(table: &EmissionsTable) -> BTreeMap<i64, f64> {
    let mut sums = BTreeMap::new();
    for r in table.records() {
        *sums.entry(r.year).or_insert(0.0) += r.co2;
    }
    sums
}

// ---------------------------------------------------------------------------
// Country comparison
// ---------------------------------------------------------------------------

/// Rows of the selected countries within `[lo, hi]`, in table order.
///
/// An empty selection or an empty match is a valid, empty result.
pub fn country_series(
    table: &EmissionsTable,
    countries: &CountrySelection,
    lo: i64,
    hi: i64,
) -> Result<Vec<SeriesPoint>, QueryError> {
    let range = YearRange::new(lo, hi)?;
    Ok(series_in(table, countries, range))
}

fn series_in(table: &EmissionsTable, countries: &CountrySelection, range: YearRange) -> Vec<SeriesPoint> {
    table
        .records()
        .iter()
        .filter(in_range(range))
        .filter(in_selection(countries))
        .map(|r| SeriesPoint {
            country: r.country.clone(),
            year: r.year,
            co2: r.co2,
        })
        .collect()
}

/// Express each point as a percentage of that year's global total.
///
/// A year whose global total is zero yields `share: None`.
pub fn global_share_percent(table: &EmissionsTable, series: &[SeriesPoint]) -> Vec<SharePoint> {
    let global = yearly_sums(table);
    series
        .iter()
        .map(|p| {
            let total = global.get(&p.year).copied().unwrap_or(0.0);
            SharePoint {
                country: p.country.clone(),
                year: p.year,
                share: (total != 0.0).then(|| 100.0 * p.co2 / total),
            }
        })
        .collect()
}

/// The comparison chart's data for the current parameters.
pub fn comparison(table: &EmissionsTable, params: &QueryParams) -> ComparisonView {
    let series = series_in(table, &params.countries, params.year_range);
    match params.metric {
        Metric::Absolute => ComparisonView::Absolute(series),
        Metric::GlobalSharePercent => ComparisonView::Share(global_share_percent(table, &series)),
    }
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

/// The `n` largest emitters of `year`, with codes collapsed per country.
pub fn top_n(table: &EmissionsTable, year: i64, n: usize) -> Vec<RankedCountry> {
    let mut per_country: BTreeMap<String, f64> = BTreeMap::new();
    for t in year_totals_by_country(table, year) {
        *per_country.entry(t.country).or_insert(0.0) += t.co2;
    }

    let mut ranked: Vec<RankedCountry> = per_country
        .into_iter()
        .map(|(country, co2)| RankedCountry { country, co2 })
        .collect();
    ranked.sort_by(|a, b| descending(a.co2, b.co2));
    ranked.truncate(n);
    ranked
}

/// Year-by-year rank of the selected countries among all countries.
///
/// Ranks are by descending emissions with ties sharing the lowest rank
/// (`100, 100, 50` → `1, 1, 3`). Output is ordered by year, then rank, then
/// country name.
pub fn rank_evolution(
    table: &EmissionsTable,
    countries: &CountrySelection,
    lo: i64,
    hi: i64,
) -> Result<Vec<RankPoint>, QueryError> {
    let range = YearRange::new(lo, hi)?;

    // year -> country -> (first code seen, summed co2)
    let mut years: BTreeMap<i64, BTreeMap<&str, (&str, f64)>> = BTreeMap::new();
    for r in table.records().iter().filter(in_range(range)) {
        let entry = years
            .entry(r.year)
            .or_default()
            .entry(r.country.as_str())
            .or_insert((r.code.as_str(), 0.0));
        entry.1 += r.co2;
    }

    let mut out = Vec::new();
    for (year, groups) in years {
        let mut sorted: Vec<(&str, &str, f64)> = groups
            .into_iter()
            .map(|(country, (code, co2))| (country, code, co2))
            .collect();
        sorted.sort_by(|a, b| descending(a.2, b.2));

        let mut rank = 0;
        for (pos, &(country, code, co2)) in sorted.iter().enumerate() {
            if pos == 0 || sorted[pos - 1].2 != co2 {
                rank = pos + 1;
            }
            if countries.matches(country, code) {
                out.push(RankPoint {
                    year,
                    country: country.to_string(),
                    co2,
                    rank,
                });
            }
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Inequality
// ---------------------------------------------------------------------------

/// Lorenz curve of per-country emissions in `year`.
///
/// Countries with a non-positive total are left out. Point `i` (1-based) of
/// `n` has `country_share = i / n` and `emissions_share` equal to the
/// cumulative share of the `i` smallest emitters. No positive emitter means
/// an empty curve.
pub fn lorenz_curve(table: &EmissionsTable, year: i64) -> Vec<LorenzPoint> {
    let mut per_country: HashMap<&str, f64> = HashMap::new();
    for r in table.records().iter().filter(in_year(year)) {
        *per_country.entry(r.country.as_str()).or_insert(0.0) += r.co2;
    }

    let mut values: Vec<f64> = per_country.into_values().filter(|v| *v > 0.0).collect();
    values.sort_by(f64::total_cmp);

    let total: f64 = values.iter().sum();
    let n = values.len() as f64;
    let mut cumulative = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            cumulative += v;
            LorenzPoint {
                country_share: (i + 1) as f64 / n,
                emissions_share: cumulative / total,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::EmissionRecord;

    const EPS: f64 = 1e-9;

    fn table(rows: &[(&str, &str, i64, f64)]) -> EmissionsTable {
        EmissionsTable::from_records(
            rows.iter()
                .map(|&(country, code, year, co2)| EmissionRecord::new(country, code, year, co2))
                .collect(),
        )
    }

    fn scenario() -> EmissionsTable {
        table(&[("A", "AAA", 2000, 10.0), ("B", "BBB", 2000, 30.0), ("A", "AAA", 2001, 12.0)])
    }

    #[test]
    fn end_to_end_scenario() {
        let t = scenario();
        assert_eq!(
            global_yearly_totals(&t),
            vec![YearTotal { year: 2000, co2: 40.0 }, YearTotal { year: 2001, co2: 12.0 }]
        );

        let series = country_series(&t, &CountrySelection::new(["A"]), 2000, 2001).unwrap();
        assert_eq!(
            series,
            vec![
                SeriesPoint { country: "A".into(), year: 2000, co2: 10.0 },
                SeriesPoint { country: "A".into(), year: 2001, co2: 12.0 },
            ]
        );

        let shares = global_share_percent(&t, &series);
        assert_eq!(shares[0].share, Some(25.0));
        assert_eq!(shares[1].share, Some(100.0));
    }

    #[test]
    fn year_totals_sum_duplicates_and_sort_descending() {
        let t = table(&[
            ("A", "AAA", 2000, 1.0),
            ("B", "BBB", 2000, 2.0),
            ("A", "AAA", 2000, 5.0),
            ("C", "CCC", 1999, 100.0),
        ]);
        let totals = year_totals_by_country(&t, 2000);
        assert_eq!(
            totals,
            vec![
                CountryTotal { country: "A".into(), code: "AAA".into(), co2: 6.0 },
                CountryTotal { country: "B".into(), code: "BBB".into(), co2: 2.0 },
            ]
        );
        assert!(year_totals_by_country(&t, 1800).is_empty());
    }

    #[test]
    fn empty_selection_and_inverted_range() {
        let t = scenario();
        assert!(country_series(&t, &CountrySelection::default(), 2000, 2001)
            .unwrap()
            .is_empty());
        assert_eq!(
            country_series(&t, &CountrySelection::new(["A"]), 2001, 2000),
            Err(QueryError::InvalidRange { lo: 2001, hi: 2000 })
        );
        assert!(rank_evolution(&t, &CountrySelection::new(["A"]), 3, 2).is_err());
    }

    #[test]
    fn shares_over_all_countries_sum_to_hundred() {
        let t = table(&[
            ("A", "AAA", 2000, 3.0),
            ("B", "BBB", 2000, 7.5),
            ("C", "CCC", 2000, 0.25),
            ("A", "AAA", 2001, 0.0),
            ("B", "BBB", 2001, 0.0),
        ]);
        let everyone = CountrySelection::new(t.countries());
        let series = country_series(&t, &everyone, 2000, 2001).unwrap();
        let shares = global_share_percent(&t, &series);

        let sum_2000: f64 = shares
            .iter()
            .filter(|s| s.year == 2000)
            .map(|s| s.share.unwrap())
            .sum();
        assert!((sum_2000 - 100.0).abs() < EPS);
        assert!(shares.iter().filter(|s| s.year == 2001).all(|s| s.share.is_none()));
    }

    #[test]
    fn rank_ties_take_the_minimum_rank() {
        let t = table(&[("A", "AAA", 2000, 100.0), ("B", "BBB", 2000, 100.0), ("C", "CCC", 2000, 50.0)]);
        let ranks = rank_evolution(&t, &CountrySelection::new(["A", "B", "C"]), 2000, 2000).unwrap();
        let got: Vec<(&str, usize)> = ranks.iter().map(|p| (p.country.as_str(), p.rank)).collect();
        assert_eq!(got, vec![("A", 1), ("B", 1), ("C", 3)]);
    }

    #[test]
    fn rank_universe_includes_unselected_countries() {
        let t = table(&[
            ("A", "AAA", 2000, 10.0),
            ("B", "BBB", 2000, 20.0),
            ("A", "AAA", 2001, 30.0),
            ("B", "BBB", 2001, 20.0),
            ("A", "AAA", 2002, 99.0),
        ]);
        let ranks = rank_evolution(&t, &CountrySelection::new(["AAA"]), 2000, 2001).unwrap();
        assert_eq!(
            ranks,
            vec![
                RankPoint { year: 2000, country: "A".into(), co2: 10.0, rank: 2 },
                RankPoint { year: 2001, country: "A".into(), co2: 30.0, rank: 1 },
            ]
        );
    }

    #[test]
    fn top_n_is_bounded_sorted_and_collapsed() {
        let mut rows = Vec::new();
        for i in 0..15 {
            rows.push((format!("C{i:02}"), format!("C{i:02}"), 2000, i as f64));
        }
        // Second code for the same country name.
        rows.push(("C00".to_string(), "XXX".to_string(), 2000, 50.0));
        let t = EmissionsTable::from_records(
            rows.into_iter()
                .map(|(country, code, year, co2)| EmissionRecord::new(country, code, year, co2))
                .collect(),
        );

        let top = top_n(&t, 2000, DEFAULT_TOP_N);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0], RankedCountry { country: "C00".into(), co2: 50.0 });
        assert!(top.windows(2).all(|w| w[0].co2 >= w[1].co2));

        // Every ranked row is a per-country total of that year.
        let mut by_country: BTreeMap<String, f64> = BTreeMap::new();
        for row in year_totals_by_country(&t, 2000) {
            *by_country.entry(row.country).or_insert(0.0) += row.co2;
        }
        for row in &top {
            assert_eq!(by_country.get(&row.country), Some(&row.co2), "{}", row.country);
        }
        assert_eq!(top_n(&t, 1990, DEFAULT_TOP_N), Vec::new());
    }

    #[test]
    fn top_n_ties_keep_name_order() {
        let t = table(&[("B", "BBB", 2000, 1.0), ("A", "AAA", 2000, 1.0), ("C", "CCC", 2000, 2.0)]);
        let names: Vec<String> = top_n(&t, 2000, 3).into_iter().map(|r| r.country).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn lorenz_points_for_five_five_ten() {
        let t = table(&[
            ("A", "AAA", 2000, 10.0),
            ("B", "BBB", 2000, 5.0),
            ("C", "CCC", 2000, 5.0),
            ("D", "DDD", 2000, 0.0),
        ]);
        let curve = lorenz_curve(&t, 2000);
        let expected = [(1.0 / 3.0, 0.25), (2.0 / 3.0, 0.5), (1.0, 1.0)];
        assert_eq!(curve.len(), expected.len());
        for (p, (x, y)) in curve.iter().zip(expected) {
            assert!((p.country_share - x).abs() < EPS);
            assert!((p.emissions_share - y).abs() < EPS);
        }
    }

    #[test]
    fn lorenz_without_positive_emitters_is_empty() {
        let t = table(&[("A", "AAA", 2000, 0.0)]);
        assert!(lorenz_curve(&t, 2000).is_empty());
        assert!(lorenz_curve(&t, 1990).is_empty());
    }

    #[test]
    fn comparison_follows_the_metric() {
        let t = scenario();
        let mut params = QueryParams {
            year: 2000,
            year_range: YearRange::new(2000, 2000).unwrap(),
            countries: CountrySelection::new(["B"]),
            metric: Metric::Absolute,
        };
        assert_eq!(
            comparison(&t, &params),
            ComparisonView::Absolute(vec![SeriesPoint { country: "B".into(), year: 2000, co2: 30.0 }])
        );

        params.metric = Metric::GlobalSharePercent;
        match comparison(&t, &params) {
            ComparisonView::Share(points) => assert_eq!(points[0].share, Some(75.0)),
            other => panic!("unexpected view: {other:?}"),
        }
    }
}
