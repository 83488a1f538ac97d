use std::collections::BTreeSet;

use serde::Serialize;

// ---------------------------------------------------------------------------
// EmissionRecord – one row of the normalized table
// ---------------------------------------------------------------------------

/// A single `(country, code, year, co2)` observation.
///
/// `code` is always three uppercase characters. The same triple may appear
/// more than once in a source file, so consumers must sum, never index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionRecord {
    pub country: String,
    pub code: String,
    pub year: i64,
    pub co2: f64,
}

impl EmissionRecord {
    pub fn new(country: impl Into<String>, code: impl Into<String>, year: i64, co2: f64) -> Self {
        Self {
            country: country.into(),
            code: code.into(),
            year,
            co2,
        }
    }
}

// ---------------------------------------------------------------------------
// EmissionsTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The loaded emissions table. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionsTable {
    records: Vec<EmissionRecord>,
    /// Original header of the column that was detected as the value column.
    value_column: String,
}

impl EmissionsTable {
    pub fn new(records: Vec<EmissionRecord>, value_column: impl Into<String>) -> Self {
        Self {
            records,
            value_column: value_column.into(),
        }
    }

    /// Convenience constructor for in-memory tables.
    pub fn from_records(records: Vec<EmissionRecord>) -> Self {
        Self::new(records, "co2")
    }

    pub fn records(&self) -> &[EmissionRecord] {
        &self.records
    }

    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest and largest year present, `None` for an empty table.
    pub fn year_bounds(&self) -> Option<(i64, i64)> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    /// Sorted, de-duplicated country names.
    pub fn countries(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.country.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Which quantity the country comparison shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    Absolute,
    GlobalSharePercent,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::Absolute => "Absolute emissions",
            Metric::GlobalSharePercent => "Global share (%)",
        }
    }
}

/// Inclusive year interval with `lo <= hi`. Use [`YearRange::new`] to build
/// one; see `data::filter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub(crate) lo: i64,
    pub(crate) hi: i64,
}

/// Countries picked by the user, matched against either the name or the
/// ISO3 code of a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountrySelection(BTreeSet<String>);

impl CountrySelection {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(items.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.0.contains(item)
    }

    pub fn matches(&self, country: &str, code: &str) -> bool {
        self.0.contains(country) || self.0.contains(code)
    }

    /// Add `item` if absent, remove it otherwise.
    pub fn toggle(&mut self, item: &str) {
        if !self.0.remove(item) {
            self.0.insert(item.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Everything the presentation layer hands to the engine for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub year: i64,
    pub year_range: YearRange,
    pub countries: CountrySelection,
    pub metric: Metric,
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryTotal {
    pub country: String,
    pub code: String,
    pub co2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearTotal {
    pub year: i64,
    pub co2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub country: String,
    pub year: i64,
    pub co2: f64,
}

/// `share` is `None` when the global total of that year is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharePoint {
    pub country: String,
    pub year: i64,
    pub share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCountry {
    pub country: String,
    pub co2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankPoint {
    pub year: i64,
    pub country: String,
    pub co2: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LorenzPoint {
    pub country_share: f64,
    pub emissions_share: f64,
}

/// A boundary country joined with its emissions for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapCell {
    pub code: String,
    pub country: String,
    pub co2: Option<f64>,
}

/// Output of the country comparison, shaped by [`Metric`].
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonView {
    Absolute(Vec<SeriesPoint>),
    Share(Vec<SharePoint>),
}

impl ComparisonView {
    pub fn is_empty(&self) -> bool {
        match self {
            ComparisonView::Absolute(points) => points.is_empty(),
            ComparisonView::Share(points) => points.is_empty(),
        }
    }
}
