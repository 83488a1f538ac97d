use std::path::Path;
use std::sync::Arc;

use crate::color::CountryColors;
use crate::config::Config;
use crate::data::boundaries::BoundaryTable;
use crate::data::cache::TableCache;
use crate::data::error::{LoadError, QueryError};
use crate::data::model::{CountrySelection, EmissionsTable, Metric, QueryParams, YearRange};

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Map,
    Comparison,
    GlobalTrends,
    Inequality,
    About,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Map,
        Tab::Comparison,
        Tab::GlobalTrends,
        Tab::Inequality,
        Tab::About,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Map => "🌍 Global map",
            Tab::Comparison => "Country comparison",
            Tab::GlobalTrends => "📈 Global trends",
            Tab::Inequality => "Inequality",
            Tab::About => "ℹ About the data",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// The range sliders edit `range_lo`/`range_hi` freely; they only become a
/// [`YearRange`] in [`AppState::query`], which is where an inverted range is
/// reported.
pub struct AppState {
    pub config: Config,
    pub cache: TableCache,

    /// Loaded emissions table (None until a file is loaded).
    pub table: Option<Arc<EmissionsTable>>,
    /// Optional boundary attributes for the map tab.
    pub boundaries: Option<Arc<BoundaryTable>>,

    /// Sorted country names of the current table.
    pub countries: Vec<String>,
    /// Presets from the config that fall inside the table's years.
    pub preset_years: Vec<i64>,
    pub country_colors: CountryColors,

    pub year: i64,
    pub range_lo: i64,
    pub range_hi: i64,
    pub selected: CountrySelection,
    pub metric: Metric,
    /// Text filter for the country list.
    pub country_search: String,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cache: TableCache::default(),
            table: None,
            boundaries: None,
            countries: Vec::new(),
            preset_years: Vec::new(),
            country_colors: CountryColors::default(),
            year: 0,
            range_lo: 0,
            range_hi: 0,
            selected: CountrySelection::default(),
            metric: Metric::default(),
            country_search: String::new(),
            tab: Tab::default(),
            status_message: None,
        }
    }

    /// Load the files named in the config. Any failure here is fatal for
    /// startup, so it is returned instead of shown.
    pub fn load_configured(&mut self) -> Result<(), LoadError> {
        if let Some(path) = self.config.emissions_path.clone() {
            self.load_emissions(&path)?;
        }
        if let Some(path) = self.config.boundaries_path.clone() {
            self.load_boundaries(&path)?;
        }
        Ok(())
    }

    pub fn load_emissions(&mut self, path: &Path) -> Result<(), LoadError> {
        let table = self.cache.emissions(path)?;
        self.set_table(table);
        Ok(())
    }

    pub fn load_boundaries(&mut self, path: &Path) -> Result<(), LoadError> {
        self.boundaries = Some(self.cache.boundaries(path)?);
        Ok(())
    }

    /// Ingest a newly loaded table and reset every parameter to its default.
    pub fn set_table(&mut self, table: Arc<EmissionsTable>) {
        self.countries = table.countries();
        self.country_colors = CountryColors::new(&self.countries);

        let (min_year, max_year) = table.year_bounds().unwrap_or((0, 0));
        self.preset_years = self
            .config
            .preset_years
            .iter()
            .copied()
            .filter(|y| (min_year..=max_year).contains(y))
            .collect();
        self.year = max_year;

        let start = self.config.default_range_start.clamp(min_year, max_year);
        self.range_lo = start;
        self.range_hi = max_year;

        self.selected = CountrySelection::new(
            self.config
                .default_countries
                .iter()
                .filter(|c| self.countries.contains(*c))
                .cloned(),
        );

        log::info!(
            "dataset ready: {} rows, {} countries, years {min_year}..={max_year}",
            table.len(),
            self.countries.len()
        );
        self.table = Some(table);
        self.status_message = None;
    }

    /// Year bounds of the loaded table.
    pub fn year_bounds(&self) -> Option<(i64, i64)> {
        self.table.as_ref().and_then(|t| t.year_bounds())
    }

    /// Why the year controls cannot be shown, `None` when they can.
    pub fn controls_unavailable(&self) -> Option<&'static str> {
        match &self.table {
            None => Some("No dataset loaded."),
            Some(t) if t.is_empty() => {
                Some("The loaded table has no rows with a 3-letter code and a value.")
            }
            Some(_) => None,
        }
    }

    /// Snapshot of the current widget values for the engine.
    pub fn query(&self) -> Result<QueryParams, QueryError> {
        Ok(QueryParams {
            year: self.year,
            year_range: YearRange::new(self.range_lo, self.range_hi)?,
            countries: self.selected.clone(),
            metric: self.metric,
        })
    }

    /// Country names matching the search box, case-insensitively.
    pub fn visible_countries(&self) -> Vec<&str> {
        let needle = self.country_search.to_lowercase();
        self.countries
            .iter()
            .filter(|c| needle.is_empty() || c.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::EmissionRecord;

    fn sample() -> Arc<EmissionsTable> {
        Arc::new(EmissionsTable::from_records(vec![
            EmissionRecord::new("China", "CHN", 1950, 1.0),
            EmissionRecord::new("India", "IND", 1990, 2.0),
            EmissionRecord::new("Chile", "CHL", 2010, 3.0),
        ]))
    }

    #[test]
    fn defaults_follow_the_data() {
        let mut state = AppState::new(Config::default());
        state.set_table(sample());

        assert_eq!(state.year, 2010);
        assert_eq!(state.preset_years, vec![1951, 2000]);
        assert_eq!((state.range_lo, state.range_hi), (1960, 2010));
        assert_eq!(state.selected, CountrySelection::new(["China", "India"]));
    }

    #[test]
    fn range_start_is_clamped_into_bounds() {
        let config = Config {
            default_range_start: 1800,
            ..Config::default()
        };
        let mut state = AppState::new(config);
        state.set_table(sample());
        assert_eq!(state.range_lo, 1950);
    }

    #[test]
    fn inverted_sliders_surface_as_invalid_range() {
        let mut state = AppState::new(Config::default());
        state.set_table(sample());
        state.range_lo = 2005;
        state.range_hi = 2000;
        assert_eq!(
            state.query(),
            Err(QueryError::InvalidRange { lo: 2005, hi: 2000 })
        );
    }

    #[test]
    fn search_is_case_insensitive() {
        let mut state = AppState::new(Config::default());
        state.set_table(sample());
        state.country_search = "CH".into();
        assert_eq!(state.visible_countries(), vec!["Chile", "China"]);
    }

    #[test]
    fn empty_table_is_told_apart_from_no_table() {
        let mut state = AppState::new(Config::default());
        assert_eq!(state.controls_unavailable(), Some("No dataset loaded."));

        state.set_table(Arc::new(EmissionsTable::from_records(Vec::new())));
        assert!(state.table.is_some());
        assert_eq!(state.year_bounds(), None);
        let notice = state.controls_unavailable().unwrap();
        assert!(notice.starts_with("The loaded table has no rows"), "{notice}");

        state.set_table(sample());
        assert_eq!(state.controls_unavailable(), None);
    }
}
