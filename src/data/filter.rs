use super::error::QueryError;
use super::model::{CountrySelection, EmissionRecord, YearRange};

// ---------------------------------------------------------------------------
// Row predicates
// ---------------------------------------------------------------------------

impl YearRange {
    /// Build an inclusive range. Bounds are never swapped silently.
    pub fn new(lo: i64, hi: i64) -> Result<Self, QueryError> {
        if lo > hi {
            return Err(QueryError::InvalidRange { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> i64 {
        self.lo
    }

    pub fn hi(&self) -> i64 {
        self.hi
    }

    pub fn contains(&self, year: i64) -> bool {
        self.lo <= year && year <= self.hi
    }
}

/// Rows of exactly one year.
pub fn in_year(year: i64) -> impl Fn(&&EmissionRecord) -> bool {
    move |r: &&EmissionRecord| r.year == year
}

/// Rows inside an inclusive year range.
pub fn in_range(range: YearRange) -> impl Fn(&&EmissionRecord) -> bool {
    move |r: &&EmissionRecord| range.contains(r.year)
}

/// Rows whose country name or code is selected.
///
/// An empty selection matches nothing.
pub fn in_selection(selection: &CountrySelection) -> impl Fn(&&EmissionRecord) -> bool + '_ {
    move |r: &&EmissionRecord| selection.matches(&r.country, &r.code)
}
