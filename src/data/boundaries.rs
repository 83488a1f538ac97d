use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::error::LoadError;
use super::filter::in_year;
use super::model::{EmissionsTable, MapCell};

// ---------------------------------------------------------------------------
// Country boundary attributes
// ---------------------------------------------------------------------------

/// One boundary feature: the join key and its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryCountry {
    pub code: String,
    pub country: String,
}

/// Boundary countries, unique by code, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoundaryTable {
    countries: Vec<BoundaryCountry>,
}

impl BoundaryTable {
    /// Keeps the first entry per (uppercased) code.
    pub fn new(rows: impl IntoIterator<Item = BoundaryCountry>) -> Self {
        let mut seen = HashSet::new();
        let countries = rows
            .into_iter()
            .map(|mut c| {
                c.code = c.code.to_uppercase();
                c
            })
            .filter(|c| seen.insert(c.code.clone()))
            .collect();
        Self { countries }
    }

    pub fn countries(&self) -> &[BoundaryCountry] {
        &self.countries
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

/// Load the attribute table of an admin-0 boundary dataset exported as CSV.
///
/// Only `ISO_A3` (join key) and `NAME` (display name) are read; geometry is
/// left to the renderer.
pub fn load_boundaries(path: &Path) -> Result<BoundaryTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };
    let code_idx = column("ISO_A3")?;
    let name_idx = column("NAME")?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(BoundaryCountry {
            code: record.get(code_idx).unwrap_or("").to_string(),
            country: record.get(name_idx).unwrap_or("").to_string(),
        });
    }

    let table = BoundaryTable::new(rows);
    log::info!("Loaded {} boundary countries from {}", table.len(), path.display());
    Ok(table)
}

// ---------------------------------------------------------------------------
// Choropleth join
// ---------------------------------------------------------------------------

/// Left-join the emissions of `year` (summed per code) onto every boundary
/// country. Countries without rows that year get `co2: None`.
pub fn map_view(boundaries: &BoundaryTable, table: &EmissionsTable, year: i64) -> Vec<MapCell> {
    let mut per_code: HashMap<&str, f64> = HashMap::new();
    for r in table.records().iter().filter(in_year(year)) {
        *per_code.entry(r.code.as_str()).or_insert(0.0) += r.co2;
    }

    boundaries
        .countries()
        .iter()
        .map(|b| MapCell {
            code: b.code.clone(),
            country: b.country.clone(),
            co2: per_code.get(b.code.as_str()).copied(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::data::model::EmissionRecord;

    #[test]
    fn boundaries_are_deduplicated_by_code() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "NAME,ISO_A3,POP_EST").unwrap();
        writeln!(file, "France,fra,1").unwrap();
        writeln!(file, "France (overseas),FRA,2").unwrap();
        writeln!(file, "Chile,CHL,3").unwrap();
        file.flush().unwrap();

        let table = load_boundaries(file.path()).unwrap();
        assert_eq!(
            table.countries(),
            &[
                BoundaryCountry { code: "FRA".into(), country: "France".into() },
                BoundaryCountry { code: "CHL".into(), country: "Chile".into() },
            ]
        );
    }

    #[test]
    fn missing_iso_column_is_reported() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "NAME,ADM0_A3").unwrap();
        file.flush().unwrap();
        match load_boundaries(file.path()).unwrap_err() {
            LoadError::MissingColumn { column, .. } => assert_eq!(column, "ISO_A3"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn map_view_marks_countries_without_data() {
        let boundaries = BoundaryTable::new([
            BoundaryCountry { code: "AAA".into(), country: "A".into() },
            BoundaryCountry { code: "ZZZ".into(), country: "Z".into() },
        ]);
        let table = EmissionsTable::from_records(vec![
            EmissionRecord::new("A", "AAA", 2000, 4.0),
            EmissionRecord::new("A", "AAA", 2000, 6.0),
            EmissionRecord::new("Z", "ZZZ", 1999, 1.0),
        ]);

        let cells = map_view(&boundaries, &table, 2000);
        assert_eq!(cells[0].co2, Some(10.0));
        assert_eq!(cells[1].co2, None);
    }
}
