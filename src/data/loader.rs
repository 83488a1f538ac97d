use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::LoadError;
use super::model::{EmissionRecord, EmissionsTable};

/// Source header → normalized name. Exact, case-sensitive match.
const RENAMES: [(&str, &str); 3] = [("Entity", "country"), ("Code", "code"), ("Year", "year")];

/// Cells treated as "no value" in text sources.
const MISSING_MARKERS: [&str; 8] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "-"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an emissions table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` / `.pq` – columns `Entity`, `Code`, `Year` plus one value column
/// * anything else      – delimited text (CSV) with the same header layout
///
/// The result only holds rows with a three-letter code and a present value,
/// in file order.
pub fn load_emissions(path: &Path) -> Result<EmissionsTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (table, stats) = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        _ => load_csv(path)?,
    };

    log::info!(
        "Loaded {} rows from {} (value column '{}', {} rows without a 3-letter code, {} rows without a value)",
        table.len(),
        path.display(),
        table.value_column(),
        stats.dropped_code,
        stats.dropped_missing
    );
    if table.is_empty() {
        log::warn!("{} has no rows with a 3-letter code and a value", path.display());
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Schema detection
// ---------------------------------------------------------------------------

/// Column positions resolved from a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub country: usize,
    pub code: usize,
    pub year: usize,
    /// First column, in original order, that is none of the above.
    pub value: usize,
    pub value_name: String,
}

fn normalized_name(header: &str) -> &str {
    RENAMES
        .iter()
        .find(|(from, _)| *from == header)
        .map(|(_, to)| *to)
        .unwrap_or(header)
}

/// Resolve the fixed columns and pick the value column by elimination.
///
/// Fails with [`LoadError::MissingColumn`] when `Entity`, `Code` or `Year`
/// is absent, and with [`LoadError::Schema`] when no other column is left.
pub fn detect_schema(path: &Path, headers: &[String]) -> Result<ColumnLayout, LoadError> {
    let position = |source: &str, target: &str| {
        headers
            .iter()
            .position(|h| normalized_name(h) == target)
            .ok_or_else(|| LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: source.to_string(),
            })
    };

    let country = position("Entity", "country")?;
    let code = position("Code", "code")?;
    let year = position("Year", "year")?;

    let value = headers
        .iter()
        .position(|h| !matches!(normalized_name(h), "country" | "code" | "year"))
        .ok_or_else(|| LoadError::Schema {
            path: path.to_path_buf(),
            columns: headers.to_vec(),
        })?;

    Ok(ColumnLayout {
        country,
        code,
        year,
        value,
        value_name: headers[value].clone(),
    })
}

// ---------------------------------------------------------------------------
// Row normalization (shared by both readers)
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct LoadStats {
    dropped_code: usize,
    dropped_missing: usize,
}

#[derive(Debug, Default)]
struct Normalizer {
    records: Vec<EmissionRecord>,
    stats: LoadStats,
}

impl Normalizer {
    /// Apply the code filter, then the missing-value filter, then year
    /// coercion. Year and value are parsed lazily so rows dropped by an
    /// earlier step never raise parse errors.
    fn push(
        &mut self,
        country: String,
        code: Option<&str>,
        year: impl FnOnce() -> Result<i64, LoadError>,
        co2: impl FnOnce() -> Result<Option<f64>, LoadError>,
    ) -> Result<(), LoadError> {
        let code = code.unwrap_or("").to_uppercase();
        if code.chars().count() != 3 {
            self.stats.dropped_code += 1;
            return Ok(());
        }

        let Some(co2) = co2()? else {
            self.stats.dropped_missing += 1;
            return Ok(());
        };

        self.records.push(EmissionRecord {
            country,
            code,
            year: year()?,
            co2,
        });
        Ok(())
    }

    fn finish(self, value_column: String) -> (EmissionsTable, LoadStats) {
        log::debug!(
            "normalizer kept {} rows, dropped {} (code) + {} (missing value)",
            self.records.len(),
            self.stats.dropped_code,
            self.stats.dropped_missing
        );
        (EmissionsTable::new(self.records, value_column), self.stats)
    }
}

fn invalid(row: usize, column: &str, value: impl Into<String>) -> LoadError {
    LoadError::InvalidValue {
        row,
        column: column.to_string(),
        value: value.into(),
    }
}

fn parse_value(raw: &str, row: usize, column: &str) -> Result<Option<f64>, LoadError> {
    let text = raw.trim();
    if MISSING_MARKERS.contains(&text) {
        return Ok(None);
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(_) => Ok(None),
        Err(_) => Err(invalid(row, column, raw)),
    }
}

/// Accepts `2000` as well as integral floats like `2000.0`.
fn parse_year(raw: &str, row: usize, column: &str) -> Result<i64, LoadError> {
    let text = raw.trim();
    if let Ok(year) = text.parse::<i64>() {
        return Ok(year);
    }
    text.parse::<f64>()
        .ok()
        .and_then(integral_year)
        .ok_or_else(|| invalid(row, column, raw))
}

/// `None` for fractional, non-finite or out-of-`i64` floats.
fn integral_year(v: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
    (v.is_finite() && v.fract() == 0.0 && in_range).then_some(v as i64)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<(EmissionsTable, LoadStats), LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let layout = detect_schema(path, &headers)?;
    let year_name = &headers[layout.year];

    let mut normalizer = Normalizer::default();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let row = row_no + 1;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        normalizer.push(
            cell(layout.country).to_string(),
            record.get(layout.code),
            || parse_year(cell(layout.year), row, year_name),
            || parse_value(cell(layout.value), row, &layout.value_name),
        )?;
    }

    Ok(normalizer.finish(layout.value_name))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same header layout as the CSV variant.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`): string columns may be `Utf8`,
/// `LargeUtf8`, `Utf8View` or dictionary-encoded (categoricals), years any
/// integer width or an integral float, values any float or integer type.
/// `Entity` and `Code` must hold strings.
fn load_parquet(path: &Path) -> Result<(EmissionsTable, LoadStats), LoadError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let layout = detect_schema(path, &headers)?;

    let reader = builder.build()?;
    let mut normalizer = Normalizer::default();
    let mut offset = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let first_row = offset + 1;
        let country_col = text_column(
            batch.column(layout.country),
            first_row,
            &headers[layout.country],
        )?;
        let code_col = text_column(batch.column(layout.code), first_row, &headers[layout.code])?;
        let year_col = decoded(batch.column(layout.year))?;
        let value_col = decoded(batch.column(layout.value))?;

        for i in 0..batch.num_rows() {
            let row = offset + i + 1;
            let code = cell_text(&code_col, i);

            normalizer.push(
                cell_text(&country_col, i).unwrap_or_default(),
                code.as_deref(),
                || cell_year(&year_col, i, row, &headers[layout.year]),
                || cell_value(&value_col, i, row, &layout.value_name),
            )?;
        }
        offset += batch.num_rows();
    }

    Ok(normalizer.finish(layout.value_name))
}

// -- Arrow column helpers --

/// Unpack dictionary and view/large string encodings so the cell helpers
/// only ever see plain primitive or `Utf8` arrays.
fn decoded(col: &ArrayRef) -> Result<ArrayRef, LoadError> {
    let target = match col.data_type() {
        DataType::Dictionary(_, value_type) => value_type.as_ref().clone(),
        DataType::Utf8View | DataType::LargeUtf8 => DataType::Utf8,
        _ => return Ok(Arc::clone(col)),
    };
    // A dictionary of views decodes in two steps.
    decoded(&cast(col, &target)?)
}

/// A key column as `Utf8`. Anything that is not text is rejected instead of
/// being read as missing, which would silently drop every row.
fn text_column(col: &ArrayRef, line: usize, column: &str) -> Result<ArrayRef, LoadError> {
    let col = decoded(col)?;
    match col.data_type() {
        DataType::Utf8 => Ok(col),
        other => Err(invalid(line, column, format!("{other:?}"))),
    }
}

/// Cell of a column already passed through [`text_column`].
fn cell_text(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    Some(col.as_string::<i32>().value(row).to_string())
}

fn cell_year(col: &ArrayRef, row: usize, line: usize, column: &str) -> Result<i64, LoadError> {
    if col.is_null(row) {
        return Err(invalid(line, column, "<null>"));
    }
    let year = match col.data_type() {
        DataType::Int8 => col.as_primitive::<Int8Type>().value(row) as i64,
        DataType::Int16 => col.as_primitive::<Int16Type>().value(row) as i64,
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row) as i64,
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row),
        DataType::UInt8 => col.as_primitive::<UInt8Type>().value(row) as i64,
        DataType::UInt16 => col.as_primitive::<UInt16Type>().value(row) as i64,
        DataType::UInt32 => col.as_primitive::<UInt32Type>().value(row) as i64,
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_err(|_| invalid(line, column, v.to_string()))?
        }
        DataType::Float32 => {
            let v = col.as_primitive::<Float32Type>().value(row);
            integral_year(v as f64).ok_or_else(|| invalid(line, column, v.to_string()))?
        }
        DataType::Float64 => {
            let v = col.as_primitive::<Float64Type>().value(row);
            integral_year(v).ok_or_else(|| invalid(line, column, v.to_string()))?
        }
        DataType::Utf8 => return parse_year(col.as_string::<i32>().value(row), line, column),
        other => return Err(invalid(line, column, format!("{other:?}"))),
    };
    Ok(year)
}

fn cell_value(
    col: &ArrayRef,
    row: usize,
    line: usize,
    column: &str,
) -> Result<Option<f64>, LoadError> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row) as f64,
        DataType::Int8 => col.as_primitive::<Int8Type>().value(row) as f64,
        DataType::Int16 => col.as_primitive::<Int16Type>().value(row) as f64,
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row) as f64,
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row) as f64,
        DataType::UInt8 => col.as_primitive::<UInt8Type>().value(row) as f64,
        DataType::UInt16 => col.as_primitive::<UInt16Type>().value(row) as f64,
        DataType::UInt32 => col.as_primitive::<UInt32Type>().value(row) as f64,
        DataType::UInt64 => col.as_primitive::<UInt64Type>().value(row) as f64,
        DataType::Utf8 => return parse_value(col.as_string::<i32>().value(row), line, column),
        other => return Err(invalid(line, column, format!("{other:?}"))),
    };
    Ok(value.is_finite().then_some(value))
}
