//! Writes `sample_emissions.csv` and `sample_emissions.parquet`, a synthetic
//! dataset in the Our World in Data layout, plus `sample_boundaries.csv`.

use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Builder, Int64Array, StringArray, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const VALUE_COLUMN: &str = "Annual CO₂ emissions";

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// (name, code, first year with data, emissions in 2024 in Mt, growth start)
const COUNTRIES: [(&str, &str, i64, f64, i64); 8] = [
    ("United Kingdom", "GBR", 1751, 300.0, 1800),
    ("United States", "USA", 1800, 4900.0, 1870),
    ("Germany", "DEU", 1792, 570.0, 1850),
    ("Russia", "RUS", 1830, 1800.0, 1900),
    ("China", "CHN", 1899, 12000.0, 1950),
    ("India", "IND", 1858, 3100.0, 1960),
    ("Brazil", "BRA", 1901, 480.0, 1960),
    ("Chile", "CHL", 1910, 80.0, 1960),
];

const FIRST_YEAR: i64 = 1751;
const LAST_YEAR: i64 = 2024;

struct Row {
    entity: String,
    code: Option<String>,
    year: i64,
    value: Option<f64>,
}

/// Logistic ramp towards the 2024 level with a little noise.
fn emissions(rng: &mut SimpleRng, level_mt: f64, growth_start: i64, year: i64) -> f64 {
    let t = (year - growth_start) as f64 / 25.0;
    let ramp = 1.0 / (1.0 + (-t + 3.0).exp());
    let noise = 1.0 + 0.04 * (rng.next_f64() - 0.5);
    level_mt * 1e6 * ramp * noise
}

fn build_rows(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for year in FIRST_YEAR..=LAST_YEAR {
        let mut world = 0.0;
        for &(name, code, first, level, growth_start) in &COUNTRIES {
            if year < first {
                continue;
            }
            // Sprinkle gaps so the loader's missing-value handling is visible.
            let value = (rng.next_f64() > 0.01).then(|| emissions(rng, level, growth_start, year));
            world += value.unwrap_or(0.0);
            rows.push(Row {
                entity: name.to_string(),
                // Lower-case codes on some rows exercise normalization.
                code: Some(if year % 7 == 0 { code.to_lowercase() } else { code.to_string() }),
                year,
                value,
            });
        }
        // Aggregates that must be filtered out on load.
        rows.push(Row {
            entity: "World".to_string(),
            code: Some("OWID_WRL".to_string()),
            year,
            value: Some(world),
        });
        rows.push(Row {
            entity: "Europe".to_string(),
            code: None,
            year,
            value: Some(world * 0.2),
        });
    }
    rows
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["Entity", "Code", "Year", VALUE_COLUMN])?;
    for r in rows {
        writer.write_record([
            r.entity.clone(),
            r.code.clone().unwrap_or_default(),
            r.year.to_string(),
            r.value.map(|v| format!("{v:.1}")).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let mut code_builder = StringBuilder::new();
    let mut value_builder = Float64Builder::new();
    for r in rows {
        code_builder.append_option(r.code.as_deref());
        value_builder.append_option(r.value);
    }

    let entity_array = StringArray::from(rows.iter().map(|r| r.entity.as_str()).collect::<Vec<_>>());
    let year_array = Int64Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("Entity", DataType::Utf8, false),
        Field::new("Code", DataType::Utf8, true),
        Field::new("Year", DataType::Int64, false),
        Field::new(VALUE_COLUMN, DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(entity_array),
            Arc::new(code_builder.finish()),
            Arc::new(year_array),
            Arc::new(value_builder.finish()),
        ],
    )
    .context("building record batch")?;

    let file = File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_boundaries(path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["NAME", "ISO_A3"])?;
    for &(name, code, ..) in &COUNTRIES {
        writer.write_record([name, code])?;
    }
    // Present on the map but absent from the emissions table.
    writer.write_record(["Greenland", "GRL"])?;
    writer.write_record(["Antarctica", "ATA"])?;
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = build_rows(&mut rng);

    write_csv(&rows, "sample_emissions.csv")?;
    write_parquet(&rows, "sample_emissions.parquet")?;
    write_boundaries("sample_boundaries.csv")?;

    println!(
        "Wrote {} rows ({FIRST_YEAR}..={LAST_YEAR}, {} countries) to sample_emissions.csv/.parquet and sample_boundaries.csv",
        rows.len(),
        COUNTRIES.len()
    );
    Ok(())
}
