use crate::schema::ingredients;
use anyhow::{bail, Context, Result};
use diesel::prelude::*;
use foodgram_core::seed::IngredientRecord;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(Format::Csv),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
            _ => bail!(
                "Cannot tell the format of {}; pass --format csv|json",
                path.display()
            ),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = ingredients)]
struct NewIngredient<'a> {
    name: &'a str,
    measurement_unit: &'a str,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub read: usize,
    pub inserted: usize,
    pub existing: usize,
    pub invalid: usize,
}

/// Rows are `name,measurement_unit` with no header.
pub fn parse_csv(reader: impl Read) -> Result<Vec<IngredientRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<IngredientRecord>().enumerate() {
        let record = row.with_context(|| format!("Malformed CSV row {}", index + 1))?;
        records.push(record);
    }
    Ok(records)
}

pub fn parse_json(reader: impl Read) -> Result<Vec<IngredientRecord>> {
    serde_json::from_reader(reader).context("Expected a JSON array of {name, measurement_unit}")
}

/// Normalizes every record, dropping the invalid ones and repeats within
/// the file. Returns the kept records and the number dropped as invalid.
pub fn prepare(records: Vec<IngredientRecord>) -> (Vec<IngredientRecord>, usize) {
    let mut seen = std::collections::HashSet::new();
    let mut kept = Vec::with_capacity(records.len());
    let mut invalid = 0;

    for record in records {
        match record.normalized() {
            Ok(record) => {
                if seen.insert((record.name.clone(), record.measurement_unit.clone())) {
                    kept.push(record);
                }
            }
            Err(errors) => {
                tracing::warn!(?errors, "skipping invalid ingredient");
                invalid += 1;
            }
        }
    }
    (kept, invalid)
}

pub fn load(conn: &mut PgConnection, path: &Path, format: Option<Format>) -> Result<LoadSummary> {
    let format = match format {
        Some(format) => format,
        None => Format::from_path(path)?,
    };
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let records = match format {
        Format::Csv => parse_csv(reader)?,
        Format::Json => parse_json(reader)?,
    };
    let read = records.len();
    let (records, invalid) = prepare(records);

    let mut inserted = 0;
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        for (number, batch) in records.chunks(BATCH_SIZE).enumerate() {
            let rows: Vec<NewIngredient> = batch
                .iter()
                .map(|r| NewIngredient {
                    name: &r.name,
                    measurement_unit: &r.measurement_unit,
                })
                .collect();
            let count = diesel::insert_into(ingredients::table)
                .values(&rows)
                .on_conflict_do_nothing()
                .execute(conn)
                .with_context(|| format!("Failed to insert batch {}", number + 1))?;
            tracing::debug!(batch = number + 1, inserted = count, "ingredient batch written");
            inserted += count;
        }
        Ok(())
    })?;

    Ok(LoadSummary {
        read,
        inserted,
        existing: read - invalid - inserted,
        invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_without_header() {
        let data = "абрикосы,г\nмолоко, мл\n\"соль, морская\",г\n";
        let records = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].measurement_unit, "мл");
        assert_eq!(records[2].name, "соль, морская");
    }

    #[test]
    fn test_parse_csv_rejects_short_row() {
        let err = parse_csv("flour\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_parse_json() {
        let data = r#"[{"name": "flour", "measurement_unit": "g"}]"#;
        let records = parse_json(data.as_bytes()).unwrap();
        assert_eq!(
            records,
            vec![IngredientRecord {
                name: "flour".to_string(),
                measurement_unit: "g".to_string()
            }]
        );
    }

    #[test]
    fn test_prepare_drops_invalid_and_repeats() {
        let record = |name: &str, unit: &str| IngredientRecord {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        };
        let (kept, invalid) = prepare(vec![
            record("flour", "g"),
            record(" flour ", "g"),
            record("flour", "kg"),
            record("", "g"),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(invalid, 1);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("data/ingredients.CSV")).unwrap(), Format::Csv);
        assert_eq!(Format::from_path(Path::new("ingredients.json")).unwrap(), Format::Json);
        assert!(Format::from_path(Path::new("ingredients.txt")).is_err());
    }
}
