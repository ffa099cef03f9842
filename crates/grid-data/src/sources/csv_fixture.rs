//! Fixture records loaded from CSV files
//!
//! Each row becomes a JSON object keyed by the header. Dotted headers
//! (`headOfHousehold.fullName`) build nested objects, and cells are typed
//! as bool, integer, float or string in that order. Empty cells are null.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use serde_json::{Map, Number, Value};
use tracing::info;

use crate::DataError;

/// Load every row of the CSV file at `path`
pub async fn load_csv_records(path: impl AsRef<Path>) -> Result<Vec<Value>, DataError> {
    let path = path.as_ref().to_path_buf();
    let records = tokio::task::spawn_blocking({
        let path = path.clone();
        move || {
            let file = File::open(&path)?;
            records_from_reader(BufReader::new(file))
        }
    })
    .await??;

    info!(path = %path.display(), rows = records.len(), "Loaded fixture records");
    Ok(records)
}

/// Parse CSV with a header row into JSON records
pub fn records_from_reader<R: Read>(reader: R) -> Result<Vec<Value>, DataError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<Vec<String>> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.split('.').map(str::to_string).collect())
        .collect();

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let mut object = Map::new();
        for (path, cell) in headers.iter().zip(row.iter()) {
            insert_path(&mut object, path, infer_cell(cell));
        }
        records.push(Value::Object(object));
    }
    Ok(records)
}

fn infer_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if cell.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if cell.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(v) = cell.parse::<i64>() {
        return Value::Number(v.into());
    }
    if let Some(v) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(v);
    }
    Value::String(cell.to_string())
}

fn insert_path(object: &mut Map<String, Value>, path: &[String], value: Value) {
    match path {
        [] => {}
        [leaf] => {
            object.insert(leaf.clone(), value);
        }
        [head, rest @ ..] => {
            let child = object
                .entry(head.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}
