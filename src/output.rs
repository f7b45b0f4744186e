//! Rendering of query results as pretty JSON or CSV records.

use serde_json::{Map, Value};
use std::io::Write;
use std::path::Path;

pub fn render_json(value: &Value) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Writes `value` as CSV records to `path`, replacing any existing file.
pub fn export_csv(value: &Value, path: &Path) -> csv::Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(value, file)
}

/// Writes `value` as CSV records.
///
/// - an array of objects gives one row per object; columns are the union of
///   keys in first-seen order
/// - an object of objects gives one row per entry, led by a `key` column
/// - any other object is a single row
/// - scalars and arrays of scalars go in a single `value` column
///
/// Nested values are written as compact JSON; `null` is an empty cell.
pub fn write_csv<W: Write>(value: &Value, writer: W) -> csv::Result<()> {
    let (headers, rows) = to_records(value);
    let mut wtr = csv::Writer::from_writer(writer);
    if !headers.is_empty() {
        wtr.write_record(&headers)?;
        for row in &rows {
            wtr.write_record(row)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

fn to_records(value: &Value) -> (Vec<String>, Vec<Vec<String>>) {
    match value {
        Value::Array(items) if items.is_empty() => (Vec::new(), Vec::new()),
        Value::Array(items) if items.iter().all(Value::is_object) => {
            let maps: Vec<&Map<String, Value>> = items.iter().filter_map(Value::as_object).collect();
            let headers = union_keys(maps.iter().copied());
            let rows = maps.iter().map(|m| row_for(&headers, m)).collect();
            (headers, rows)
        }
        Value::Array(items) => (
            vec!["value".to_string()],
            items.iter().map(|v| vec![cell(v)]).collect(),
        ),
        Value::Object(map) if !map.is_empty() && map.values().all(Value::is_object) => {
            let inner = union_keys(map.values().filter_map(Value::as_object));
            let rows = map
                .iter()
                .filter_map(|(k, v)| v.as_object().map(|m| (k, m)))
                .map(|(k, m)| {
                    let mut row = vec![k.clone()];
                    row.extend(row_for(&inner, m));
                    row
                })
                .collect();
            let mut headers = vec!["key".to_string()];
            headers.extend(inner);
            (headers, rows)
        }
        Value::Object(map) if map.is_empty() => (Vec::new(), Vec::new()),
        Value::Object(map) => {
            let headers: Vec<String> = map.keys().cloned().collect();
            let row = row_for(&headers, map);
            (headers, vec![row])
        }
        scalar => (vec!["value".to_string()], vec![vec![cell(scalar)]]),
    }
}

fn union_keys<'a>(maps: impl Iterator<Item = &'a Map<String, Value>>) -> Vec<String> {
    let mut headers = Vec::<String>::new();
    for map in maps {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

fn row_for(headers: &[String], map: &Map<String, Value>) -> Vec<String> {
    headers
        .iter()
        .map(|h| map.get(h).map(cell).unwrap_or_default())
        .collect()
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
