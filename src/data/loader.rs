use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use crate::config::LoaderConfig;

use super::model::{RawTable, RawValue};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a catalog file into a raw table.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – delimited text, header row first (`;` by default)
/// * `.json`        – `[{ "objname": "NGC 224", "bt": 4.36, ... }, ...]`
/// * `.parquet`     – flat columns of strings, integers, floats or booleans
pub fn load_file(path: &Path, config: &LoaderConfig) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "txt" => load_delimited(path, config),
        "json" => load_json(path, config),
        "parquet" | "pq" => load_parquet(path, config),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "loaded {}: {} rows, {} columns",
        path.display(),
        table.rows.len(),
        table.headers.len()
    );
    Ok(table)
}

fn cell(text: &str, config: &LoaderConfig) -> RawValue {
    let text = text.trim();
    if config.missing_tokens.iter().any(|t| t == text) {
        RawValue::Null
    } else {
        RawValue::String(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Decode file bytes: UTF-8 when valid, Latin-1 otherwise.
fn decode(bytes: Vec<u8>, path: &Path) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("{} is not valid UTF-8, reading it as Latin-1", path.display());
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}

fn ascii_byte(c: char, what: &str) -> Result<u8> {
    if !c.is_ascii() {
        bail!("{what} must be an ASCII character, got '{c}'");
    }
    Ok(c as u8)
}

/// Delimited layout: first non-comment line is the header, no quoting,
/// cells trimmed. Ragged rows are kept as they are; the dataset pads or
/// truncates them.
pub fn parse_delimited(text: &str, config: &LoaderConfig) -> Result<RawTable> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(ascii_byte(config.delimiter, "delimiter")?)
        .comment(config.comment.map(|c| ascii_byte(c, "comment")).transpose()?)
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        bail!("no header row");
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {}", row_no + 1))?;
        if record.iter().all(|c| c.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(|c| cell(c, config)).collect());
    }

    Ok(RawTable { headers, rows })
}

fn load_delimited(path: &Path, config: &LoaderConfig) -> Result<RawTable> {
    let bytes = std::fs::read(path).context("reading file")?;
    parse_delimited(&decode(bytes, path), config)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`). Headers are the
/// keys in first-seen order; a record without a key gets a missing cell.
pub fn parse_json(text: &str, config: &LoaderConfig) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map_or(RawValue::Null, |v| json_to_raw(v, config)))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn load_json(path: &Path, config: &LoaderConfig) -> Result<RawTable> {
    let bytes = std::fs::read(path).context("reading JSON file")?;
    parse_json(&decode(bytes, path), config)
}

fn json_to_raw(val: &JsonValue, config: &LoaderConfig) -> RawValue {
    match val {
        JsonValue::String(s) => cell(s, config),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                RawValue::Float(f)
            } else {
                RawValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => RawValue::Bool(*b),
        JsonValue::Null => RawValue::Null,
        other => RawValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, config: &LoaderConfig) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = batch.columns();
        for row in 0..batch.num_rows() {
            let values = columns
                .iter()
                .map(|col| arrow_value(col, row, config))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            rows.push(values);
        }
    }

    Ok(RawTable { headers, rows })
}

// -- Arrow helpers --

/// A single cell of an Arrow column. Types without a direct mapping are
/// rendered to text; text goes through the missing-token check.
fn arrow_value(col: &ArrayRef, row: usize, config: &LoaderConfig) -> Result<RawValue> {
    if col.is_null(row) {
        return Ok(RawValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| cell(a.value(row), config)),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|a| cell(a.value(row), config)),
        DataType::Int8 => col
            .as_primitive_opt::<Int8Type>()
            .map(|a| RawValue::Integer(a.value(row).into())),
        DataType::Int16 => col
            .as_primitive_opt::<Int16Type>()
            .map(|a| RawValue::Integer(a.value(row).into())),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| RawValue::Integer(a.value(row).into())),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| RawValue::Integer(a.value(row))),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| RawValue::Float(a.value(row).into())),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| RawValue::Float(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| RawValue::Bool(a.value(row))),
        _ => None,
    };
    match value {
        Some(v) => Ok(v),
        None => {
            let formatter = ArrayFormatter::try_new(col.as_ref(), &FormatOptions::default())
                .with_context(|| format!("formatting {:?} value", col.data_type()))?;
            Ok(cell(&formatter.value(row).to_string(), config))
        }
    }
}
