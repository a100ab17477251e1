use std::collections::HashSet;
use std::fmt;

use crate::config::SchemaConfig;

use super::clean::{clean_numeric, identifier_integer};

// ---------------------------------------------------------------------------
// RawValue – a single cell as it came out of the file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as produced by a loader, before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::String(s) => write!(f, "{s}"),
            RawValue::Integer(i) => write!(f, "{i}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Null => write!(f, "<null>"),
        }
    }
}

impl RawValue {
    /// Numeric view of the cell after cleaning; `None` means missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Float(v) => Some(*v).filter(|v| v.is_finite()),
            RawValue::Integer(i) => Some(*i as f64),
            RawValue::String(s) => clean_numeric(s),
            RawValue::Bool(_) | RawValue::Null => None,
        }
    }

    /// Text view of the cell, trimmed; empty text is missing.
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            RawValue::String(s) => s.trim().to_string(),
            RawValue::Null => return None,
            other => other.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Header plus rows of raw cells, the hand-off point between a loader and
/// [`Dataset::load`]. Rows may be ragged.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

// ---------------------------------------------------------------------------
// RecordId – ordinal identity of a source row
// ---------------------------------------------------------------------------

/// Position of a record in the original load order. This is the only key used
/// to correlate values between series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub usize);

impl RecordId {
    pub fn index(self) -> usize {
        self.0
    }

    /// 1-based row number, as shown to users.
    pub fn row_number(self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Identity / free-text columns (name, catalog number, morphological type).
    Categorical(Vec<Option<String>>),
    /// Cleaned numbers; `None` is missing.
    Numeric(Vec<Option<f64>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Categorical(v) => v.len(),
            ColumnData::Numeric(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    /// Cleaned numeric value; always `None` for categorical columns.
    pub fn numeric(&self, row: usize) -> Option<f64> {
        match &self.data {
            ColumnData::Numeric(v) => v.get(row).copied().flatten(),
            ColumnData::Categorical(_) => None,
        }
    }

    pub fn text(&self, row: usize) -> Option<&str> {
        match &self.data {
            ColumnData::Categorical(v) => v.get(row).and_then(|s| s.as_deref()),
            ColumnData::Numeric(_) => None,
        }
    }

    /// Numeric view of any column: categorical text is cleaned on the fly.
    pub fn coerce_numeric(&self, row: usize) -> Option<f64> {
        match &self.data {
            ColumnData::Numeric(v) => v.get(row).copied().flatten(),
            ColumnData::Categorical(v) => v.get(row).and_then(|s| s.as_deref()).and_then(clean_numeric),
        }
    }

    /// Number of non-missing entries.
    pub fn present_count(&self) -> usize {
        match &self.data {
            ColumnData::Categorical(v) => v.iter().filter(|s| s.is_some()).count(),
            ColumnData::Numeric(v) => v.iter().filter(|x| x.is_some()).count(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded catalog
// ---------------------------------------------------------------------------

/// Columnar catalog built once per load and read-only afterwards.
///
/// Every column holds exactly [`Dataset::len`] entries.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<Column>,
    len: usize,
    /// Numeric columns with enough values to plot, in header order.
    analyzable: Vec<String>,
    name_column: Option<usize>,
    secondary_column: Option<usize>,
}

impl Dataset {
    /// Clean a raw table into a dataset.
    ///
    /// Columns listed as categorical in `schema` keep their trimmed text, all
    /// others go through numeric cleaning. Short rows are padded with missing
    /// cells and long rows are truncated to the header width.
    pub fn load(table: RawTable, schema: &SchemaConfig) -> Self {
        let RawTable { headers, rows } = table;
        let headers = dedupe_headers(headers);
        let len = rows.len();

        let categorical: HashSet<String> = schema
            .categorical_columns
            .iter()
            .map(|c| c.to_lowercase())
            .collect();

        let columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let cells = rows.iter().map(|row| row.get(idx).unwrap_or(&RawValue::Null));
                let data = if categorical.contains(&name.to_lowercase()) {
                    ColumnData::Categorical(cells.map(RawValue::as_text).collect())
                } else {
                    ColumnData::Numeric(cells.map(RawValue::as_f64).collect())
                };
                Column {
                    name: name.clone(),
                    data,
                }
            })
            .collect();

        let analyzable = columns
            .iter()
            .filter(|c| c.is_numeric() && c.present_count() >= schema.min_analyzable_values)
            .map(|c| c.name.clone())
            .collect();

        let find = |wanted: &str| {
            columns
                .iter()
                .position(|c| c.name.eq_ignore_ascii_case(wanted))
        };
        let name_column = find(&schema.name_column);
        let secondary_column = find(&schema.secondary_id_column);

        Dataset {
            columns,
            len,
            analyzable,
            name_column,
            secondary_column,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of the numeric columns that qualify for plotting.
    pub fn analyzable_columns(&self) -> &[String] {
        &self.analyzable
    }

    pub fn is_analyzable(&self, name: &str) -> bool {
        self.analyzable.iter().any(|c| c == name)
    }

    /// All record identities in load order.
    pub fn ids(&self) -> impl Iterator<Item = RecordId> {
        (0..self.len).map(RecordId)
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.ids().map(move |id| Record { dataset: self, id })
    }

    pub fn record(&self, id: RecordId) -> Option<Record<'_>> {
        (id.0 < self.len).then_some(Record { dataset: self, id })
    }

    pub fn name_column(&self) -> Option<&Column> {
        self.name_column.map(|i| &self.columns[i])
    }

    pub fn secondary_column(&self) -> Option<&Column> {
        self.secondary_column.map(|i| &self.columns[i])
    }

    /// Primary name field of a record, trimmed, as loaded.
    pub fn primary_name(&self, id: RecordId) -> Option<&str> {
        self.name_column()?.text(id.0)
    }

    /// Secondary numeric identifier of a record, coerced to a number.
    pub fn secondary_value(&self, id: RecordId) -> Option<f64> {
        self.secondary_column()?.coerce_numeric(id.0)
    }

    /// Secondary identifier as the integer catalog number.
    pub fn secondary_integer(&self, id: RecordId) -> Option<i64> {
        self.secondary_value(id).and_then(identifier_integer)
    }
}

/// Pandas-style de-duplication: the second `a` becomes `a.1`, and so on.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    headers
        .into_iter()
        .map(|h| {
            let h = h.trim().to_string();
            if seen.insert(h.clone()) {
                return h;
            }
            let mut n = 1;
            loop {
                let candidate = format!("{h}.{n}");
                if seen.insert(candidate.clone()) {
                    return candidate;
                }
                n += 1;
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Record – a borrowed view of one row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    dataset: &'a Dataset,
    id: RecordId,
}

impl<'a> Record<'a> {
    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Cleaned value of a numeric column; `None` if missing, categorical or unknown.
    pub fn value(&self, column: &str) -> Option<f64> {
        self.dataset.column(column)?.numeric(self.id.0)
    }

    pub fn text(&self, column: &str) -> Option<&'a str> {
        self.dataset.column(column)?.text(self.id.0)
    }

    pub fn primary_name(&self) -> Option<&'a str> {
        self.dataset.primary_name(self.id)
    }

    pub fn secondary_integer(&self) -> Option<i64> {
        self.dataset.secondary_integer(self.id)
    }
}
