//! Tabular normalisation of scraped records.
//!
//! Records serialise to JSON objects; nested objects become dotted column
//! names (`home_team.abbrev`) and the union of columns across rows is kept in
//! first-seen order. Arrays stay whole and are written as JSON text.

use chrono::{DateTime, SecondsFormat, Utc};
use nhl_common::{DataSource, NhlError, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// One flattened record.
pub type Row = Map<String, Value>;

pub const META_DATETIME: &str = "meta_datetime";
pub const META_SOURCE: &str = "meta_source";

/// Records of one scrape, stamped with where and when they were read.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset<T> {
    pub source: DataSource,
    pub scraped_at: DateTime<Utc>,
    pub records: Vec<T>,
}

impl<T> Dataset<T> {
    pub fn new(source: DataSource, records: Vec<T>) -> Self {
        Self {
            source,
            scraped_at: Utc::now(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: Serialize> Dataset<T> {
    /// Flatten the records and append the `meta_datetime`/`meta_source` columns.
    pub fn to_table(&self) -> Result<Table> {
        let mut table = Table::from_records(&self.records)?;
        table.push_constant(
            META_DATETIME,
            Value::String(self.scraped_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        table.push_constant(META_SOURCE, Value::String(self.source.label().to_string()));
        Ok(table)
    }
}

/// Flatten nested objects into dotted keys. Non-object values map to a single
/// empty-named column.
pub fn flatten(value: &Value) -> Row {
    let mut out = Map::new();
    match value {
        Value::Object(obj) => flatten_into("", obj, &mut out),
        other => {
            out.insert(String::new(), other.clone());
        }
    }
    out
}

fn flatten_into(prefix: &str, obj: &Map<String, Value>, out: &mut Row) {
    for (key, value) in obj {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(&name, inner, out),
            Value::Object(_) => {
                out.insert(name, Value::Null);
            }
            other => {
                out.insert(name, other.clone());
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn from_records<T: Serialize>(records: &[T]) -> Result<Self> {
        let values = records
            .iter()
            .map(|r| serde_json::to_value(r).map_err(|e| NhlError::parse("table row", e)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_values(values.iter()))
    }

    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        Self::from_rows(values.into_iter().map(flatten))
    }

    pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let flat: Vec<Row> = rows.into_iter().collect();
        for row in &flat {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        let rows = flat
            .into_iter()
            .map(|mut row| {
                columns
                    .iter()
                    .map(|c| row.remove(c).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Append a column holding the same value on every row.
    pub fn push_constant(&mut self, name: &str, value: Value) {
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(value.clone());
        }
    }

    /// Render as CSV (`','`) or TSV (`'\t'`) with a header line.
    pub fn to_delimited(&self, sep: char) -> String {
        let mut out = String::new();
        write_line(&mut out, self.columns.iter().map(String::as_str), sep);
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            write_line(&mut out, cells.iter().map(String::as_str), sep);
        }
        out
    }

    pub fn to_json_records(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, sep: char) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(sep);
        }
        if needs_quotes(cell, sep) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}
