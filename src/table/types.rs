// src/table/types.rs

use serde::Serialize;

/// Unique text key of one data series within a table (`rowText`).
pub type RowLabel = String;

/// Whether a table is laid out as a time series or a cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TableKind {
    TimeSeries,
    CrossSectional,
}

/// One row definition from the metadata endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowMetadata {
    pub row_text: RowLabel,
    pub uom: String,
    pub footnote: String,
}

/// Everything the sheet layout needs to know about a table, fetched once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableMetadata {
    pub id: String,
    pub title: String,
    pub data_source: String,
    /// Kept verbatim; the sheet prints it as the API sends it.
    pub data_last_updated: String,
    pub footnote: String,
    pub rows: Vec<RowMetadata>,
    pub total_records: usize,
    pub generated_by: String,
    pub date_generated: String,
    pub kind: TableKind,
}

impl TableMetadata {
    /// Unit of measurement shown in the header block, taken from the first row.
    pub fn headline_unit(&self) -> &str {
        self.rows.first().map(|r| r.uom.as_str()).unwrap_or("")
    }
}

/// A single cell of an assembled table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Number(f64),
    Text(String),
    NotAvailable,
}

impl CellValue {
    /// Interpret a raw JSON `value` the way the API uses it: numbers may arrive
    /// either as JSON numbers or as numeric strings.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::NotAvailable,
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => CellValue::Number(f),
                None => CellValue::Text(n.to_string()),
            },
            serde_json::Value::String(s) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => CellValue::Number(f),
                _ => CellValue::Text(s.clone()),
            },
            other => CellValue::Text(other.to_string()),
        }
    }
}

/// The part of one series visible in a single page: `(period, value)` pairs
/// in the order the API listed them.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFragment {
    pub label: RowLabel,
    pub cells: Vec<(String, CellValue)>,
}
