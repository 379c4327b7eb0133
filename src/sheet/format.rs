// src/sheet/format.rs

use serde::Serialize;
use std::fmt::Write as _;

use super::legend::{FOOTNOTES_LABEL, GRID_INDEX_LABEL, NOTATION, NOTES, NOT_AVAILABLE};
use crate::error::TableError;
use crate::table::{AssembledTable, CellValue, TableKind, TableMetadata};

/// One cell of an exported sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SheetCell {
    Blank,
    Text(String),
    Number(f64),
}

impl SheetCell {
    pub fn text(s: impl Into<String>) -> Self {
        SheetCell::Text(s.into())
    }

    fn from_value(value: &CellValue) -> Self {
        match value {
            CellValue::Number(n) => SheetCell::Number(*n),
            CellValue::Text(s) => SheetCell::Text(s.clone()),
            CellValue::NotAvailable => SheetCell::text(NOT_AVAILABLE),
        }
    }

    /// Plain-text rendering used by the tab-separated dump.
    pub fn render(&self) -> String {
        match self {
            SheetCell::Blank => String::new(),
            SheetCell::Text(s) => s.clone(),
            SheetCell::Number(n) => n.to_string(),
        }
    }
}

/// A row of cells; a blank separator line is an empty row.
pub type SheetRow = Vec<SheetCell>;

/// Header, data grid, footnotes and footer of one exportable sheet, in order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FormattedSheet {
    pub header: Vec<SheetRow>,
    pub grid: Vec<SheetRow>,
    pub footnotes: Vec<SheetRow>,
    pub footer: Vec<SheetRow>,
}

impl FormattedSheet {
    /// All rows as they appear on the sheet, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &SheetRow> {
        self.header
            .iter()
            .chain(&self.grid)
            .chain(&self.footnotes)
            .chain(&self.footer)
    }

    pub fn row_count(&self) -> usize {
        self.header.len() + self.grid.len() + self.footnotes.len() + self.footer.len()
    }

    /// Tab-separated text, one line per row.
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        for row in self.rows() {
            let line: Vec<String> = row.iter().map(SheetCell::render).collect();
            let _ = writeln!(out, "{}", line.join("\t"));
        }
        out
    }
}

fn line(text: impl Into<String>) -> SheetRow {
    vec![SheetCell::text(text)]
}

fn blank() -> SheetRow {
    Vec::new()
}

/// Wraps an assembled table with the metadata-derived blocks of the
/// reference export layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct SheetFormatter;

impl SheetFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Build the sheet for `table`. Cross-sectional tables have no layout and
    /// are rejected with [`TableError::UnsupportedTableType`].
    pub fn format(
        &self,
        table: AssembledTable,
        metadata: &TableMetadata,
    ) -> Result<FormattedSheet, TableError> {
        if metadata.kind == TableKind::CrossSectional {
            return Err(TableError::UnsupportedTableType {
                table_id: metadata.id.clone(),
            });
        }
        Ok(FormattedSheet {
            header: self.header_block(metadata),
            grid: self.data_grid(table),
            footnotes: self.footnote_block(metadata),
            footer: self.footer_block(metadata),
        })
    }

    pub fn header_block(&self, meta: &TableMetadata) -> Vec<SheetRow> {
        let lines = [
            format!("Table Title: {}", meta.title),
            format!("Table ID: {}", meta.id),
            format!("Data last updated: {}", meta.data_last_updated),
            format!("Source: {}", meta.data_source),
            format!("Units of Measurement: {}", meta.headline_unit()),
        ];
        lines
            .into_iter()
            .flat_map(|l| [line(l), blank()])
            .collect()
    }

    /// Periods down the leading index column, one column per series.
    pub fn data_grid(&self, table: AssembledTable) -> Vec<SheetRow> {
        let mut grid = Vec::with_capacity(table.periods.len() + 1);

        let mut head = vec![SheetCell::text(GRID_INDEX_LABEL)];
        head.extend(table.series.iter().map(|s| SheetCell::text(s.label.as_str())));
        grid.push(head);

        for (i, period) in table.periods.into_iter().enumerate() {
            let mut row = Vec::with_capacity(table.series.len() + 1);
            row.push(SheetCell::Text(period));
            row.extend(table.series.iter().map(|s| {
                s.values
                    .get(i)
                    .map(SheetCell::from_value)
                    .unwrap_or_else(|| SheetCell::text(NOT_AVAILABLE))
            }));
            grid.push(row);
        }
        grid
    }

    pub fn footnote_block(&self, meta: &TableMetadata) -> Vec<SheetRow> {
        let mut rows = vec![
            blank(),
            blank(),
            line(FOOTNOTES_LABEL),
            line(meta.footnote.as_str()),
        ];
        rows.extend(
            meta.rows
                .iter()
                .filter(|r| !r.footnote.is_empty())
                .map(|r| line(format!("{} ({}): {}", r.row_text, r.uom, r.footnote))),
        );
        rows
    }

    pub fn footer_block(&self, meta: &TableMetadata) -> Vec<SheetRow> {
        let mut rows = vec![blank()];
        rows.extend(NOTATION.iter().map(|l| line(*l)));
        rows.push(blank());
        rows.extend(NOTES.iter().map(|l| line(*l)));
        rows.push(line(" "));
        rows.push(line(format!("Generated by: {}", meta.generated_by)));
        rows.push(line(format!("Date generated: {}", meta.date_generated)));
        rows
    }
}
