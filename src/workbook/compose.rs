// src/workbook/compose.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument, warn};

use super::{write_workbook, Workbook};
use crate::error::TableError;
use crate::fetch::{MetadataSource, PageSource};
use crate::sheet::{FormattedSheet, SheetFormatter};
use crate::table::{TableAssembler, TableKind};

/// One configured table: the API code and the sheet it lands on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub id: String,
    pub sheet: String,
}

impl TableEntry {
    pub fn new(id: impl Into<String>, sheet: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sheet: sheet.into(),
        }
    }
}

/// A table that produced no sheet, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTable {
    pub table_id: String,
    pub reason: String,
}

/// Outcome of one composition run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComposeSummary {
    pub written: Vec<String>,
    pub skipped: Vec<SkippedTable>,
}

/// Turns an ordered list of tables into one workbook, a sheet per table.
pub struct WorkbookComposer<'a, S> {
    source: &'a S,
    formatter: SheetFormatter,
}

impl<'a, S> WorkbookComposer<'a, S>
where
    S: MetadataSource + PageSource,
{
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            formatter: SheetFormatter::new(),
        }
    }

    /// Fetch, assemble and format a single table.
    ///
    /// Metadata is looked up once; an unreachable table or a cross-sectional
    /// one comes back as a skippable error before any page is requested.
    pub fn sheet_for(&self, table_id: &str) -> Result<FormattedSheet, TableError> {
        let metadata = self.source.fetch_metadata(table_id)?;
        if metadata.kind == TableKind::CrossSectional {
            return Err(TableError::UnsupportedTableType {
                table_id: table_id.to_string(),
            });
        }
        let table = TableAssembler::new(self.source).assemble(&metadata)?;
        self.formatter.format(table, &metadata)
    }

    /// Build every sheet in input order. Unreachable and cross-sectional
    /// tables are reported and skipped; any other failure aborts the run.
    #[instrument(level = "info", skip_all, fields(tables = entries.len()))]
    pub fn build_workbook(&self, entries: &[TableEntry]) -> Result<(Workbook, ComposeSummary)> {
        let mut workbook = Workbook::new();
        let mut summary = ComposeSummary::default();
        let n = entries.len();

        for (i, entry) in entries.iter().enumerate() {
            match self.sheet_for(&entry.id) {
                Ok(sheet) => {
                    workbook.add_sheet(&entry.sheet, sheet)?;
                    summary.written.push(entry.sheet.clone());
                    info!("Completed sheet {} of {}", i + 1, n);
                }
                Err(e) if e.is_skippable() => {
                    warn!(table = %entry.id, sheet = %entry.sheet, error = %e, "skipping table");
                    summary.skipped.push(SkippedTable {
                        table_id: entry.id.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("building sheet `{}` from table {}", entry.sheet, entry.id)
                    });
                }
            }
        }

        info!("All tables done.");
        Ok((workbook, summary))
    }

    /// Build the workbook and write it to `output`. Nothing is written when
    /// any table aborts the run.
    pub fn compose(&self, entries: &[TableEntry], output: impl AsRef<Path>) -> Result<ComposeSummary> {
        let output = output.as_ref();
        let (workbook, summary) = self.build_workbook(entries)?;
        write_workbook(&workbook, output)
            .with_context(|| format!("writing workbook {}", output.display()))?;
        Ok(summary)
    }
}
