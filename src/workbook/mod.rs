// src/workbook/mod.rs

use anyhow::{bail, Result};

use crate::sheet::FormattedSheet;

pub mod compose;
pub mod xlsx;

pub use compose::{ComposeSummary, SkippedTable, TableEntry, WorkbookComposer};
pub use xlsx::{sanitize_sheet_name, write_workbook};

/// Named sheets in the order they were added.
#[derive(Debug, Default, Clone)]
pub struct Workbook {
    sheets: Vec<(String, FormattedSheet)>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet. The name is sanitized to Excel rules and must not
    /// collide with an earlier sheet.
    pub fn add_sheet(&mut self, name: &str, sheet: FormattedSheet) -> Result<()> {
        let name = sanitize_sheet_name(name);
        if self.contains(&name) {
            bail!("duplicate sheet name `{}`", name);
        }
        self.sheets.push((name, sheet));
        Ok(())
    }

    /// Sheet names compare case-insensitively in Excel.
    pub fn contains(&self, name: &str) -> bool {
        self.sheets
            .iter()
            .any(|(n, _)| n.to_lowercase() == name.to_lowercase())
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(n, _)| n.as_str())
    }

    pub fn sheets(&self) -> &[(String, FormattedSheet)] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sheet_keeps_order_and_rejects_duplicates() {
        let mut book = Workbook::new();
        book.add_sheet("Sheet First", FormattedSheet::default()).unwrap();
        book.add_sheet("Sheet Later", FormattedSheet::default()).unwrap();
        assert_eq!(
            book.sheet_names().collect::<Vec<_>>(),
            vec!["Sheet First", "Sheet Later"]
        );
        assert!(book.add_sheet("sheet first", FormattedSheet::default()).is_err());
        assert_eq!(book.len(), 2);
    }
}
