// src/workbook/xlsx.rs

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook as XlsxWorkbook, XlsxError};
use std::path::Path;
use tracing::{debug, info};

use super::Workbook;
use crate::sheet::{FormattedSheet, SheetCell};

/// Excel sheet name maximum length.
pub const MAX_SHEET_NAME_LEN: usize = 31;
/// Characters not allowed in sheet names.
pub const ILLEGAL_SHEET_CHARS: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

/// Excel refuses this sheet name in any casing.
const RESERVED_SHEET_NAME: &str = "History";

/// Replace illegal characters and trim to a valid Excel sheet name. The
/// result never starts or ends with an apostrophe and is never the reserved
/// `History`.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if ILLEGAL_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_matches(|c: char| c == '\'' || c.is_whitespace());
    if cleaned.is_empty() {
        return "Sheet".to_string();
    }
    if cleaned.eq_ignore_ascii_case(RESERVED_SHEET_NAME) {
        return format!("{}_", cleaned);
    }
    cleaned.to_string()
}

/// Write every cell of `sheet` starting at A1. No header row, no index.
fn write_sheet(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    sheet: &FormattedSheet,
) -> Result<(), XlsxError> {
    for (r, row) in sheet.rows().enumerate() {
        let r = r as u32;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                SheetCell::Blank => {}
                SheetCell::Text(s) if s.is_empty() => {}
                SheetCell::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                SheetCell::Number(n) => {
                    worksheet.write_number(r, c, *n)?;
                }
            }
        }
    }
    Ok(())
}

fn build(workbook: &Workbook) -> Result<XlsxWorkbook> {
    let mut book = XlsxWorkbook::new();
    for (name, sheet) in workbook.sheets() {
        let worksheet = book.add_worksheet();
        worksheet
            .set_name(name)
            .with_context(|| format!("naming sheet `{}`", name))?;
        write_sheet(worksheet, sheet).with_context(|| format!("writing sheet `{}`", name))?;
        debug!(sheet = %name, rows = sheet.row_count(), "sheet written");
    }
    Ok(book)
}

/// Serialize `workbook` to an `.xlsx` file at `path`.
pub fn write_workbook(workbook: &Workbook, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if workbook.is_empty() {
        anyhow::bail!("no sheets were produced; refusing to write {:?}", path);
    }
    let mut book = build(workbook)?;
    book.save(path)
        .with_context(|| format!("saving workbook {:?}", path))?;
    info!(path = %path.display(), sheets = workbook.len(), "workbook saved");
    Ok(())
}

/// Serialize `workbook` into an in-memory `.xlsx` buffer.
pub fn workbook_to_buffer(workbook: &Workbook) -> Result<Vec<u8>> {
    let mut book = build(workbook)?;
    Ok(book.save_to_buffer()?)
}
