pub mod format;
pub mod legend;

pub use format::{FormattedSheet, SheetCell, SheetFormatter, SheetRow};
