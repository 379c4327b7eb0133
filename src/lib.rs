//! Fetch paginated time-series tables from the SingStat TableBuilder API,
//! rebuild them page by page, and export them as sheets of one workbook laid
//! out like the site's own CSV download.

pub mod config;
pub mod error;
pub mod fetch;
pub mod sheet;
pub mod table;
pub mod workbook;

pub use config::Config;
pub use error::TableError;
pub use fetch::{ApiClient, MetadataClient, MetadataSource, PageClient, PageSource, PAGE_SIZE};
pub use sheet::{FormattedSheet, SheetFormatter};
pub use table::{AssembledTable, TableAssembler, TableMetadata};
pub use workbook::{ComposeSummary, TableEntry, Workbook, WorkbookComposer};
