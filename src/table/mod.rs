pub mod assemble;
pub mod types;

pub use assemble::{page_count, AssembledTable, PageAccumulator, Series, TableAssembler};
pub use types::{CellValue, RowFragment, RowLabel, RowMetadata, TableKind, TableMetadata};
