// src/table/assemble.rs

use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

use super::types::{CellValue, RowFragment, RowLabel, TableMetadata};
use crate::error::TableError;
use crate::fetch::{MetadataSource, PageSource, PAGE_SIZE};

/// Number of page requests issued for a table of `total_records`.
///
/// Integer division plus one: an exact multiple of the page size still
/// requests one extra (normally empty) page.
pub fn page_count(total_records: usize) -> usize {
    total_records / PAGE_SIZE + 1
}

/// Offsets requested for a table of `total_records`, in order.
pub fn page_offsets(total_records: usize) -> impl Iterator<Item = usize> {
    (0..page_count(total_records)).map(|i| i * PAGE_SIZE)
}

/// Running state of the page fold. Labels keep first-seen order and each
/// label's cells keep arrival order across pages.
#[derive(Debug, Default)]
pub struct PageAccumulator {
    order: Vec<RowLabel>,
    rows: HashMap<RowLabel, RowCells>,
}

/// Cells of one label in arrival order, plus the periods already taken.
#[derive(Debug, Default)]
struct RowCells {
    cells: Vec<(String, CellValue)>,
    periods: HashSet<String>,
}

impl PageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one page of fragments into the accumulator.
    ///
    /// Unknown labels are appended as new rows; known labels have the page's
    /// periods appended. A period already present for a label keeps its first
    /// value.
    pub fn merge_page(mut self, fragments: Vec<RowFragment>) -> Self {
        for fragment in fragments {
            if fragment.cells.is_empty() {
                continue;
            }
            if !self.rows.contains_key(&fragment.label) {
                self.order.push(fragment.label.clone());
            }
            let row = self.rows.entry(fragment.label.clone()).or_default();
            for (period, value) in fragment.cells {
                if !row.periods.insert(period.clone()) {
                    warn!(label = %fragment.label, %period, "duplicate period; keeping first value");
                    continue;
                }
                row.cells.push((period, value));
            }
        }
        self
    }

    /// Number of periods collected so far for `label`.
    pub fn column_count(&self, label: &str) -> usize {
        self.rows.get(label).map_or(0, |r| r.cells.len())
    }

    pub fn labels(&self) -> &[RowLabel] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Lay every row side by side: an outer join on period, periods in the
    /// order they were first seen. Gaps become [`CellValue::NotAvailable`].
    pub fn finish(mut self) -> AssembledTable {
        let mut periods: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for label in &self.order {
            for (period, _) in &self.rows[label].cells {
                if seen.insert(period.clone()) {
                    periods.push(period.clone());
                }
            }
        }
        let series = {
            let index: HashMap<&str, usize> = periods
                .iter()
                .enumerate()
                .map(|(i, p)| (p.as_str(), i))
                .collect();

            let mut series = Vec::with_capacity(self.order.len());
            for label in &self.order {
                let mut values = vec![CellValue::NotAvailable; periods.len()];
                let cells = self.rows.remove(label).map(|r| r.cells).unwrap_or_default();
                for (period, value) in cells {
                    if let Some(&i) = index.get(period.as_str()) {
                        values[i] = value;
                    }
                }
                series.push(Series {
                    label: label.clone(),
                    values,
                });
            }
            series
        };

        AssembledTable { periods, series }
    }
}

/// One data series of an assembled table, aligned with the table's periods.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: RowLabel,
    pub values: Vec<CellValue>,
}

impl Series {
    /// Count of periods that carry an actual value.
    pub fn observed(&self) -> usize {
        self.values
            .iter()
            .filter(|v| !matches!(v, CellValue::NotAvailable))
            .count()
    }
}

/// Series-by-period matrix rebuilt from every page of a table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssembledTable {
    pub periods: Vec<String>,
    pub series: Vec<Series>,
}

impl AssembledTable {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn series(&self, label: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.label == label)
    }

    /// Value of `label` at `period`, if both exist.
    pub fn get(&self, label: &str, period: &str) -> Option<&CellValue> {
        let i = self.periods.iter().position(|p| p == period)?;
        self.series(label).and_then(|s| s.values.get(i))
    }
}

/// Drives paging for one table and folds the pages into an [`AssembledTable`].
pub struct TableAssembler<'a, P: PageSource> {
    pages: &'a P,
}

impl<'a, P: PageSource> TableAssembler<'a, P> {
    pub fn new(pages: &'a P) -> Self {
        Self { pages }
    }

    /// Assemble a table whose metadata the caller has already fetched.
    #[instrument(level = "info", skip(self, metadata), fields(table = %metadata.id, total = metadata.total_records))]
    pub fn assemble(&self, metadata: &TableMetadata) -> Result<AssembledTable, TableError> {
        let acc = page_offsets(metadata.total_records).try_fold(
            PageAccumulator::new(),
            |acc, offset| {
                let fragments = self.pages.fetch_page(&metadata.id, offset)?;
                debug!(offset, fragments = fragments.len(), "fetched page");
                Ok::<_, TableError>(acc.merge_page(fragments))
            },
        )?;

        if acc.is_empty() {
            warn!("no row carried any columns; table is empty");
        }
        let table = acc.finish();
        info!(
            series = table.series.len(),
            periods = table.periods.len(),
            "assembled"
        );
        Ok(table)
    }

    /// Fetch metadata and assemble in one go. Metadata failures propagate.
    pub fn fetch_and_assemble<M: MetadataSource>(
        &self,
        metadata: &M,
        table_id: &str,
    ) -> Result<AssembledTable, TableError> {
        let meta = metadata.fetch_metadata(table_id)?;
        self.assemble(&meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(label: &str, cells: &[(&str, f64)]) -> RowFragment {
        RowFragment {
            label: label.to_string(),
            cells: cells
                .iter()
                .map(|(p, v)| (p.to_string(), CellValue::Number(*v)))
                .collect(),
        }
    }

    #[test]
    fn test_page_count_over_fetches_on_exact_multiple() {
        assert_eq!(page_count(0), 1);
        assert_eq!(page_count(2), 1);
        assert_eq!(page_count(1999), 1);
        assert_eq!(page_count(2000), 2);
        assert_eq!(page_count(4000), 3);
        for k in 1..10 {
            assert_eq!(page_count(k * PAGE_SIZE), k + 1);
        }
        let offsets: Vec<_> = page_offsets(4000).collect();
        assert_eq!(offsets, vec![0, 2000, 4000]);
    }

    #[test]
    fn test_merge_disjoint_periods_is_union() {
        let acc = PageAccumulator::new()
            .merge_page(vec![frag("GDP", &[("2019", 1.0), ("2020", 2.0)])])
            .merge_page(vec![frag("GDP", &[("2021", 3.0)])]);
        assert_eq!(acc.column_count("GDP"), 3);

        let table = acc.finish();
        assert_eq!(table.periods, vec!["2019", "2020", "2021"]);
        assert_eq!(table.get("GDP", "2019"), Some(&CellValue::Number(1.0)));
        assert_eq!(table.get("GDP", "2021"), Some(&CellValue::Number(3.0)));
    }

    #[test]
    fn test_column_count_is_sum_across_pages() {
        let pages = vec![
            vec![frag("A", &[("1", 1.0), ("2", 2.0)]), frag("B", &[("1", 5.0)])],
            vec![frag("A", &[("3", 3.0)])],
            vec![frag("B", &[("2", 6.0), ("3", 7.0)]), frag("A", &[("4", 4.0)])],
        ];
        let acc = pages
            .into_iter()
            .fold(PageAccumulator::new(), PageAccumulator::merge_page);
        assert_eq!(acc.column_count("A"), 4);
        assert_eq!(acc.column_count("B"), 3);
        assert_eq!(acc.labels(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_join_pads_missing_cells_with_not_available() {
        let table = PageAccumulator::new()
            .merge_page(vec![
                frag("A", &[("2020", 1.0), ("2021", 2.0)]),
                frag("B", &[("2019", 9.0)]),
            ])
            .finish();
        assert_eq!(table.periods, vec!["2020", "2021", "2019"]);
        assert_eq!(
            table.series("A").unwrap().values,
            vec![
                CellValue::Number(1.0),
                CellValue::Number(2.0),
                CellValue::NotAvailable
            ]
        );
        assert_eq!(table.series("B").unwrap().observed(), 1);
        for s in &table.series {
            assert_eq!(s.values.len(), table.periods.len());
        }
    }

    #[test]
    fn test_empty_fragments_are_skipped() {
        let table = PageAccumulator::new()
            .merge_page(vec![frag("Empty", &[]), frag("Full", &[("2020", 1.0)])])
            .finish();
        assert!(table.series("Empty").is_none());
        assert_eq!(table.series.len(), 1);

        let empty = PageAccumulator::new().merge_page(vec![frag("X", &[])]).finish();
        assert!(empty.is_empty());
        assert!(empty.periods.is_empty());
    }

    #[test]
    fn test_repeated_period_keeps_first_value() {
        let table = PageAccumulator::new()
            .merge_page(vec![frag("A", &[("2020", 1.0)])])
            .merge_page(vec![frag("A", &[("2020", 99.0), ("2021", 2.0)])])
            .finish();
        assert_eq!(table.get("A", "2020"), Some(&CellValue::Number(1.0)));
        assert_eq!(table.get("A", "2021"), Some(&CellValue::Number(2.0)));
    }

    #[test]
    fn test_repeated_period_within_one_page_is_not_counted_twice() {
        let acc = PageAccumulator::new()
            .merge_page(vec![frag("A", &[("2020", 1.0), ("2020", 5.0), ("2021", 2.0)])])
            .merge_page(vec![frag("A", &[("2021", 7.0), ("2022", 3.0)])]);
        assert_eq!(acc.column_count("A"), 3);
        let table = acc.finish();
        assert_eq!(table.periods, vec!["2020", "2021", "2022"]);
        assert_eq!(
            table.series("A").unwrap().values,
            vec![
                CellValue::Number(1.0),
                CellValue::Number(2.0),
                CellValue::Number(3.0)
            ]
        );
    }
}
