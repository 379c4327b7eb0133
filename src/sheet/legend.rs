// src/sheet/legend.rs
//
// Fixed text of the reference export layout.

/// Leading cell of the data grid's header line.
pub const GRID_INDEX_LABEL: &str = "Data Series";

/// Marker written for cells a series has no value for.
pub const NOT_AVAILABLE: &str = "na";

pub const FOOTNOTES_LABEL: &str = "Footnotes:";

pub const NOTATION: &[&str] = &[
    "Notation:",
    "na   not available or not applicable",
    "nec  not elsewhere classified",
    "nes  not elsewhere specified",
    " -     nil or negligible or not significant",
];

pub const NOTES: &[&str] = &[
    "Notes",
    "Numbers may not add up to the totals due to rounding.",
    "Data are the latest available at the time of access or download. Some statistics, particularly those for the most recent time periods, are provisional and may be subject to revision at a later date.",
    "Values are shown in Singapore dollars (unless otherwise specified).",
];
