// src/config.rs

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path, path::PathBuf};

use crate::fetch::DEFAULT_BASE_URL;
use crate::workbook::{sanitize_sheet_name, TableEntry};

/// Table codes end up in URL paths, so keep them to a safe alphabet.
static TABLE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("table id pattern should compile"));

/// Check that `id` is a plain table code that can go into a URL path as is.
pub fn validate_table_id(id: &str) -> Result<()> {
    if !TABLE_ID_RE.is_match(id) {
        bail!("invalid table id `{}`", id);
    }
    Ok(())
}

const BUILTIN_CONFIG: &str = include_str!("../config/dos_tables.yaml");

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("DOS_data.xlsx")
}

/// Which tables to fetch, where from, and where the workbook goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    pub tables: Vec<TableEntry>,
}

impl Config {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(text).context("parsing config YAML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        Self::from_yaml_str(&text).with_context(|| format!("loading config {:?}", path))
    }

    /// The Department of Statistics table set shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_CONFIG).context("loading built-in config")
    }

    /// Reject configs that would fail only after the network work is done.
    pub fn validate(&self) -> Result<()> {
        if self.tables.is_empty() {
            bail!("config lists no tables");
        }
        let mut seen = HashSet::new();
        for entry in &self.tables {
            validate_table_id(&entry.id)?;
            let name = sanitize_sheet_name(&entry.sheet).to_lowercase();
            if !seen.insert(name) {
                bail!(
                    "sheet name `{}` (table {}) collides with an earlier sheet",
                    entry.sheet,
                    entry.id
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_config_keeps_order() {
        let cfg = Config::builtin().unwrap();
        assert_eq!(cfg.tables.len(), 20);
        assert_eq!(cfg.tables[0], TableEntry::new("M015721", "Real GDP Annual (DOS)"));
        assert_eq!(cfg.tables[19].sheet, "Exchange, End of Period, Mthly");
        assert_eq!(cfg.output, PathBuf::from("DOS_data.xlsx"));
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let cfg = Config::from_yaml_str(
            "tables:\n  - id: M015661\n    sheet: Sheet First\n  - id: M400221\n    sheet: Sheet Later\n",
        )
        .unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.tables[1].id, "M400221");
    }

    #[test]
    fn test_rejects_bad_configs() {
        assert!(Config::from_yaml_str("tables: []\n").is_err());
        assert!(Config::from_yaml_str("tables:\n  - { id: \"M1/../x\", sheet: A }\n").is_err());
        assert!(Config::from_yaml_str(
            "tables:\n  - { id: M1, sheet: Same }\n  - { id: M2, sheet: same }\n"
        )
        .is_err());
        // Apostrophes are stripped, so these two name the same sheet.
        assert!(Config::from_yaml_str(
            "tables:\n  - { id: M1, sheet: \"'Quarterly'\" }\n  - { id: M2, sheet: Quarterly }\n"
        )
        .is_err());
    }

    #[test]
    fn test_apostrophe_sheet_name_loads_and_writes() {
        let cfg =
            Config::from_yaml_str("tables:\n  - { id: M1, sheet: \"'Quarterly'\" }\n").unwrap();
        let mut book = crate::Workbook::new();
        book.add_sheet(&cfg.tables[0].sheet, crate::FormattedSheet::default())
            .unwrap();
        assert_eq!(book.sheet_names().collect::<Vec<_>>(), vec!["Quarterly"]);
        assert!(crate::workbook::xlsx::workbook_to_buffer(&book).is_ok());
    }

    #[test]
    fn test_validate_table_id() {
        assert!(validate_table_id("M015721").is_ok());
        assert!(validate_table_id("M1?x=1").is_err());
        assert!(validate_table_id("../M1").is_err());
        assert!(validate_table_id("").is_err());
    }
}
