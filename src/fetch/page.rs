// src/fetch/page.rs

use serde::Deserialize;

use super::{ApiClient, PageSource};
use crate::error::TableError;
use crate::table::{CellValue, RowFragment};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Data", default)]
    data: Option<Data>,
}

#[derive(Debug, Deserialize)]
struct Data {
    #[serde(default)]
    row: Vec<Row>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Row {
    row_text: String,
    #[serde(default)]
    columns: Vec<Column>,
}

#[derive(Debug, Deserialize)]
struct Column {
    key: String,
    #[serde(default)]
    value: serde_json::Value,
}

/// Parse a tabledata response body into row fragments, in API order.
/// A page without `Data.row` is an empty page.
pub fn parse_page(url: &str, body: &str) -> Result<Vec<RowFragment>, TableError> {
    let envelope: Envelope = serde_json::from_str(body).map_err(|source| TableError::Decode {
        url: url.to_string(),
        source,
    })?;
    let rows = envelope.data.map(|d| d.row).unwrap_or_default();
    Ok(rows
        .into_iter()
        .map(|r| RowFragment {
            label: r.row_text,
            cells: r
                .columns
                .into_iter()
                .map(|c| (c.key, CellValue::from_json(&c.value)))
                .collect(),
        })
        .collect())
}

/// Fetches `GET {base}/table/tabledata/{tableId}?offset={n}`. No retries.
#[derive(Debug, Clone)]
pub struct PageClient {
    api: ApiClient,
}

impl PageClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl PageSource for PageClient {
    fn fetch_page(&self, table_id: &str, offset: usize) -> Result<Vec<RowFragment>, TableError> {
        let mut url = self
            .api
            .endpoint(&format!("table/tabledata/{}", table_id))
            .map_err(|source| TableError::InvalidEndpoint {
                table_id: table_id.to_string(),
                source,
            })?;
        url.query_pairs_mut()
            .append_pair("offset", &offset.to_string());

        let body = self
            .api
            .get_text_core(&url)
            .map_err(|source| TableError::Transport {
                url: url.to_string(),
                source,
            })?;
        parse_page(url.as_str(), &body)
    }
}
