// src/fetch/metadata.rs

use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument};

use super::{ApiClient, MetadataSource};
use crate::error::TableError;
use crate::table::{RowMetadata, TableKind, TableMetadata};

/* ──────────────────────── wire envelope ──────────────────────── */

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Data", default)]
    data: Option<Data>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Data {
    records: Records,
    #[serde(default)]
    generated_by: Option<String>,
    #[serde(default)]
    date_generated: Option<String>,
    #[serde(default, deserialize_with = "present")]
    table_type: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Records {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    data_source: Option<String>,
    #[serde(default)]
    data_last_updated: Option<String>,
    #[serde(default)]
    footnote: Option<String>,
    #[serde(default)]
    total: Option<usize>,
    #[serde(default)]
    row: Vec<Row>,
    #[serde(default, deserialize_with = "present")]
    table_type: Option<serde_json::Value>,
    #[serde(default)]
    generated_by: Option<String>,
    #[serde(default)]
    date_generated: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Row {
    #[serde(default)]
    row_text: Option<String>,
    #[serde(rename = "uoM", default)]
    uom: Option<String>,
    #[serde(default)]
    footnote: Option<String>,
}

/// Maps any present value, `null` included, to `Some`. Only an absent key
/// stays `None` (via `#[serde(default)]`).
fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<serde_json::Value>, D::Error> {
    serde_json::Value::deserialize(d).map(Some)
}

/* ─────────────────────────── parsing ─────────────────────────── */

/// Parse a metadata response body for `table_id`.
///
/// A null or missing `Data` object is how the API answers an unknown
/// identifier, so it maps to [`TableError::Unreachable`].
pub fn parse_metadata(table_id: &str, url: &str, body: &str) -> Result<TableMetadata, TableError> {
    let envelope: Envelope = serde_json::from_str(body).map_err(|source| TableError::Decode {
        url: url.to_string(),
        source,
    })?;
    let data = envelope.data.ok_or_else(|| TableError::Unreachable {
        table_id: table_id.to_string(),
        reason: "response carried no table data".to_string(),
    })?;

    let kind = if data.table_type.is_some() || data.records.table_type.is_some() {
        TableKind::CrossSectional
    } else {
        TableKind::TimeSeries
    };

    let records = data.records;
    let rows = records
        .row
        .into_iter()
        .map(|r| RowMetadata {
            row_text: r.row_text.unwrap_or_default(),
            uom: r.uom.unwrap_or_default(),
            footnote: r.footnote.unwrap_or_default(),
        })
        .collect();

    Ok(TableMetadata {
        id: records.id.unwrap_or_else(|| table_id.to_string()),
        title: records.title.unwrap_or_default(),
        data_source: records.data_source.unwrap_or_default(),
        data_last_updated: records.data_last_updated.unwrap_or_default(),
        footnote: records.footnote.unwrap_or_default(),
        rows,
        total_records: records.total.unwrap_or(0),
        generated_by: data
            .generated_by
            .or(records.generated_by)
            .unwrap_or_default(),
        date_generated: data
            .date_generated
            .or(records.date_generated)
            .unwrap_or_default(),
        kind,
    })
}

/* ──────────────────────────── client ─────────────────────────── */

/// Fetches `GET {base}/table/metadata/{tableId}`.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    api: ApiClient,
}

impl MetadataClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl MetadataSource for MetadataClient {
    #[instrument(level = "debug", skip(self))]
    fn fetch_metadata(&self, table_id: &str) -> Result<TableMetadata, TableError> {
        let unreachable_err = |reason: String| TableError::Unreachable {
            table_id: table_id.to_string(),
            reason,
        };
        let url = self
            .api
            .endpoint(&format!("table/metadata/{}", table_id))
            .map_err(|source| TableError::InvalidEndpoint {
                table_id: table_id.to_string(),
                source,
            })?;
        let body = self
            .api
            .get_text_core(&url)
            .map_err(|e| unreachable_err(e.to_string()))?;
        let meta = parse_metadata(table_id, url.as_str(), &body)?;
        debug!(title = %meta.title, total = meta.total_records, kind = ?meta.kind, "metadata");
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GDP_META: &str = r#"{
        "Data": {
            "records": {
                "id": "M015721",
                "title": "Real GDP Annual",
                "dataSource": "SINGAPORE DEPARTMENT OF STATISTICS",
                "dataLastUpdated": "15/08/2024",
                "footnote": "Data are based on SSIC 2020.",
                "total": 2,
                "row": [
                    {"seriesNo": "1", "rowText": "GDP", "uoM": "S$ Million", "footnote": ""}
                ]
            },
            "generatedBy": "SingStat Table Builder",
            "dateGenerated": "17/10/2026"
        },
        "DataCount": 1,
        "StatusCode": 200,
        "Message": ""
    }"#;

    #[test]
    fn test_parse_time_series_metadata() {
        let meta = parse_metadata("M015721", "u", GDP_META).unwrap();
        assert_eq!(meta.id, "M015721");
        assert_eq!(meta.title, "Real GDP Annual");
        assert_eq!(meta.total_records, 2);
        assert_eq!(meta.kind, TableKind::TimeSeries);
        assert_eq!(meta.headline_unit(), "S$ Million");
        assert_eq!(meta.generated_by, "SingStat Table Builder");
        assert_eq!(meta.date_generated, "17/10/2026");
    }

    #[test]
    fn test_table_type_marks_cross_sectional() {
        let body = r#"{"Data": {"records": {"id": "X1", "tableType": "CrossSectional", "row": []}}}"#;
        let meta = parse_metadata("X1", "u", body).unwrap();
        assert_eq!(meta.kind, TableKind::CrossSectional);

        let body = r#"{"Data": {"tableType": "CS", "records": {"id": "X2"}}}"#;
        let meta = parse_metadata("X2", "u", body).unwrap();
        assert_eq!(meta.kind, TableKind::CrossSectional);

        // The key alone decides, even when it carries null.
        let body = r#"{"Data": {"records": {"id": "X3", "tableType": null, "row": []}}}"#;
        let meta = parse_metadata("X3", "u", body).unwrap();
        assert_eq!(meta.kind, TableKind::CrossSectional);
    }

    #[test]
    fn test_null_data_is_unreachable() {
        let body = r#"{"Data": null, "StatusCode": 404, "Message": "not found"}"#;
        let err = parse_metadata("BAD", "u", body).unwrap_err();
        assert!(matches!(err, TableError::Unreachable { ref table_id, .. } if table_id == "BAD"));
    }

    #[test]
    fn test_garbage_body_is_decode_error() {
        let err = parse_metadata("M1", "u", "<html>").unwrap_err();
        assert!(matches!(err, TableError::Decode { .. }));
    }
}
