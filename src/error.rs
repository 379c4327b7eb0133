// src/error.rs

use thiserror::Error;

/// Failures raised while fetching, assembling or formatting one table.
#[derive(Debug, Error)]
pub enum TableError {
    /// Metadata endpoint could not be reached, or the identifier is unknown.
    #[error("can't open table with code '{table_id}': {reason}")]
    Unreachable { table_id: String, reason: String },

    /// Any other request failure (page fetches, body reads).
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The table code could not be joined onto the API root.
    #[error("no valid endpoint for table '{table_id}'")]
    InvalidEndpoint {
        table_id: String,
        #[source]
        source: url::ParseError,
    },

    /// Response body did not match the expected JSON envelope.
    #[error("unexpected response body from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Cross-sectional tables have no sheet layout yet.
    #[error("table '{table_id}' is cross-sectional; only time-series tables are supported")]
    UnsupportedTableType { table_id: String },
}

impl TableError {
    /// True for the errors the composer reports and skips instead of aborting.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            TableError::Unreachable { .. } | TableError::UnsupportedTableType { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unreachable_and_unsupported_are_skippable() {
        let unreachable = TableError::Unreachable {
            table_id: "M1".into(),
            reason: "404".into(),
        };
        assert!(unreachable.is_skippable());
        assert!(TableError::UnsupportedTableType { table_id: "M1".into() }.is_skippable());

        let bad_endpoint = TableError::InvalidEndpoint {
            table_id: "M1".into(),
            source: url::ParseError::EmptyHost,
        };
        assert!(!bad_endpoint.is_skippable());
        let decode = TableError::Decode {
            url: "u".into(),
            source: serde_json::from_str::<serde_json::Value>("<html>").unwrap_err(),
        };
        assert!(!decode.is_skippable());
    }
}
