// src/fetch/mod.rs

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::error::TableError;
use crate::table::{RowFragment, TableMetadata};

pub mod metadata;
pub mod page;

pub use metadata::MetadataClient;
pub use page::PageClient;

/// Records per page enforced by the tabledata endpoint.
pub const PAGE_SIZE: usize = 2000;

/// Public SingStat TableBuilder API root.
pub const DEFAULT_BASE_URL: &str = "https://tablebuilder.singstat.gov.sg/api";

const USER_AGENT: &str = concat!("tablebuilder/", env!("CARGO_PKG_VERSION"));

/// Anything that can hand out a table's metadata.
pub trait MetadataSource {
    fn fetch_metadata(&self, table_id: &str) -> Result<TableMetadata, TableError>;
}

/// Anything that can hand out one page of a table's rows.
pub trait PageSource {
    fn fetch_page(&self, table_id: &str, offset: usize) -> Result<Vec<RowFragment>, TableError>;
}

/// Shared blocking HTTP client plus the API root both endpoints hang off.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// Build a client rooted at `base_url`. A trailing slash is added if
    /// missing so relative joins keep the full path.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()?;
        Ok(Self { client, base })
    }

    /// Resolve an endpoint path (`table/metadata/M015721`) against the root.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base.join(path)
    }

    /// GET `url` and return the body, failing on non-success statuses.
    fn get_text_core(&self, url: &Url) -> Result<String, reqwest::Error> {
        debug!("Fetching text from {}", url);
        self.client.get(url.clone()).send()?.error_for_status()?.text()
    }

    /// Build a [`MetadataClient`] sharing this connection pool.
    pub fn metadata(&self) -> MetadataClient {
        MetadataClient::new(self.clone())
    }

    /// Build a [`PageClient`] sharing this connection pool.
    pub fn pages(&self) -> PageClient {
        PageClient::new(self.clone())
    }
}

/// Both endpoints through one value, convenient for the composer.
impl MetadataSource for ApiClient {
    fn fetch_metadata(&self, table_id: &str) -> Result<TableMetadata, TableError> {
        self.metadata().fetch_metadata(table_id)
    }
}

impl PageSource for ApiClient {
    fn fetch_page(&self, table_id: &str, offset: usize) -> Result<Vec<RowFragment>, TableError> {
        self.pages().fetch_page(table_id, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_api_prefix() {
        let api = ApiClient::new(DEFAULT_BASE_URL).unwrap();
        let url = api.endpoint("table/metadata/M015721").unwrap();
        assert_eq!(
            url.as_str(),
            "https://tablebuilder.singstat.gov.sg/api/table/metadata/M015721"
        );
    }
}
