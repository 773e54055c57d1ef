use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use crate::core::library::{LibraryError, LibraryResult};
use crate::gateway::metadata::{BookMetadata, MetadataFetcher};

const UNKNOWN: &str = "Unknown";
const NO_DESCRIPTION: &str = "No description available";

// GoogleBooksFetcher looks up volumes through the Google Books v1 API.
// See https://developers.google.com/books/docs/v1/using#PerformingSearch
#[derive(Debug)]
pub struct GoogleBooksFetcher {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    description: Option<String>,
}

impl GoogleBooksFetcher {
    pub(crate) fn new(base_url: &str, timeout: Duration) -> LibraryResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| LibraryError::runtime(
                format!("failed to build metadata client {}", err).as_str(), None))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn volumes_url(&self) -> String {
        format!("{}/volumes", self.base_url)
    }
}

#[async_trait]
impl MetadataFetcher for GoogleBooksFetcher {
    async fn fetch_by_isbn(&self, isbn: &str) -> LibraryResult<BookMetadata> {
        let url = self.volumes_url();
        let query = format!("isbn:{}", isbn);
        debug!(url = url.as_str(), isbn, "fetching book metadata");
        let response = self.client
            .get(url.as_str())
            .query(&[("q", query.as_str())])
            .timeout(self.timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!(isbn, status = status.as_u16(), "metadata service answered with error");
            return Err(LibraryError::from_http_status(
                format!("failed to fetch book details for {}", isbn).as_str(), status.as_u16()));
        }
        let body = response.text().await?;
        parse_volumes(isbn, body.as_str())
    }
}

// Only the first volume is used; missing fields get placeholder values.
fn parse_volumes(isbn: &str, body: &str) -> LibraryResult<BookMetadata> {
    let res: VolumesResponse = serde_json::from_str(body).map_err(|err| LibraryError::unavailable(
        format!("undecodable metadata for {}: {}", isbn, err).as_str(), Some("decode".to_string()), false))?;
    let volume = res.items.into_iter().next()
        .ok_or_else(|| LibraryError::not_found(
            format!("book {} not found in external catalog", isbn).as_str()))?;
    let info = volume.volume_info;
    let author = if info.authors.is_empty() {
        UNKNOWN.to_string()
    } else {
        info.authors.join(", ")
    };
    Ok(BookMetadata {
        isbn: isbn.to_string(),
        title: info.title.unwrap_or(UNKNOWN.to_string()),
        author,
        description: info.description.unwrap_or(NO_DESCRIPTION.to_string()),
    })
}
