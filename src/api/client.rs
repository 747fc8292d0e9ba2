use reqwest::Client;
use tracing::debug;

use crate::config::FeedConfig;
use crate::error::FetchError;
use crate::state::data::Item;

/// HTTP client for the Picsum list API
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct PicsumClient {
    http: Client,
    base_url: String,
    page_size: u32,
}

impl PicsumClient {
    pub fn new(config: &FeedConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
        })
    }

    /// URL of the list endpoint for `page`
    pub fn page_url(&self, page: u32) -> String {
        format!(
            "{}/v2/list?page={}&limit={}",
            self.base_url, page, self.page_size
        )
    }

    /// URL of a pre-sized rendition of `item` that fits a `size` x `size` box
    ///
    /// Picsum scales server-side, so thumbnails never pull the full-size
    /// original.
    pub fn thumbnail_url(&self, item: &Item, size: u32) -> String {
        let (width, height) = fit_within(item.width, item.height, size);
        format!("{}/id/{}/{}/{}", self.base_url, item.id, width, height)
    }

    /// Fetch one page of item metadata
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<Item>, FetchError> {
        let url = self.page_url(page);
        debug!(%url, "GET page");

        let body = self.fetch_bytes(&url).await?;
        parse_page(&body)
    }

    /// Fetch the raw body at `url`, failing on non-success status codes
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Scale `width` x `height` to fit a `size` box, keeping aspect ratio
fn fit_within(width: u32, height: u32, size: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (size, size);
    }
    let scale = |long: u32, short: u32| ((size as u64 * short as u64) / long as u64).max(1) as u32;
    if width >= height {
        (size, scale(width, height))
    } else {
        (scale(height, width), size)
    }
}

/// Decode a list response body
pub fn parse_page(body: &[u8]) -> Result<Vec<Item>, FetchError> {
    Ok(serde_json::from_slice(body)?)
}
