//! Outbound catalog lookup: URL construction, fetch and classification.
//!
//! The availability selector is an external contract with the catalog's
//! markup. If the catalog UI changes, the selector in `catalog` settings
//! must be revalidated against a live results page.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{header, Client};
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, error, instrument};

use shelfcheck_http::error::AppError;
use shelfcheck_kernel::settings::{CatalogSettings, SEARCH_TERM_PLACEHOLDER};

use super::models::{AvailabilityStatus, SearchResult};

/// Substring in the marker text that means a copy can be borrowed now.
pub const AVAILABLE_TEXT: &str = "Available";

/// Characters left unescaped by a browser's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a title for use as a single query component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Errors raised while fetching the catalog search page.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Library server responded with status: {status}")]
    Upstream { status: u16 },

    #[error("request to library server failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("failed to read library response: {0}")]
    Body(#[source] reqwest::Error),

    #[error("invalid availability selector: {0}")]
    Selector(String),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Upstream { status } => AppError::upstream(status),
            other => AppError::Scrape(anyhow::Error::new(other)),
        }
    }
}

/// Client for the library catalog search page.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http_client: Client,
    search_url_template: String,
    selector: Selector,
}

impl CatalogClient {
    /// Build a client from catalog settings.
    pub fn new(settings: &CatalogSettings) -> anyhow::Result<Self> {
        settings.validate()?;

        let selector = Selector::parse(&settings.availability_selector)
            .map_err(|e| CatalogError::Selector(e.to_string()))?;

        let mut builder = Client::builder();
        if let Some(user_agent) = &settings.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let http_client = builder.build()?;

        Ok(Self {
            http_client,
            search_url_template: settings.search_url_template.clone(),
            selector,
        })
    }

    /// The catalog URL queried for `title`.
    pub fn search_url(&self, title: &str) -> String {
        self.search_url_template
            .replacen(SEARCH_TERM_PLACEHOLDER, &encode_component(title), 1)
    }

    /// Fetch the catalog results for `title` and classify the top hit.
    #[instrument(skip(self))]
    pub async fn lookup(&self, title: &str) -> Result<SearchResult, CatalogError> {
        let search_url = self.search_url(title);
        debug!(url = %search_url, "fetching catalog search page");

        let response = self
            .http_client
            .get(&search_url)
            .header(header::ACCEPT, "text/html")
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "network error during catalog request");
                CatalogError::Network(e)
            })?;

        let status = response.status();
        debug!(status = %status, "received catalog response");

        if !status.is_success() {
            return Err(CatalogError::Upstream {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(CatalogError::Body)?;
        let status = classify(&body, &self.selector);

        Ok(SearchResult { status, search_url })
    }
}

/// Classify a results page by the text of its first availability marker.
pub fn classify(html: &str, selector: &Selector) -> AvailabilityStatus {
    let document = Html::parse_document(html);

    match document.select(selector).next() {
        None => AvailabilityStatus::NotFound,
        Some(marker) => {
            let text = marker.text().collect::<String>();
            if text.trim().contains(AVAILABLE_TEXT) {
                AvailabilityStatus::Available
            } else {
                AvailabilityStatus::CheckedOut
            }
        }
    }
}
