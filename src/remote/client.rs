use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use super::types::{NewsResponse, RawArticle};
use crate::sync::PAGE_SIZE;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised by a headline fetch.
///
/// The sync mediator downgrades all of these to an empty page; they are
/// surfaced individually so tests and logs can tell the cases apart.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code (403 on quota exhaustion)
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the 30-second timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body was not a valid headlines envelope
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Remote headline source: one GET per page against a GNews-style
/// `top-headlines` endpoint.
#[derive(Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    base: Url,
    api_key: SecretString,
    lang: String,
    country: String,
}

impl NewsClient {
    pub fn new(base: Url, api_key: SecretString, lang: &str, country: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
            api_key,
            lang: lang.to_string(),
            country: country.to_string(),
        }
    }

    /// Fetch one page of headlines.
    ///
    /// `category` and `query` are mutually exclusive: a non-empty search
    /// query suppresses the category filter. Page size is fixed at
    /// [`PAGE_SIZE`].
    pub async fn top_headlines(
        &self,
        category: Option<&str>,
        query: Option<&str>,
        page: u32,
    ) -> Result<Vec<RawArticle>, FetchError> {
        let mut endpoint = self
            .base
            .join("top-headlines")
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        {
            let mut params = endpoint.query_pairs_mut();
            let query = query.filter(|q| !q.is_empty());
            if let Some(q) = query {
                params.append_pair("q", q);
            } else if let Some(cat) = category {
                params.append_pair("category", cat);
            }
            params
                .append_pair("lang", &self.lang)
                .append_pair("country", &self.country)
                .append_pair("max", &PAGE_SIZE.to_string())
                .append_pair("page", &page.to_string())
                .append_pair("apikey", self.api_key.expose_secret());
        }

        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.http.get(endpoint).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let envelope: NewsResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(envelope.articles)
    }
}

impl std::fmt::Debug for NewsClient {
    // api_key is masked; everything else is plain
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsClient")
            .field("base", &self.base.as_str())
            .field("api_key", &"<redacted>")
            .field("lang", &self.lang)
            .field("country", &self.country)
            .finish()
    }
}
