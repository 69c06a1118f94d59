use serde::Deserialize;

/// Top-level envelope of the headlines endpoint.
///
/// Everything inside is nominally optional; only the envelope itself is
/// required to deserialize.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsResponse {
    /// Total result count reported upstream. Decoded for wire-contract
    /// completeness; paging never consults it, since the feed reports more
    /// data regardless of how much the remote claims to have.
    #[serde(rename = "totalArticles", default)]
    pub total_articles: i64,
    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

/// One loosely-typed article payload as delivered by the API (or synthesized
/// by the mock generator). Validation happens in the mapper, not here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "image")]
    pub image_url: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub source: Option<RawSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSource {
    pub name: Option<String>,
    pub url: Option<String>,
}
