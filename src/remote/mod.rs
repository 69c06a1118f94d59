mod client;
mod types;

pub use client::{FetchError, NewsClient};
pub use types::{NewsResponse, RawArticle, RawSource};
