//! Dependency-injection root for the reader.
//!
//! Construct the [`Database`] and [`NewsClient`] once at process start and
//! hand them to [`NewsReader`]; everything downstream receives its handles
//! explicitly. There is no process-wide singleton.

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::channel::{self, Channel, GENERAL};
use crate::feed::{FeedItem, FeedLoad, PagedFeed};
use crate::remote::NewsClient;
use crate::storage::Database;
use crate::sync::{LoadTrigger, SyncError, PAGE_SIZE};

/// Default window size for the history and liked views.
const VIEW_LIMIT: i64 = 200;

/// The collaborator surface presentation code talks to: one active paged
/// feed plus the status mutations and secondary views around it.
pub struct NewsReader {
    db: Database,
    client: NewsClient,
    feed: Arc<PagedFeed>,
    channel: String,
    query: Option<String>,
}

impl NewsReader {
    /// Start on the default recommendation channel.
    pub fn new(db: Database, client: NewsClient) -> Self {
        let feed = Arc::new(PagedFeed::new(db.clone(), client.clone(), GENERAL, None));
        Self {
            db,
            client,
            feed,
            channel: GENERAL.to_string(),
            query: None,
        }
    }

    pub fn current_channel(&self) -> &str {
        &self.channel
    }

    pub fn current_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The active feed instance. Holders of this handle keep reading from it
    /// until the next channel/query switch closes it.
    pub fn feed(&self) -> Arc<PagedFeed> {
        Arc::clone(&self.feed)
    }

    /// Replace the current feed instance with one for new parameters. The old
    /// instance is closed first, so its in-flight load (if any) commits
    /// nothing.
    fn rebuild_feed(&mut self) {
        self.feed.close();
        self.feed = Arc::new(PagedFeed::new(
            self.db.clone(),
            self.client.clone(),
            &self.channel,
            self.query.as_deref(),
        ));
    }

    /// Switch the active channel. Clears any active search query: browsing a
    /// channel and searching are mutually exclusive contexts.
    pub fn change_channel(&mut self, code: &str) -> Result<()> {
        if channel::find(code).is_none() {
            bail!("Unknown channel: {}", code);
        }
        if self.channel == code && self.query.is_none() {
            return Ok(());
        }
        self.channel = code.to_string();
        self.query = None;
        self.rebuild_feed();
        Ok(())
    }

    /// Enter a search context. An empty query clears the search instead.
    pub fn change_query(&mut self, text: &str) {
        let normalized = if text.is_empty() { None } else { Some(text.to_string()) };
        if self.query == normalized {
            return;
        }
        self.query = normalized;
        self.rebuild_feed();
    }

    pub fn clear_query(&mut self) {
        self.change_query("");
    }

    /// Trigger a load on the active feed.
    pub async fn load_more(&self, trigger: LoadTrigger) -> Result<FeedLoad, SyncError> {
        self.feed.load_more(trigger).await
    }

    /// A window of the active feed sized to one page.
    pub async fn feed_window(&self, offset: i64) -> Result<Vec<FeedItem>> {
        self.feed.window(PAGE_SIZE as i64, offset).await
    }

    /// Mark an article (all duplicate rows) as viewed.
    pub async fn mark_viewed(&self, url: &str) -> Result<u64> {
        self.db.mark_viewed(url).await
    }

    /// Flip the liked flag on an article (all duplicate rows together).
    pub async fn toggle_liked(&self, url: &str) -> Result<Option<bool>> {
        self.db.toggle_liked(url).await
    }

    /// Viewed rows, most recently viewed first.
    pub async fn viewed_history(&self) -> Result<Vec<FeedItem>> {
        let records = self.db.viewed_history(VIEW_LIMIT).await?;
        Ok(records.into_iter().map(FeedItem::from_record).collect())
    }

    /// Liked rows, newest insertion first.
    pub async fn liked(&self) -> Result<Vec<FeedItem>> {
        let records = self.db.liked_articles(VIEW_LIMIT).await?;
        Ok(records.into_iter().map(FeedItem::from_record).collect())
    }

    // Channel selection passthrough

    pub async fn my_channels(&self) -> Result<Vec<&'static Channel>> {
        self.db.my_channels().await
    }

    pub async fn other_channels(&self) -> Result<Vec<&'static Channel>> {
        self.db.other_channels().await
    }

    pub async fn add_channel(&self, code: &str) -> Result<()> {
        self.db.add_channel(code).await
    }

    pub async fn remove_channel(&self, code: &str) -> Result<()> {
        self.db.remove_channel(code).await
    }
}
