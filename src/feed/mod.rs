//! Paged feed instances.
//!
//! A [`PagedFeed`] binds one (channel, query) pair to the article cache and a
//! sync mediator. Presentation code reads windows of projected rows and asks
//! for more when it nears the cached tail; the feed keeps at most one load in
//! flight and coalesces triggers that arrive while one is outstanding.
//! Switching channel or query never mutates an instance in place: the
//! reader closes the old instance and constructs a new one, which cancels
//! any in-flight load tied to the stale parameters.

use std::sync::Mutex;

use crate::remote::NewsClient;
use crate::storage::{ArticleRecord, Database, LayoutKind};
use crate::sync::{CancelToken, LoadOutcome, LoadTrigger, SyncError, SyncMediator, PAGE_SIZE};

/// Load state of a feed instance. `Error` is always recoverable by retrying
/// the same trigger; it is never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    Idle,
    Loading(LoadTrigger),
    Error(String),
}

/// Result of a `load_more` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedLoad {
    /// A page load ran to completion.
    Completed { more_available: bool },
    /// Another load was already in flight; this trigger was absorbed.
    Coalesced,
    /// The instance was closed (superseded by a channel/query switch);
    /// nothing was loaded or written.
    Closed,
}

/// A projected feed row for presentation code. Optional descriptive fields
/// are defaulted here so consumers never deal with missing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub url: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub source_name: String,
    pub published_at: String,
    pub layout_kind: LayoutKind,
    pub gallery_images: Vec<String>,
    pub is_viewed: bool,
    pub is_liked: bool,
}

impl FeedItem {
    pub(crate) fn from_record(record: ArticleRecord) -> Self {
        Self {
            url: record.url,
            title: record.title,
            description: record
                .description
                .unwrap_or_else(|| "No summary yet".to_string()),
            image_url: record.image_url.unwrap_or_default(),
            source_name: record
                .source_name
                .unwrap_or_else(|| "Unknown source".to_string()),
            published_at: record.published_at.unwrap_or_default(),
            layout_kind: record.layout_kind,
            gallery_images: record.gallery_images,
            is_viewed: record.is_viewed,
            is_liked: record.is_liked,
        }
    }
}

/// A cache-backed, forward-growing sequence of articles for one
/// (channel, query) pair.
pub struct PagedFeed {
    db: Database,
    mediator: SyncMediator,
    channel: String,
    query: Option<String>,
    state: Mutex<FeedState>,
    in_flight: tokio::sync::Mutex<()>,
    cancel: CancelToken,
}

impl PagedFeed {
    pub fn new(db: Database, client: NewsClient, channel: &str, query: Option<&str>) -> Self {
        let cancel = CancelToken::new();
        let mediator = SyncMediator::new(client, db.clone(), channel, query, cancel.clone());
        Self {
            db,
            mediator,
            channel: channel.to_string(),
            query: query.map(str::to_string).filter(|q| !q.is_empty()),
            state: Mutex::new(FeedState::Idle),
            in_flight: tokio::sync::Mutex::new(()),
            cancel,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    /// Current load state. Lock poisoning cannot happen here: no code path
    /// panics while holding the state lock.
    pub fn state(&self) -> FeedState {
        self.state.lock().expect("state lock").clone()
    }

    /// Mark the instance as superseded. In-flight loads observe the flag
    /// before committing and write nothing; future loads refuse to start.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn set_state(&self, state: FeedState) {
        *self.state.lock().expect("state lock") = state;
    }

    /// Trigger a page load.
    ///
    /// At most one load runs per instance; a trigger arriving while one is
    /// outstanding returns [`FeedLoad::Coalesced`] without touching the
    /// cache, so concurrent writes to the table can never interleave.
    pub async fn load_more(&self, trigger: LoadTrigger) -> Result<FeedLoad, SyncError> {
        if self.is_closed() {
            return Ok(FeedLoad::Closed);
        }

        let Ok(_guard) = self.in_flight.try_lock() else {
            return Ok(FeedLoad::Coalesced);
        };

        self.set_state(FeedState::Loading(trigger));

        let cached_count = match self.db.count_articles().await {
            Ok(count) => count,
            Err(e) => {
                let msg = e.to_string();
                self.set_state(FeedState::Error(msg.clone()));
                return Err(SyncError::Database(msg));
            }
        };

        match self.mediator.load(trigger, cached_count).await {
            Ok(LoadOutcome::Completed { more_available }) => {
                self.set_state(FeedState::Idle);
                Ok(FeedLoad::Completed { more_available })
            }
            Ok(LoadOutcome::Cancelled) => {
                self.set_state(FeedState::Idle);
                Ok(FeedLoad::Closed)
            }
            Err(e) => {
                self.set_state(FeedState::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// A window of projected rows, ordered by insertion (oldest first), with
    /// no placeholders for rows not yet loaded.
    pub async fn window(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<FeedItem>> {
        let records = self.db.feed_window(limit, offset).await?;
        Ok(records.into_iter().map(FeedItem::from_record).collect())
    }
}
