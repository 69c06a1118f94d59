use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use super::mapper::map_article;
use super::{mock, CancelToken, PAGE_SIZE};
use crate::channel::HOT;
use crate::remote::NewsClient;
use crate::storage::{Database, LayoutKind, NewArticle};

/// Direction of a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTrigger {
    /// Wipe the cache and load page 1.
    Refresh,
    /// Load upward. The feed is forward-only, so this always reports that no
    /// more data exists in that direction.
    Prepend,
    /// Load the next page past the cached tail.
    Append,
}

/// Result of a load attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was committed (or Prepend short-circuited).
    ///
    /// `more_available` is deliberately always true for Refresh/Append: the
    /// feed never signals exhaustion, favoring endless scroll over
    /// end-of-data accuracy. Prepend is the one direction that terminates.
    Completed { more_available: bool },
    /// The feed instance was cancelled before the page could be written.
    /// Nothing was committed.
    Cancelled,
}

/// Errors a load can surface to the caller.
///
/// Transport failures never appear here; they are downgraded to an empty
/// page inside the load. Only a failed cache write aborts the operation.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Cache write failed: {0}")]
    Database(String),
}

/// Orchestrates one "load a page" operation: derives the page number from the
/// cache size, picks a source (trending synthesizer, network, or mock
/// fallback), maps and orders the batch, and commits it atomically.
#[derive(Clone)]
pub struct SyncMediator {
    client: NewsClient,
    db: Database,
    channel: String,
    query: Option<String>,
    cancel: CancelToken,
}

impl SyncMediator {
    pub fn new(
        client: NewsClient,
        db: Database,
        channel: &str,
        query: Option<&str>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            client,
            db,
            channel: channel.to_string(),
            query: query.map(str::to_string).filter(|q| !q.is_empty()),
            cancel,
        }
    }

    /// True when this mediator serves the trending channel, which never
    /// touches the network. A search query overrides the channel.
    fn is_hot(&self) -> bool {
        self.channel == HOT && self.query.is_none()
    }

    /// Load one page and commit it to the cache.
    ///
    /// `cached_count` is the current number of cached rows; Append derives
    /// its page number from it (`count / page size + 1`).
    pub async fn load(
        &self,
        trigger: LoadTrigger,
        cached_count: i64,
    ) -> Result<LoadOutcome, SyncError> {
        if self.cancel.is_cancelled() {
            return Ok(LoadOutcome::Cancelled);
        }

        let page = match trigger {
            LoadTrigger::Refresh => 1,
            LoadTrigger::Prepend => {
                return Ok(LoadOutcome::Completed { more_available: false })
            }
            LoadTrigger::Append => (cached_count / PAGE_SIZE as i64 + 1) as u32,
        };

        // StdRng rather than thread_rng so the future stays Send
        let mut rng = StdRng::from_entropy();

        let mut raw = if self.is_hot() {
            mock::hot_page(page)
        } else {
            match self
                .client
                .top_headlines(Some(&self.channel), self.query.as_deref(), page)
                .await
            {
                Ok(articles) => articles,
                Err(e) => {
                    // Transport and protocol failures downgrade to an empty
                    // page; the mock tier below keeps the feed scrolling.
                    tracing::warn!(
                        channel = %self.channel,
                        page = page,
                        error = %e,
                        "Headline fetch failed, treating as empty page"
                    );
                    Vec::new()
                }
            }
        };

        if raw.is_empty() {
            let salt: u64 = rng.gen();
            raw = mock::mock_page(page, &self.channel, self.query.as_deref(), salt);
        }

        // Refresh intentionally randomizes presentation order; the trending
        // list keeps its rank order.
        if trigger == LoadTrigger::Refresh && !self.is_hot() {
            raw.shuffle(&mut rng);
        }

        // Wall clock alone collides when two batches commit within the same
        // millisecond, so the base is clamped past the cached tail.
        let mut base_time = chrono::Utc::now().timestamp_millis();
        let tail = self
            .db
            .max_inserted_at()
            .await
            .map_err(|e| SyncError::Database(e.to_string()))?;
        if let Some(tail) = tail {
            base_time = base_time.max(tail + 1);
        }

        let mut rows: Vec<NewArticle> = Vec::with_capacity(raw.len());
        for item in &raw {
            if let Some(mut record) = map_article(item, &mut rng) {
                // base + position: strict, collision-free ordering within
                // and across batches
                record.inserted_at = base_time + rows.len() as i64;
                if self.is_hot() {
                    record.layout_kind = LayoutKind::HotRank;
                }
                rows.push(record);
            }
        }

        // A feed superseded mid-fetch must not clear or append the table
        if self.cancel.is_cancelled() {
            return Ok(LoadOutcome::Cancelled);
        }

        let inserted = self
            .db
            .commit_page(trigger == LoadTrigger::Refresh, &rows)
            .await
            .map_err(|e| SyncError::Database(e.to_string()))?;

        tracing::debug!(
            channel = %self.channel,
            query = self.query.as_deref().unwrap_or(""),
            page = page,
            fetched = raw.len(),
            inserted = inserted,
            "Page committed"
        );

        Ok(LoadOutcome::Completed { more_available: true })
    }
}
