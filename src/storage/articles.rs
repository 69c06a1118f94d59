use std::collections::HashSet;

use anyhow::Result;
use sqlx::QueryBuilder;

use super::schema::Database;
use super::types::{encode_gallery, ArticleDbRow, ArticleRecord, NewArticle};

// ============================================================================
// Query Limit Constants
// ============================================================================

/// Maximum number of articles to return from any single query (OOM protection)
const MAX_ARTICLES: i64 = 2000;

/// Batch size for bulk inserts: 14 columns * 50 rows = 700 binds, well under
/// SQLite's 999 parameter limit.
const INSERT_BATCH_SIZE: usize = 50;

const ARTICLE_COLUMNS: &str = "id, url, title, description, body, image_url, published_at, \
     source_name, source_origin, layout_kind, gallery_images, \
     is_viewed, viewed_at, is_liked, inserted_at";

impl Database {
    // ========================================================================
    // Page Commit
    // ========================================================================

    /// Commit one loaded page to the cache as a single transaction.
    ///
    /// Steps, in order, all-or-nothing:
    /// 1. Capture the set of currently-liked urls before any mutation.
    /// 2. When `refresh`, clear the whole table.
    /// 3. Bulk-insert the batch, forcing `is_liked = 1` on any row whose url
    ///    was captured in step 1.
    ///
    /// Step 3 is what lets liked state survive a full-table wipe even though
    /// every row comes back under a new surrogate id.
    ///
    /// Returns the number of rows inserted.
    pub async fn commit_page(&self, refresh: bool, rows: &[NewArticle]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        let liked: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT url FROM articles WHERE is_liked = 1")
                .fetch_all(&mut *tx)
                .await?;
        let liked: HashSet<String> = liked.into_iter().map(|(url,)| url).collect();

        if refresh {
            sqlx::query("DELETE FROM articles").execute(&mut *tx).await?;
        }

        for chunk in rows.chunks(INSERT_BATCH_SIZE) {
            let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
                "INSERT INTO articles (url, title, description, body, image_url, published_at, \
                 source_name, source_origin, layout_kind, gallery_images, \
                 is_viewed, viewed_at, is_liked, inserted_at) ",
            );

            builder.push_values(chunk, |mut b, row| {
                let is_liked = row.is_liked || liked.contains(&row.url);
                b.push_bind(&row.url)
                    .push_bind(&row.title)
                    .push_bind(&row.description)
                    .push_bind(&row.body)
                    .push_bind(&row.image_url)
                    .push_bind(&row.published_at)
                    .push_bind(&row.source_name)
                    .push_bind(&row.source_origin)
                    .push_bind(row.layout_kind.as_str())
                    .push_bind(encode_gallery(&row.gallery_images))
                    .push_bind(false)
                    .push_bind(Option::<i64>::None)
                    .push_bind(is_liked)
                    .push_bind(row.inserted_at);
            });

            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(rows.len())
    }

    /// Delete every cached article. Exposed for manual cache resets; the
    /// refresh path clears inside the commit transaction instead.
    pub async fn clear_articles(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM articles").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    // ========================================================================
    // Feed Queries
    // ========================================================================

    /// Largest `inserted_at` currently cached, `None` when the table is
    /// empty. The mediator clamps each batch's time base past this value so
    /// ordering stays strict even when batches land within one millisecond.
    pub async fn max_inserted_at(&self) -> Result<Option<i64>> {
        let row: (Option<i64>,) = sqlx::query_as("SELECT MAX(inserted_at) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Total number of cached articles. Drives Append page derivation.
    pub async fn count_articles(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// A window of the feed, ordered by insertion (oldest first).
    ///
    /// `inserted_at` is assigned as batch base time + position, so this order
    /// is strict and stable across refresh/append cycles.
    pub async fn feed_window(&self, limit: i64, offset: i64) -> Result<Vec<ArticleRecord>> {
        let limit = limit.min(MAX_ARTICLES);
        let rows = sqlx::query_as::<_, ArticleDbRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY inserted_at ASC LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ArticleDbRow::into_record).collect())
    }

    /// Viewed rows, most recently viewed first.
    pub async fn viewed_history(&self, limit: i64) -> Result<Vec<ArticleRecord>> {
        let limit = limit.min(MAX_ARTICLES);
        let rows = sqlx::query_as::<_, ArticleDbRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE is_viewed = 1 \
             ORDER BY viewed_at DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ArticleDbRow::into_record).collect())
    }

    /// Liked rows, newest insertion first.
    pub async fn liked_articles(&self, limit: i64) -> Result<Vec<ArticleRecord>> {
        let limit = limit.min(MAX_ARTICLES);
        let rows = sqlx::query_as::<_, ArticleDbRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE is_liked = 1 \
             ORDER BY inserted_at DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ArticleDbRow::into_record).collect())
    }

    /// First row carrying the given url (lowest surrogate id wins when the
    /// endless feed holds duplicates).
    pub async fn get_by_url(&self, url: &str) -> Result<Option<ArticleRecord>> {
        let row = sqlx::query_as::<_, ArticleDbRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE url = ? ORDER BY id ASC LIMIT 1"
        ))
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ArticleDbRow::into_record))
    }

    /// Distinct urls of every liked row.
    pub async fn liked_urls(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT url FROM articles WHERE is_liked = 1")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(url,)| url).collect())
    }

    // ========================================================================
    // Status Mutations
    // ========================================================================

    /// Mark every row with this url as viewed, stamping the view time.
    ///
    /// Idempotent in the boolean and last-write-wins on the timestamp: calling
    /// twice leaves `is_viewed = 1` with the second call's `viewed_at`.
    /// Returns the number of rows touched.
    pub async fn mark_viewed(&self, url: &str) -> Result<u64> {
        let now = chrono::Utc::now().timestamp_millis();
        let result = sqlx::query("UPDATE articles SET is_viewed = 1, viewed_at = ? WHERE url = ?")
            .bind(now)
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Atomically flip the liked flag on every row with this url.
    ///
    /// Duplicate rows flip together in a single statement, so they can never
    /// disagree. Returns the new value, or `None` if no row carries the url.
    /// Toggling twice restores the original value.
    pub async fn toggle_liked(&self, url: &str) -> Result<Option<bool>> {
        let rows: Vec<(bool,)> = sqlx::query_as(
            "UPDATE articles SET is_liked = NOT is_liked WHERE url = ? RETURNING is_liked",
        )
        .bind(url)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.first().map(|(liked,)| *liked))
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{Database, LayoutKind, NewArticle};

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    fn test_article(url: &str, title: &str, inserted_at: i64) -> NewArticle {
        NewArticle {
            url: url.to_string(),
            title: title.to_string(),
            description: Some("Test summary".to_string()),
            body: None,
            image_url: Some(format!("https://img.example.com/{}.jpg", title)),
            published_at: Some("2026-08-25".to_string()),
            source_name: Some("Example Wire".to_string()),
            source_origin: Some("https://example.com".to_string()),
            layout_kind: LayoutKind::Standard,
            gallery_images: Vec::new(),
            is_liked: false,
            inserted_at,
        }
    }

    #[tokio::test]
    async fn test_commit_page_inserts_in_order() {
        let db = test_db().await;
        let rows: Vec<_> = (0..10)
            .map(|i| test_article(&format!("https://e.com/{}", i), &format!("A{}", i), 1000 + i))
            .collect();

        let inserted = db.commit_page(false, &rows).await.unwrap();
        assert_eq!(inserted, 10);

        let window = db.feed_window(20, 0).await.unwrap();
        assert_eq!(window.len(), 10);
        for pair in window.windows(2) {
            assert!(pair[0].inserted_at < pair[1].inserted_at);
        }
    }

    #[tokio::test]
    async fn test_commit_page_refresh_clears_previous_batch() {
        let db = test_db().await;
        db.commit_page(false, &[test_article("https://e.com/old", "Old", 1)])
            .await
            .unwrap();

        db.commit_page(true, &[test_article("https://e.com/new", "New", 2)])
            .await
            .unwrap();

        let window = db.feed_window(10, 0).await.unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].url, "https://e.com/new");
    }

    #[tokio::test]
    async fn test_commit_page_preserves_liked_across_wipe() {
        let db = test_db().await;
        db.commit_page(
            false,
            &[
                test_article("https://e.com/a", "A", 1),
                test_article("https://e.com/b", "B", 2),
            ],
        )
        .await
        .unwrap();
        db.toggle_liked("https://e.com/a").await.unwrap();

        // Refresh re-delivers A (new surrogate row) plus a fresh C
        db.commit_page(
            true,
            &[
                test_article("https://e.com/a", "A again", 10),
                test_article("https://e.com/c", "C", 11),
            ],
        )
        .await
        .unwrap();

        let a = db.get_by_url("https://e.com/a").await.unwrap().unwrap();
        let c = db.get_by_url("https://e.com/c").await.unwrap().unwrap();
        assert!(a.is_liked, "liked state must survive the wipe");
        assert!(!c.is_liked);
    }

    #[tokio::test]
    async fn test_duplicate_urls_allowed() {
        let db = test_db().await;
        db.commit_page(
            false,
            &[
                test_article("https://e.com/dup", "First", 1),
                test_article("https://e.com/dup", "Second", 2),
            ],
        )
        .await
        .unwrap();

        assert_eq!(db.count_articles().await.unwrap(), 2);
        // Lowest id wins for the single-by-url read
        let first = db.get_by_url("https://e.com/dup").await.unwrap().unwrap();
        assert_eq!(first.title, "First");
    }

    #[tokio::test]
    async fn test_mark_viewed_idempotent_last_write_wins() {
        let db = test_db().await;
        db.commit_page(false, &[test_article("https://e.com/a", "A", 1)])
            .await
            .unwrap();

        assert_eq!(db.mark_viewed("https://e.com/a").await.unwrap(), 1);
        let first = db.get_by_url("https://e.com/a").await.unwrap().unwrap();
        assert!(first.is_viewed);
        let first_ts = first.viewed_at.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert_eq!(db.mark_viewed("https://e.com/a").await.unwrap(), 1);
        let second = db.get_by_url("https://e.com/a").await.unwrap().unwrap();
        assert!(second.is_viewed);
        assert!(second.viewed_at.unwrap() >= first_ts);
    }

    #[tokio::test]
    async fn test_mark_viewed_touches_all_duplicates() {
        let db = test_db().await;
        db.commit_page(
            false,
            &[
                test_article("https://e.com/dup", "First", 1),
                test_article("https://e.com/dup", "Second", 2),
            ],
        )
        .await
        .unwrap();

        assert_eq!(db.mark_viewed("https://e.com/dup").await.unwrap(), 2);
        let history = db.viewed_history(10).await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_liked_twice_restores() {
        let db = test_db().await;
        db.commit_page(false, &[test_article("https://e.com/a", "A", 1)])
            .await
            .unwrap();

        assert_eq!(db.toggle_liked("https://e.com/a").await.unwrap(), Some(true));
        assert_eq!(db.toggle_liked("https://e.com/a").await.unwrap(), Some(false));

        let record = db.get_by_url("https://e.com/a").await.unwrap().unwrap();
        assert!(!record.is_liked);
    }

    #[tokio::test]
    async fn test_toggle_liked_unknown_url() {
        let db = test_db().await;
        assert_eq!(db.toggle_liked("https://e.com/nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_liked_view_ordering() {
        let db = test_db().await;
        db.commit_page(
            false,
            &[
                test_article("https://e.com/a", "A", 1),
                test_article("https://e.com/b", "B", 2),
                test_article("https://e.com/c", "C", 3),
            ],
        )
        .await
        .unwrap();
        db.toggle_liked("https://e.com/a").await.unwrap();
        db.toggle_liked("https://e.com/c").await.unwrap();

        let liked = db.liked_articles(10).await.unwrap();
        let urls: Vec<_> = liked.iter().map(|r| r.url.as_str()).collect();
        // Newest insertion first
        assert_eq!(urls, vec!["https://e.com/c", "https://e.com/a"]);
    }

    #[tokio::test]
    async fn test_gallery_images_persist_through_store() {
        let db = test_db().await;
        let mut row = test_article("https://e.com/g", "Gallery", 1);
        row.layout_kind = LayoutKind::Gallery;
        row.gallery_images = vec![
            "https://img.example.com/crop?rect=0,0,400,300".to_string(),
            "https://img.example.com/b.jpg".to_string(),
            "https://img.example.com/c.jpg".to_string(),
        ];
        db.commit_page(false, std::slice::from_ref(&row)).await.unwrap();

        let stored = db.get_by_url("https://e.com/g").await.unwrap().unwrap();
        assert_eq!(stored.layout_kind, LayoutKind::Gallery);
        assert_eq!(stored.gallery_images, row.gallery_images);
    }

    #[tokio::test]
    async fn test_max_inserted_at_tracks_tail() {
        let db = test_db().await;
        assert_eq!(db.max_inserted_at().await.unwrap(), None);

        db.commit_page(
            false,
            &[
                test_article("https://e.com/a", "A", 100),
                test_article("https://e.com/b", "B", 250),
            ],
        )
        .await
        .unwrap();
        assert_eq!(db.max_inserted_at().await.unwrap(), Some(250));
    }

    #[tokio::test]
    async fn test_feed_window_offset() {
        let db = test_db().await;
        let rows: Vec<_> = (0..25)
            .map(|i| test_article(&format!("https://e.com/{}", i), &format!("A{}", i), i))
            .collect();
        db.commit_page(false, &rows).await.unwrap();

        let window = db.feed_window(10, 20).await.unwrap();
        assert_eq!(window.len(), 5);
        assert_eq!(window[0].inserted_at, 20);
    }

    #[tokio::test]
    async fn test_clear_articles() {
        let db = test_db().await;
        db.commit_page(false, &[test_article("https://e.com/a", "A", 1)])
            .await
            .unwrap();
        assert_eq!(db.clear_articles().await.unwrap(), 1);
        assert_eq!(db.count_articles().await.unwrap(), 0);
    }
}
