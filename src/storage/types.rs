use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Database-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another process has locked the database
    #[error("Another instance of newswire appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let error_string = err.to_string().to_lowercase();

        // SQLITE_BUSY (5): database is locked
        // SQLITE_LOCKED (6): database table is locked
        // SQLITE_CANTOPEN (14): unable to open database file
        if error_string.contains("database is locked")
            || error_string.contains("database table is locked")
            || error_string.contains("sqlite_busy")
            || error_string.contains("sqlite_locked")
            || error_string.contains("unable to open database file")
        {
            return DatabaseError::InstanceLocked;
        }

        DatabaseError::Other(err)
    }
}

// ============================================================================
// Layout Kinds
// ============================================================================

/// Presentation-variant tag assigned per record at mapping time.
///
/// Independent of article content; exists purely so card rendering can vary.
/// `HotRank` is forced on every row of the trending channel, overriding the
/// mapper's random draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Standard,
    Gallery,
    TextOnly,
    HotRank,
}

impl LayoutKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutKind::Standard => "standard",
            LayoutKind::Gallery => "gallery",
            LayoutKind::TextOnly => "text_only",
            LayoutKind::HotRank => "hot_rank",
        }
    }

    /// Parse a stored column value. Unknown values degrade to `Standard`
    /// rather than failing the whole row read.
    pub fn from_column(value: &str) -> Self {
        match value {
            "gallery" => LayoutKind::Gallery,
            "text_only" => LayoutKind::TextOnly,
            "hot_rank" => LayoutKind::HotRank,
            _ => LayoutKind::Standard,
        }
    }
}

// ============================================================================
// Gallery Image Codec
// ============================================================================

/// Encode a gallery image list for the TEXT column.
///
/// JSON array rather than a delimited join, so urls containing commas (or any
/// other character) round-trip intact. An empty list encodes as the empty
/// string, and the empty string decodes back to an empty list.
pub(crate) fn encode_gallery(images: &[String]) -> String {
    if images.is_empty() {
        return String::new();
    }
    // Serializing a Vec<String> cannot fail.
    serde_json::to_string(images).unwrap_or_default()
}

/// Decode a gallery image column. Malformed values yield an empty list.
pub(crate) fn decode_gallery(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    serde_json::from_str(value).unwrap_or_default()
}

// ============================================================================
// Data Structures
// ============================================================================

/// A mapped article ready for insertion. Produced by the mapper, consumed by
/// the page-commit transaction. `inserted_at` is assigned by the mediator as
/// batch base time + position so ordering is strict and collision-free.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<String>,
    pub source_name: Option<String>,
    pub source_origin: Option<String>,
    pub layout_kind: LayoutKind,
    pub gallery_images: Vec<String>,
    pub is_liked: bool,
    pub inserted_at: i64,
}

/// A persisted article row.
///
/// `url` is deliberately not unique: the same remote article may reappear
/// across synthetic pages of the endless feed under a fresh surrogate `id`.
#[derive(Debug, Clone)]
pub struct ArticleRecord {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<String>,
    pub source_name: Option<String>,
    pub source_origin: Option<String>,
    pub layout_kind: LayoutKind,
    pub gallery_images: Vec<String>,
    pub is_viewed: bool,
    pub viewed_at: Option<i64>,
    pub is_liked: bool,
    pub inserted_at: i64,
}

/// Internal row type for article queries (used by sqlx FromRow).
/// Converts to ArticleRecord via into_record().
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ArticleDbRow {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<String>,
    pub source_name: Option<String>,
    pub source_origin: Option<String>,
    pub layout_kind: String,
    pub gallery_images: String,
    pub is_viewed: bool,
    pub viewed_at: Option<i64>,
    pub is_liked: bool,
    pub inserted_at: i64,
}

impl ArticleDbRow {
    pub(crate) fn into_record(self) -> ArticleRecord {
        ArticleRecord {
            id: self.id,
            url: self.url,
            title: self.title,
            description: self.description,
            body: self.body,
            image_url: self.image_url,
            published_at: self.published_at,
            source_name: self.source_name,
            source_origin: self.source_origin,
            layout_kind: LayoutKind::from_column(&self.layout_kind),
            gallery_images: decode_gallery(&self.gallery_images),
            is_viewed: self.is_viewed,
            viewed_at: self.viewed_at,
            is_liked: self.is_liked,
            inserted_at: self.inserted_at,
        }
    }
}
