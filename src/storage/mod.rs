mod articles;
mod channels;
mod preferences;
mod schema;
mod types;

pub use schema::Database;
pub use types::{ArticleRecord, DatabaseError, LayoutKind, NewArticle};
