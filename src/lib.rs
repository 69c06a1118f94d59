//! Cache-first news reading core.
//!
//! Articles live in a local SQLite table that the UI reads exclusively; the
//! network is only ever used to extend or refresh that cache, one page at a
//! time. [`reader::NewsReader`] is the entry point: it owns the active
//! [`feed::PagedFeed`] for the current channel or search query and exposes
//! the read-status and channel-selection operations around it.

pub mod channel;
pub mod config;
pub mod feed;
pub mod reader;
pub mod remote;
pub mod storage;
pub mod sync;

pub use reader::NewsReader;
