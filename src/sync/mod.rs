use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod mapper;
mod mediator;
pub(crate) mod mock;

pub use mapper::map_article;
pub use mediator::{LoadOutcome, LoadTrigger, SyncError, SyncMediator};

/// Records per page, fixed across the fetch, mock, and paging layers.
pub const PAGE_SIZE: u32 = 10;

/// Cooperative cancellation flag shared between a feed instance and its
/// mediator. Once cancelled it never resets; superseded feed instances are
/// discarded, not reused.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
