use std::future::Future;

use alloy::primitives::Address;
use thiserror::Error;

use crate::domain::activity::Activity;

/// Requested delivery order of an activity page.
///
/// Discovery always asks for ascending block order; descending exists for
/// host applications that want "latest activity" views over the same port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    /// Opaque cursor addressing the position after this page.
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityPage {
    pub items: Vec<Activity>,
    pub page_info: PageInfo,
}

#[derive(Debug, Error)]
pub enum FetcherError {
    #[error("activity fetch failed: {0}")]
    Transport(String),

    #[error("malformed activity payload: {0}")]
    Decode(String),
}

/// Port for the indexer's paginated activity stream.
///
/// Items must arrive in ascending block order within and across pages; the
/// cursor is opaque to the engine and round-trips through checkpoints.
///
/// Implementations:
/// - `StaticActivityFetcher` (canned pages, for tests and replay)
/// - a GraphQL indexer client in the host application
pub trait ActivityFetcher: Send + Sync {
    fn fetch_activities(
        &self,
        pool: Address,
        limit: usize,
        cursor: Option<&str>,
        order: Order,
    ) -> impl Future<Output = Result<ActivityPage, FetcherError>> + Send;
}
