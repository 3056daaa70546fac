use alloy::primitives::Address;

use crate::domain::activity::Activity;
use crate::ports::fetcher::{ActivityFetcher, ActivityPage, FetcherError, Order, PageInfo};

/// Fetcher over a fixed, pre-chunked activity history.
///
/// Cursors are page indices rendered as strings; the cursor returned for a
/// page addresses that page, and a request carrying it resumes at the next
/// one - the same opaque-cursor protocol a GraphQL indexer client speaks.
/// Used by the integration scenarios and for replaying recorded histories.
#[derive(Debug, Clone, Default)]
pub struct StaticActivityFetcher {
    pages: Vec<Vec<Activity>>,
}

impl StaticActivityFetcher {
    pub fn new(pages: Vec<Vec<Activity>>) -> Self {
        Self { pages }
    }

    /// Re-chunk a flat ascending history into pages of `page_size`.
    pub fn from_history(history: Vec<Activity>, page_size: usize) -> Self {
        let pages = history
            .chunks(page_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect();
        Self { pages }
    }
}

impl ActivityFetcher for StaticActivityFetcher {
    async fn fetch_activities(
        &self,
        _pool: Address,
        _limit: usize,
        cursor: Option<&str>,
        order: Order,
    ) -> Result<ActivityPage, FetcherError> {
        if order == Order::Descending {
            return Err(FetcherError::Transport(
                "descending order not supported".to_string(),
            ));
        }

        let next = match cursor {
            None => 0,
            Some(raw) => {
                raw.parse::<usize>()
                    .map_err(|_| FetcherError::Transport(format!("unknown cursor {raw:?}")))?
                    + 1
            }
        };

        if next >= self.pages.len() {
            // Resumed past the recorded history: an empty terminal page that
            // leaves the caller's cursor untouched.
            return Ok(ActivityPage {
                items: Vec::new(),
                page_info: PageInfo {
                    has_next_page: false,
                    end_cursor: cursor.map(str::to_string),
                },
            });
        }

        Ok(ActivityPage {
            items: self.pages[next].clone(),
            page_info: PageInfo {
                has_next_page: next + 1 < self.pages.len(),
                end_cursor: Some(next.to_string()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::activity::DepositActivity;

    fn deposit(precommitment: &str, block: u64) -> Activity {
        Activity::Deposit(DepositActivity {
            precommitment_hash: precommitment.to_string(),
            amount: Some("1000".to_string()),
            label: Some("7".to_string()),
            origin_transaction_hash: "0xdead".to_string(),
            destination_transaction_hash: None,
            origin_chain_id: 1,
            destination_chain_id: None,
            block_number: block,
            timestamp: block,
        })
    }

    #[tokio::test]
    async fn test_pagination_walks_all_pages() {
        let fetcher = StaticActivityFetcher::new(vec![
            vec![deposit("1", 1)],
            vec![deposit("2", 2)],
            vec![deposit("3", 3)],
        ]);

        let mut cursor: Option<String> = None;
        let mut seen = Vec::new();
        loop {
            let page = fetcher
                .fetch_activities(Address::ZERO, 10, cursor.as_deref(), Order::Ascending)
                .await
                .unwrap();
            seen.extend(page.items);
            cursor = page.page_info.end_cursor;
            if !page.page_info.has_next_page {
                break;
            }
        }

        assert_eq!(seen.len(), 3);
        assert_eq!(cursor.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_resume_past_end_is_empty() {
        let fetcher = StaticActivityFetcher::new(vec![vec![deposit("1", 1)]]);
        let page = fetcher
            .fetch_activities(Address::ZERO, 10, Some("0"), Order::Ascending)
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert!(!page.page_info.has_next_page);
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_from_history_chunks() {
        let fetcher = StaticActivityFetcher::from_history(
            vec![deposit("1", 1), deposit("2", 2), deposit("3", 3)],
            2,
        );
        let first = fetcher
            .fetch_activities(Address::ZERO, 2, None, Order::Ascending)
            .await
            .unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(first.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_bad_cursor_rejected() {
        let fetcher = StaticActivityFetcher::new(vec![vec![deposit("1", 1)]]);
        let result = fetcher
            .fetch_activities(Address::ZERO, 10, Some("nope"), Order::Ascending)
            .await;
        assert!(matches!(result, Err(FetcherError::Transport(_))));
    }
}
