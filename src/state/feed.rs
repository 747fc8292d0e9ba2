//! Pagination controller for the photo feed
//!
//! `FeedState` owns everything the screen shows: the displayed list, the
//! fetch record, the refreshing flag and the page cursor. It performs no
//! I/O itself. Operations that need the network hand back a `FetchRequest`
//! and the caller feeds the outcome back through `FeedState::apply`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::data::Item;
use crate::error::FetchError;

/// Default exclusive upper bound for the page cursor (pages 1..=4)
pub const DEFAULT_MAX_PAGE_EXCLUSIVE: u32 = 5;

/// Lifecycle of the most recent page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    NotStarted,
    Loading,
    Success,
    Failed,
}

/// Status of the last request plus every raw page received since the last
/// failure, kept apart from the displayed list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchRecord {
    pub status: FetchStatus,
    pub error_message: String,
    pub data: Vec<Item>,
}

/// A page request the caller must perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub page: u32,
    pub generation: u64,
}

/// Outcome of a `FetchRequest`, fed back into `FeedState::apply`
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub request: FetchRequest,
    pub result: Result<Vec<Item>, FetchError>,
}

/// What `apply` did with a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Page merged into the displayed list; `added` excludes duplicate ids
    Page { page: u32, added: usize },
    /// Request failed; displayed list untouched
    Failed,
    /// Response belonged to a superseded request and was dropped
    Stale,
}

/// Consolidated screen state, transitioned once per event
#[derive(Debug, Clone)]
pub struct FeedState {
    items: Vec<Item>,
    record: FetchRecord,
    refreshing: bool,
    cursor: u32,
    max_page_exclusive: u32,
    generation: u64,
    in_flight: Option<FetchRequest>,
    last_updated: Option<DateTime<Utc>>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAGE_EXCLUSIVE)
    }
}

impl FeedState {
    /// Create an empty feed whose cursor stays below `max_page_exclusive`
    pub fn new(max_page_exclusive: u32) -> Self {
        Self {
            items: Vec::new(),
            record: FetchRecord::default(),
            refreshing: false,
            cursor: 1,
            max_page_exclusive,
            generation: 0,
            in_flight: None,
            last_updated: None,
        }
    }

    /// The displayed list
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn record(&self) -> &FetchRecord {
        &self.record
    }

    pub fn status(&self) -> FetchStatus {
        self.record.status
    }

    pub fn error_message(&self) -> &str {
        &self.record.error_message
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// True while a page request is awaited
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<FetchRequest> {
        self.in_flight
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Start loading `page`
    ///
    /// Returns `None` when another request is still in flight or the page
    /// number is zero.
    pub fn load(&mut self, page: u32) -> Option<FetchRequest> {
        if page == 0 {
            warn!("Ignoring load of page 0");
            return None;
        }
        if let Some(pending) = self.in_flight {
            debug!(page, pending = pending.page, "Load ignored, request already in flight");
            return None;
        }
        Some(self.begin(page))
    }

    /// Advance the cursor and load the next page, if one remains
    pub fn load_more(&mut self) -> Option<FetchRequest> {
        let next = self.cursor + 1;
        if next >= self.max_page_exclusive {
            debug!(cursor = self.cursor, "No more pages to load");
            return None;
        }
        if self.in_flight.is_some() {
            debug!(next, "Load more ignored, request already in flight");
            return None;
        }
        self.cursor = next;
        self.load(next)
    }

    /// Reset to page 1 and reload it, superseding any in-flight request
    pub fn refresh(&mut self) -> FetchRequest {
        if let Some(pending) = self.in_flight {
            debug!(page = pending.page, "Refresh supersedes in-flight request");
        }
        self.cursor = 1;
        self.refreshing = true;
        self.begin(1)
    }

    fn begin(&mut self, page: u32) -> FetchRequest {
        self.generation += 1;
        let request = FetchRequest {
            page,
            generation: self.generation,
        };
        self.record.status = FetchStatus::Loading;
        self.in_flight = Some(request);
        info!(page, generation = request.generation, "Requesting page");
        request
    }

    /// Merge the outcome of a request into the state
    pub fn apply(&mut self, response: FetchResponse) -> Applied {
        let FetchResponse { request, result } = response;

        if self.in_flight != Some(request) {
            debug!(
                page = request.page,
                generation = request.generation,
                current = self.generation,
                "Dropping stale response"
            );
            return Applied::Stale;
        }
        self.in_flight = None;
        self.refreshing = false;

        match result {
            Ok(page_items) => {
                if request.page == 1 {
                    self.items.clear();
                }
                let mut seen: HashSet<String> =
                    self.items.iter().map(|item| item.id.clone()).collect();

                let mut added = 0;
                for item in &page_items {
                    if seen.insert(item.id.clone()) {
                        self.items.push(item.clone());
                        added += 1;
                    } else {
                        warn!(id = %item.id, "Skipping duplicate item");
                    }
                }

                self.record.data.extend(page_items);
                self.record.status = FetchStatus::Success;
                self.record.error_message.clear();
                self.last_updated = Some(Utc::now());

                info!(page = request.page, added, total = self.items.len(), "Page applied");
                Applied::Page {
                    page: request.page,
                    added,
                }
            }
            Err(err) => {
                warn!(page = request.page, error = %err, "Page request failed");
                self.record = FetchRecord {
                    status: FetchStatus::Failed,
                    error_message: err.to_string(),
                    data: Vec::new(),
                };
                Applied::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32) -> Item {
        Item {
            id: id.to_string(),
            author: format!("Author {}", id),
            width: 100,
            height: 50,
            url: format!("https://unsplash.com/photos/{}", id),
            download_url: format!("https://picsum.photos/id/{}/100/50", id),
        }
    }

    /// Ten items with ids for the given page ("1".."10" for page 1)
    fn page_items(page: u32) -> Vec<Item> {
        let start = (page - 1) * 10 + 1;
        (start..start + 10).map(item).collect()
    }

    fn succeed(feed: &mut FeedState, request: FetchRequest) -> Applied {
        feed.apply(FetchResponse {
            request,
            result: Ok(page_items(request.page)),
        })
    }

    fn ids(feed: &FeedState) -> Vec<String> {
        feed.items().iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_initial_state() {
        let feed = FeedState::default();
        assert_eq!(feed.status(), FetchStatus::NotStarted);
        assert_eq!(feed.cursor(), 1);
        assert!(feed.items().is_empty());
        assert!(!feed.is_loading());
        assert!(feed.last_updated().is_none());
    }

    #[test]
    fn test_load_sets_loading() {
        let mut feed = FeedState::default();
        let request = feed.load(1).unwrap();

        assert_eq!(request.page, 1);
        assert_eq!(feed.status(), FetchStatus::Loading);
        assert!(feed.is_loading());
    }

    #[test]
    fn test_load_then_load_more_appends_in_order() {
        let mut feed = FeedState::default();

        let first = feed.load(1).unwrap();
        assert_eq!(succeed(&mut feed, first), Applied::Page { page: 1, added: 10 });
        assert_eq!(feed.items().len(), 10);
        assert_eq!(feed.status(), FetchStatus::Success);

        let second = feed.load_more().unwrap();
        assert_eq!(second.page, 2);
        succeed(&mut feed, second);

        let expected: Vec<String> = (1..=20).map(|i| i.to_string()).collect();
        assert_eq!(ids(&feed), expected);
        assert!(feed.error_message().is_empty());
        assert!(feed.last_updated().is_some());
    }

    #[test]
    fn test_load_more_stops_at_page_four() {
        let mut feed = FeedState::default();
        let first = feed.refresh();
        succeed(&mut feed, first);

        for expected_page in 2..=4 {
            let request = feed.load_more().unwrap();
            assert_eq!(request.page, expected_page);
            succeed(&mut feed, request);
        }
        assert_eq!(feed.cursor(), 4);
        assert_eq!(feed.items().len(), 40);

        assert!(feed.load_more().is_none());
        assert_eq!(feed.cursor(), 4);
        assert_eq!(feed.items().len(), 40);
        assert!(!feed.is_loading());
    }

    #[test]
    fn test_length_tracks_pages_loaded() {
        let mut feed = FeedState::default();
        let first = feed.refresh();
        succeed(&mut feed, first);

        for pages in 2..=4 {
            let request = feed.load_more().unwrap();
            succeed(&mut feed, request);
            assert_eq!(feed.items().len(), 10 * pages as usize);
        }
    }

    #[test]
    fn test_refresh_replaces_list_with_page_one() {
        let mut feed = FeedState::default();
        let first = feed.load(1).unwrap();
        succeed(&mut feed, first);
        let second = feed.load_more().unwrap();
        succeed(&mut feed, second);
        assert_eq!(feed.cursor(), 2);

        let request = feed.refresh();
        assert_eq!(request.page, 1);
        assert_eq!(feed.cursor(), 1);
        assert!(feed.is_refreshing());

        succeed(&mut feed, request);

        let expected: Vec<String> = (1..=10).map(|i| i.to_string()).collect();
        assert_eq!(ids(&feed), expected);
        assert!(!feed.is_refreshing());
    }

    #[test]
    fn test_failed_initial_load_leaves_list_empty() {
        let mut feed = FeedState::default();
        let request = feed.load(1).unwrap();

        let applied = feed.apply(FetchResponse {
            request,
            result: Err(FetchError::Request("network unreachable".to_string())),
        });

        assert_eq!(applied, Applied::Failed);
        assert_eq!(feed.status(), FetchStatus::Failed);
        assert!(!feed.error_message().is_empty());
        assert!(feed.items().is_empty());
        assert!(!feed.is_loading());
    }

    #[test]
    fn test_failure_does_not_touch_displayed_list() {
        let mut feed = FeedState::default();
        let first = feed.load(1).unwrap();
        succeed(&mut feed, first);
        let before = feed.items().to_vec();

        let request = feed.load_more().unwrap();
        feed.apply(FetchResponse {
            request,
            result: Err(FetchError::Decode("expected value".to_string())),
        });

        assert_eq!(feed.items(), before.as_slice());
        assert_eq!(feed.status(), FetchStatus::Failed);
        assert!(feed.record().data.is_empty());
    }

    #[test]
    fn test_recovers_after_failure() {
        let mut feed = FeedState::default();
        let request = feed.load(1).unwrap();
        feed.apply(FetchResponse {
            request,
            result: Err(FetchError::Status(500)),
        });

        let retry = feed.refresh();
        succeed(&mut feed, retry);

        assert_eq!(feed.status(), FetchStatus::Success);
        assert!(feed.error_message().is_empty());
        assert_eq!(feed.items().len(), 10);
    }

    #[test]
    fn test_reentrant_triggers_are_ignored() {
        let mut feed = FeedState::default();
        let first = feed.load(1).unwrap();
        succeed(&mut feed, first);

        let pending = feed.load_more().unwrap();
        assert!(feed.load_more().is_none());
        assert!(feed.load(1).is_none());
        assert_eq!(feed.cursor(), 2);

        succeed(&mut feed, pending);
        assert_eq!(feed.items().len(), 20);
    }

    #[test]
    fn test_refresh_discards_superseded_response() {
        let mut feed = FeedState::default();
        let first = feed.load(1).unwrap();
        succeed(&mut feed, first);

        let stale = feed.load_more().unwrap();
        let fresh = feed.refresh();

        assert_eq!(succeed(&mut feed, stale), Applied::Stale);
        assert!(feed.is_loading());
        assert_eq!(feed.items().len(), 10);

        assert_eq!(succeed(&mut feed, fresh), Applied::Page { page: 1, added: 10 });
        assert_eq!(feed.items().len(), 10);
        assert_eq!(feed.cursor(), 1);
    }

    #[test]
    fn test_duplicate_ids_are_dropped_on_append() {
        let mut feed = FeedState::default();
        let first = feed.load(1).unwrap();
        succeed(&mut feed, first);

        let request = feed.load_more().unwrap();
        let mut overlapping = page_items(2);
        overlapping[0] = item(10);

        let applied = feed.apply(FetchResponse {
            request,
            result: Ok(overlapping),
        });

        assert_eq!(applied, Applied::Page { page: 2, added: 9 });
        assert_eq!(feed.items().len(), 19);
    }

    #[test]
    fn test_record_accumulates_raw_pages() {
        let mut feed = FeedState::default();
        let first = feed.load(1).unwrap();
        succeed(&mut feed, first);
        let second = feed.load_more().unwrap();
        succeed(&mut feed, second);

        assert_eq!(feed.record().data.len(), 20);
    }

    #[test]
    fn test_page_zero_is_rejected() {
        let mut feed = FeedState::default();
        assert!(feed.load(0).is_none());
        assert_eq!(feed.status(), FetchStatus::NotStarted);
    }

    #[test]
    fn test_custom_page_cap() {
        let mut feed = FeedState::new(3);
        let first = feed.load(1).unwrap();
        succeed(&mut feed, first);
        let second = feed.load_more().unwrap();
        succeed(&mut feed, second);

        assert!(feed.load_more().is_none());
        assert_eq!(feed.cursor(), 2);
    }
}
