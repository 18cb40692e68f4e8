// Infinite-scroll feed over the aggregator
//
// Pages of 10. A load that starts while another is in flight is dropped
// rather than queued, so scrolling fast never fires duplicate requests.

use crate::core::aggregator::Aggregator;
use crate::core::recipe::Recipe;
use crate::intelligence::QueryInterpretation;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub const FEED_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived with this many recipes
    Loaded(usize),
    /// Another load was already running
    Suppressed,
    /// Nothing more to load
    Exhausted,
}

#[derive(Debug, Default)]
struct FeedState {
    page: u32,
    results: Vec<Recipe>,
    insight: Option<QueryInterpretation>,
    exhausted: bool,
}

pub struct Feed {
    aggregator: Arc<Aggregator>,
    query: String,
    busy: AtomicBool,
    state: Mutex<FeedState>,
}

// Clears the busy flag however the load ends
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Feed {
    pub fn new(aggregator: Arc<Aggregator>, query: impl Into<String>) -> Self {
        Self {
            aggregator,
            query: query.into(),
            busy: AtomicBool::new(false),
            state: Mutex::new(FeedState::default()),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Fetch the next page
    ///
    /// The first page replaces the results and records the insight. Later
    /// pages append. An empty page, or one whose offset doesn't match the
    /// one asked for (fixtures were mixed in), ends the feed.
    pub async fn load_next(&self) -> LoadOutcome {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(query = %self.query, "Feed load already in flight");
            return LoadOutcome::Suppressed;
        }
        let _busy = BusyGuard(&self.busy);

        let mut state = self.state.lock().await;
        if state.exhausted {
            return LoadOutcome::Exhausted;
        }

        let offset = state.page * FEED_PAGE_SIZE;
        let page = self.aggregator.search(&self.query, offset).await;

        if page.results.is_empty() || page.offset != offset {
            debug!(offset, echoed = page.offset, "Feed exhausted");
            state.exhausted = true;
            return LoadOutcome::Exhausted;
        }

        let count = page.results.len();
        if state.page == 0 {
            state.results = page.results;
            state.insight = page.insight;
        } else {
            state.results.extend(page.results);
        }
        state.page += 1;

        LoadOutcome::Loaded(count)
    }

    pub fn is_loading(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub async fn results(&self) -> Vec<Recipe> {
        self.state.lock().await.results.clone()
    }

    pub async fn insight(&self) -> Option<QueryInterpretation> {
        self.state.lock().await.insight.clone()
    }

    pub async fn is_exhausted(&self) -> bool {
        self.state.lock().await.exhausted
    }

    /// Pages loaded so far
    pub async fn pages(&self) -> u32 {
        self.state.lock().await.page
    }
}
