//! Paginated Lists
//!
//! Cursor-based fetch-and-append controller shared by list views.
//!
//! # Cursor rules
//!
//! - `reset(filter)` puts the cursor back to offset 0 and drops accumulated
//!   records before fetching the first page
//! - a page is appended (or replaces the records when it was fetched at
//!   offset 0) and the cursor advances by one page size, unless the page was
//!   empty
//! - a page shorter than the page size ends the list
//!
//! # Concurrency
//!
//! Methods take `&self` so a surface can fire them from independent tasks.
//! At most one fetch per list generation is outstanding: a second
//! [`PaginatedList::load_next`] while one is in flight returns
//! [`LoadOutcome::Skipped`] without touching the network. A `reset` starts a
//! new generation; pages still arriving for the old one are dropped.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::ApiError;

/// Parameters of one page fetch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery<F> {
    /// Active filter
    pub filter: F,
    /// Records to skip
    pub offset: usize,
    /// Records per page
    pub page_size: usize,
}

impl<F> ListQuery<F> {
    /// First page for a filter
    pub fn new(filter: F, page_size: usize) -> Self {
        Self {
            filter,
            offset: 0,
            page_size,
        }
    }
}

/// One fetched batch
#[derive(Clone, Debug)]
pub struct ListPage<T> {
    /// Records in server order
    pub records: Vec<T>,
    /// Page size that was requested
    pub page_size: usize,
}

impl<T> ListPage<T> {
    /// Whether this page ends the list
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.records.len() < self.page_size
    }
}

/// Where list pages come from
#[async_trait]
pub trait PageSource<F, T>: Send + Sync {
    /// Fetch the records for `query`
    async fn fetch(&self, query: &ListQuery<F>) -> Result<Vec<T>, ApiError>;
}

/// Render status of a list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListStatus {
    /// Nothing requested yet
    Idle,
    /// A fetch is in flight
    Loading,
    /// Records available
    Ready,
    /// First page came back empty
    Empty,
    /// Last fetch failed; records from earlier pages are kept
    Failed(String),
}

/// Result of a load request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and applied
    Loaded {
        /// Records in the page
        received: usize,
        /// Whether another page may follow
        has_more: bool,
    },
    /// Another fetch for this list was already in flight
    Skipped,
    /// The list already ended; nothing fetched
    Exhausted,
    /// The list was reset while this fetch was in flight; page dropped
    Stale,
}

struct ListState<F, T> {
    query: ListQuery<F>,
    records: Vec<T>,
    has_more: bool,
    status: ListStatus,
    generation: u64,
    in_flight: Option<u64>,
}

/// Cursor-based paginated list
pub struct PaginatedList<F, T> {
    source: Arc<dyn PageSource<F, T>>,
    state: Mutex<ListState<F, T>>,
}

impl<F, T> PaginatedList<F, T>
where
    F: Clone + Send + Sync,
    T: Clone + Send,
{
    /// Create an idle list
    pub fn new(source: Arc<dyn PageSource<F, T>>, filter: F, page_size: usize) -> Self {
        Self {
            source,
            state: Mutex::new(ListState {
                query: ListQuery::new(filter, page_size.max(1)),
                records: Vec::new(),
                has_more: false,
                status: ListStatus::Idle,
                generation: 0,
                in_flight: None,
            }),
        }
    }

    /// Start over with `filter` and fetch the first page
    ///
    /// # Errors
    ///
    /// Returns the API error if the first page could not be fetched.
    pub async fn reset(&self, filter: F) -> Result<LoadOutcome, ApiError> {
        {
            let mut state = self.state.lock();
            state.query.filter = filter;
            state.query.offset = 0;
            state.records.clear();
            state.has_more = false;
            state.status = ListStatus::Idle;
            state.generation += 1;
        }
        self.load_next().await
    }

    /// Fetch the page at the current cursor
    ///
    /// # Errors
    ///
    /// Returns the API error if the fetch failed. Accumulated records are kept
    /// and the status becomes [`ListStatus::Failed`].
    pub async fn load_next(&self) -> Result<LoadOutcome, ApiError> {
        let (query, generation) = {
            let mut state = self.state.lock();
            if state.in_flight == Some(state.generation) {
                tracing::debug!(offset = state.query.offset, "Fetch already in flight, skipping");
                return Ok(LoadOutcome::Skipped);
            }
            if matches!(state.status, ListStatus::Ready | ListStatus::Empty) && !state.has_more {
                return Ok(LoadOutcome::Exhausted);
            }
            state.in_flight = Some(state.generation);
            state.status = ListStatus::Loading;
            (state.query.clone(), state.generation)
        };

        let result = self.source.fetch(&query).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            tracing::debug!(
                offset = query.offset,
                "List reset while fetching, dropping stale page"
            );
            return Ok(LoadOutcome::Stale);
        }
        state.in_flight = None;

        match result {
            Ok(records) => {
                let page = ListPage {
                    records,
                    page_size: query.page_size,
                };
                let received = page.records.len();
                let has_more = !page.is_last();

                if query.offset == 0 {
                    state.records = page.records;
                } else {
                    state.records.extend(page.records);
                }
                if received > 0 {
                    state.query.offset = query.offset + query.page_size;
                }
                state.has_more = has_more;
                state.status = if state.records.is_empty() {
                    ListStatus::Empty
                } else {
                    ListStatus::Ready
                };

                Ok(LoadOutcome::Loaded { received, has_more })
            }
            Err(e) => {
                tracing::warn!(offset = query.offset, "Failed to load page: {}", e);
                state.status = ListStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Accumulated records
    #[must_use]
    pub fn records(&self) -> Vec<T> {
        self.state.lock().records.clone()
    }

    /// Number of accumulated records
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    /// Whether no records are accumulated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().records.is_empty()
    }

    /// Whether another page may follow
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.state.lock().has_more
    }

    /// Current render status
    #[must_use]
    pub fn status(&self) -> ListStatus {
        self.state.lock().status.clone()
    }

    /// Query the next `load_next` would send
    #[must_use]
    pub fn query(&self) -> ListQuery<F> {
        self.state.lock().query.clone()
    }
}
