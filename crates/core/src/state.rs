//! Search state and its reducer
//!
//! `SearchState` is the aggregate root of a browsing session. Fields are only
//! reachable through [`SearchState::apply`], which keeps the page position
//! consistent with the query, the filters and the result set.
//!
//! Every fetch is stamped with a sequence number when it starts. A completion
//! carrying an older number is dropped, so the last user intent wins even
//! when responses arrive out of order.

use serde::Serialize;

use crate::book::BookRecord;
use crate::error::FetchError;
use crate::filters::{FilterError, FilterPatch, FilterSpec};
use crate::pagination::{clamp_page, paginate, total_pages, Page};

/// Results shown per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "phase", content = "error", rename_all = "snake_case")]
pub enum SearchPhase {
    /// Nothing fetched yet
    #[default]
    Idle,
    Loading,
    Ready,
    /// Last fetch failed; results were cleared
    Failed(FetchError),
}

/// Everything the fetch adapter needs for one search request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchRequest {
    pub seq: u64,
    pub query: String,
    pub filters: FilterSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchAction {
    SetQuery(String),
    UpdateFilters(FilterPatch),
    ClearFilters,
    SetPage(usize),
    FetchStarted,
    FetchFinished {
        request: u64,
        outcome: Result<Vec<BookRecord>, FetchError>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchState {
    query: String,
    filters: FilterSpec,
    phase: SearchPhase,
    results: Vec<BookRecord>,
    total_results: usize,
    current_page: usize,
    page_size: usize,
    #[serde(skip)]
    request_seq: u64,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// What a listing view should display
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<'a> {
    Idle,
    Loading,
    /// The last fetch failed; shown like an empty result but distinguishable
    Unavailable(&'a FetchError),
    /// The search matched nothing
    Empty,
    Results(Page<'a, BookRecord>),
}

impl SearchState {
    pub fn new(page_size: usize) -> Self {
        Self {
            query: String::new(),
            filters: FilterSpec::default(),
            phase: SearchPhase::Idle,
            results: Vec::new(),
            total_results: 0,
            current_page: 1,
            page_size: page_size.max(1),
            request_seq: 0,
        }
    }

    /// Apply one action. Returns whether anything changed.
    ///
    /// Only `UpdateFilters` can fail, when the merged filters break an
    /// invariant; the state is left untouched in that case.
    pub fn apply(&mut self, action: SearchAction) -> Result<bool, FilterError> {
        match action {
            SearchAction::SetQuery(query) => {
                if query == self.query {
                    return Ok(false);
                }
                self.query = query;
                self.current_page = 1;
                Ok(true)
            }
            SearchAction::UpdateFilters(patch) => {
                self.filters = self.filters.merged(&patch)?;
                self.current_page = 1;
                Ok(true)
            }
            SearchAction::ClearFilters => {
                self.filters = FilterSpec::default();
                self.current_page = 1;
                Ok(true)
            }
            SearchAction::SetPage(page) => {
                let page = clamp_page(page, self.total_pages());
                let changed = page != self.current_page;
                self.current_page = page;
                Ok(changed)
            }
            SearchAction::FetchStarted => {
                self.begin_fetch();
                Ok(true)
            }
            SearchAction::FetchFinished { request, outcome } => {
                if request != self.request_seq {
                    return Ok(false);
                }
                match outcome {
                    Ok(books) => {
                        self.total_results = books.len();
                        self.results = books;
                        self.phase = SearchPhase::Ready;
                    }
                    Err(err) => {
                        self.results.clear();
                        self.total_results = 0;
                        self.phase = SearchPhase::Failed(err);
                    }
                }
                self.current_page = 1;
                Ok(true)
            }
        }
    }

    /// Start a fetch and return the request it should carry
    ///
    /// Equivalent to applying `SearchAction::FetchStarted`, which cannot fail.
    pub fn begin_fetch(&mut self) -> FetchRequest {
        self.request_seq += 1;
        self.phase = SearchPhase::Loading;
        self.fetch_request()
    }

    /// Snapshot of the latest started request
    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest {
            seq: self.request_seq,
            query: self.query.clone(),
            filters: self.filters.clone(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn phase(&self) -> &SearchPhase {
        &self.phase
    }

    pub fn results(&self) -> &[BookRecord] {
        &self.results
    }

    pub fn total_results(&self) -> usize {
        self.total_results
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn request_seq(&self) -> u64 {
        self.request_seq
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_results, self.page_size)
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Loading
    }

    /// Not loading and at least one fetch has completed
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, SearchPhase::Ready | SearchPhase::Failed(_))
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        match &self.phase {
            SearchPhase::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Current page of results
    pub fn page(&self) -> Page<'_, BookRecord> {
        paginate(&self.results, self.current_page, self.page_size)
    }

    pub fn listing(&self) -> Listing<'_> {
        match &self.phase {
            SearchPhase::Idle => Listing::Idle,
            SearchPhase::Loading => Listing::Loading,
            SearchPhase::Failed(err) => Listing::Unavailable(err),
            SearchPhase::Ready if self.total_results == 0 => Listing::Empty,
            SearchPhase::Ready => Listing::Results(self.page()),
        }
    }
}
