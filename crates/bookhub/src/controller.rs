//! Search State Controller
//!
//! Owns the [`SearchState`] of one browsing session and turns user intent into
//! fetches:
//!
//! - **Query edits** are debounced. A single pending timer is kept; every edit
//!   aborts it and starts a new one, so only the last value of a burst is
//!   committed and fetched.
//! - **Filter edits** are discrete and fetch immediately.
//! - **Page changes** are local slicing and never fetch.
//!
//! Fetches run as independent tasks. Each one is stamped with a sequence
//! number when it starts; a completion that is no longer the latest is
//! dropped, so overlapping requests cannot clobber newer results.
//!
//! Consumers read the state through [`SearchController::state`] or watch it
//! change through [`SearchController::subscribe`].

use std::sync::Arc;
use std::time::Duration;

use bookhub_core::state::DEFAULT_PAGE_SIZE;
use bookhub_core::{FetchRequest, FilterError, FilterPatch, SearchAction, SearchState};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::BookSource;

/// Quiet period after the last query edit before it is fetched
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub page_size: usize,
    pub debounce: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// State shared with the timer and fetch tasks
struct Shared {
    source: Arc<dyn BookSource>,
    state: watch::Sender<SearchState>,
}

impl Shared {
    /// Apply an action, notifying watchers only when something changed
    fn dispatch(&self, action: SearchAction) -> Result<bool, FilterError> {
        let mut result = Ok(false);
        self.state.send_if_modified(|state| {
            result = state.apply(action);
            matches!(result, Ok(true))
        });
        result
    }

    fn commit_query(self: &Arc<Self>, query: String) {
        if matches!(self.dispatch(SearchAction::SetQuery(query)), Ok(true)) {
            self.fetch();
        }
    }

    /// Start a fetch for the current query and filters
    fn fetch(self: &Arc<Self>) {
        let mut request = FetchRequest::default();
        self.state.send_modify(|state| {
            request = state.begin_fetch();
        });

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            log::debug!(
                "search #{} started: query={:?} filters={:?}",
                request.seq,
                request.query,
                request.filters
            );

            let outcome = shared
                .source
                .search(&request.query, &request.filters)
                .await;

            match &outcome {
                Ok(books) => log::debug!("search #{} found {} books", request.seq, books.len()),
                Err(err) => log::warn!("search #{} failed: {err}", request.seq),
            }

            let applied = shared.dispatch(SearchAction::FetchFinished {
                request: request.seq,
                outcome,
            });
            if !matches!(applied, Ok(true)) {
                log::debug!("search #{} superseded, response dropped", request.seq);
            }
        });
    }
}

pub struct SearchController {
    shared: Arc<Shared>,
    pending_query: Option<JoinHandle<()>>,
    debounce: Duration,
}

impl SearchController {
    /// Create a controller with an idle state. Call [`refresh`](Self::refresh)
    /// for the initial load.
    pub fn new(source: Arc<dyn BookSource>, settings: ControllerSettings) -> Self {
        let (state, _) = watch::channel(SearchState::new(settings.page_size));

        Self {
            shared: Arc::new(Shared { source, state }),
            pending_query: None,
            debounce: settings.debounce,
        }
    }

    /// Fetch again with the current query and filters
    pub fn refresh(&self) {
        self.shared.fetch();
    }

    /// Replace the free-text query once edits have been quiet for the
    /// debounce window
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.cancel_pending_query();

        let query = query.into();
        let shared = Arc::clone(&self.shared);
        let delay = self.debounce;
        self.pending_query = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.commit_query(query);
        }));
    }

    /// Replace the query right away, dropping any pending debounced edit
    pub fn submit_query(&mut self, query: impl Into<String>) {
        self.cancel_pending_query();
        self.shared.commit_query(query.into());
    }

    /// Empty the query right away
    pub fn clear_query(&mut self) {
        self.submit_query(String::new());
    }

    /// Commit a query and a filter change together and fetch once
    ///
    /// Used by one-shot searches where both are known up front. When the
    /// filters are rejected nothing is committed and a pending debounced edit
    /// keeps running.
    pub fn search(
        &mut self,
        query: impl Into<String>,
        patch: FilterPatch,
    ) -> Result<(), FilterError> {
        // Validate before dropping the pending edit.
        self.shared.state.borrow().filters().merged(&patch)?;
        self.cancel_pending_query();

        let query = query.into();
        let mut result = Ok(false);
        self.shared.state.send_if_modified(|state| {
            result = state
                .apply(SearchAction::UpdateFilters(patch))
                .and_then(|_| state.apply(SearchAction::SetQuery(query)));
            result.is_ok()
        });
        result?;

        self.shared.fetch();
        Ok(())
    }

    /// Whether a debounced query edit is still waiting to fire
    pub fn has_pending_query(&self) -> bool {
        self.pending_query
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Merge a partial filter change, go back to page 1 and fetch
    ///
    /// An edit that would break a filter invariant is rejected and nothing is
    /// fetched.
    pub fn update_filters(&self, patch: FilterPatch) -> Result<(), FilterError> {
        self.shared.dispatch(SearchAction::UpdateFilters(patch))?;
        self.shared.fetch();
        Ok(())
    }

    /// Reset every filter to its default, go back to page 1 and fetch
    pub fn clear_filters(&self) {
        // Clearing cannot break an invariant.
        let _ = self.shared.dispatch(SearchAction::ClearFilters);
        self.shared.fetch();
    }

    /// Move to `page`, clamped to the available pages. Returns the page shown.
    pub fn set_page(&self, page: usize) -> usize {
        let _ = self.shared.dispatch(SearchAction::SetPage(page));
        self.shared.state.borrow().current_page()
    }

    pub fn next_page(&self) -> usize {
        let current = self.shared.state.borrow().current_page();
        self.set_page(current + 1)
    }

    pub fn previous_page(&self) -> usize {
        let current = self.shared.state.borrow().current_page();
        self.set_page(current.saturating_sub(1))
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SearchState {
        self.shared.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state.subscribe()
    }

    fn cancel_pending_query(&mut self) {
        if let Some(handle) = self.pending_query.take() {
            handle.abort();
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.cancel_pending_query();
    }
}
