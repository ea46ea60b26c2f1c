//! Detail loader
//!
//! Fetches a single record whenever the selection changes. Only the latest
//! selection may write the state; a superseded lookup is aborted and, if it
//! still lands, ignored.

use std::sync::Arc;

use bookhub_core::detail::DetailState;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::BookSource;

pub struct DetailLoader {
    source: Arc<dyn BookSource>,
    state: Arc<watch::Sender<DetailState>>,
    in_flight: Option<JoinHandle<()>>,
}

impl DetailLoader {
    pub fn new(source: Arc<dyn BookSource>) -> Self {
        let (state, _) = watch::channel(DetailState::default());

        Self {
            source,
            state: Arc::new(state),
            in_flight: None,
        }
    }

    /// Select a record, or clear the selection with `None`
    ///
    /// Clearing never touches the network.
    pub fn select(&mut self, id: Option<u64>) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }

        let mut request = None;
        self.state.send_modify(|state| {
            request = state.select(id);
        });
        let Some(request) = request else {
            return;
        };

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = source.book(request.id).await;
            if let Err(err) = &outcome {
                log::warn!("loading book {} failed: {err}", request.id);
            }

            let applied = state.send_if_modified(|state| state.finish(request.seq, outcome));
            if !applied {
                log::debug!("book {} no longer selected, response dropped", request.id);
            }
        }));
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }
}

impl Drop for DetailLoader {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{book, FakeSource};
    use bookhub_core::FetchError;
    use std::time::Duration;

    fn loader(source: &Arc<FakeSource>) -> DetailLoader {
        let source: Arc<dyn BookSource> = source.clone();
        DetailLoader::new(source)
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_loads_record() {
        let source = Arc::new(FakeSource::default());
        source.script_book(Duration::from_millis(20), Ok(book(42, "Dune")));
        let mut loader = loader(&source);

        loader.select(Some(42));
        assert!(loader.state().is_loading());

        let mut rx = loader.subscribe();
        let state = rx.wait_for(|state| !state.is_loading()).await.unwrap();

        assert_eq!(state.book().map(|b| b.title.as_str()), Some("Dune"));
        assert_eq!(state.selected(), Some(42));
        assert!(state.error().is_none());
        assert_eq!(source.lookups(), vec![42]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_lookup_yields_no_record() {
        let source = Arc::new(FakeSource::default());
        source.script_book(Duration::ZERO, Err(FetchError::Status { status: 404 }));
        let mut loader = loader(&source);

        loader.select(Some(9));
        tokio::time::sleep(Duration::from_millis(1)).await;

        let state = loader.state();
        assert!(!state.is_loading());
        assert!(state.book().is_none());
        assert_eq!(state.error(), Some(&FetchError::Status { status: 404 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_selection_skips_network() {
        let source = Arc::new(FakeSource::default());
        let mut loader = loader(&source);

        loader.select(Some(3));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(loader.state().book().is_some());

        loader.select(None);
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(source.lookups(), vec![3]);
        assert!(loader.state().book().is_none());
        assert_eq!(loader.state().selected(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_selection_is_ignored() {
        let source = Arc::new(FakeSource::default());
        source.script_book(Duration::from_millis(500), Ok(book(1, "Old")));
        source.script_book(Duration::from_millis(10), Ok(book(2, "New")));
        let mut loader = loader(&source);

        loader.select(Some(1));
        tokio::time::sleep(Duration::from_millis(1)).await;
        loader.select(Some(2));
        tokio::time::sleep(Duration::from_millis(600)).await;

        let state = loader.state();
        assert_eq!(state.selected(), Some(2));
        assert_eq!(state.book().map(|b| b.title.as_str()), Some("New"));
    }
}
