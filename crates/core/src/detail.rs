//! State of the single-record detail view
//!
//! Independent from the search state: selecting a record never touches the
//! result list and vice versa.

use serde::Serialize;

use crate::book::BookRecord;
use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DetailState {
    selected: Option<u64>,
    book: Option<BookRecord>,
    loading: bool,
    error: Option<FetchError>,
    #[serde(skip)]
    request_seq: u64,
}

/// Detail fetch to issue after a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailRequest {
    pub seq: u64,
    pub id: u64,
}

impl DetailState {
    /// Change the selection
    ///
    /// Selecting `None` clears the loaded record without a network call and
    /// invalidates any request still in flight. Selecting an id enters the
    /// loading state and returns the request to issue.
    pub fn select(&mut self, id: Option<u64>) -> Option<DetailRequest> {
        self.request_seq += 1;
        self.selected = id;
        self.book = None;
        self.error = None;
        self.loading = id.is_some();

        id.map(|id| DetailRequest {
            seq: self.request_seq,
            id,
        })
    }

    /// Apply a completed fetch. Returns `false` for a superseded request.
    pub fn finish(&mut self, seq: u64, outcome: Result<BookRecord, FetchError>) -> bool {
        if seq != self.request_seq {
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(book) => {
                self.book = Some(book);
                self.error = None;
            }
            Err(err) => {
                self.book = None;
                self.error = Some(err);
            }
        }
        true
    }

    pub fn selected(&self) -> Option<u64> {
        self.selected
    }

    pub fn book(&self) -> Option<&BookRecord> {
        self.book.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }
}
