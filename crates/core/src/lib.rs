//! Core library for bookhub
//!
//! This crate implements the **Functional Core** of the bookhub catalog
//! browser, following the Functional Core - Imperative Shell architectural
//! pattern.
//!
//! # Architecture Overview
//!
//! - **`bookhub_core`** (this crate): Pure data types and transformations with zero I/O
//! - **`bookhub`**: HTTP access, the debounced search controller and the CLI (the Imperative Shell)
//!
//! Everything that decides *what* the browser shows lives here: how filters
//! merge, which request parameters a search sends, how the fetched result set
//! is paged, and how fetch completions move the search state along. The shell
//! only decides *when* things happen.
//!
//! # Module Organization
//!
//! - [`book`]: The catalog record as served by the book service
//! - [`filters`]: Structured search constraints and partial updates
//! - [`query`]: Request parameters for the search and detail endpoints
//! - [`pagination`]: Client-side page slicing and the page-number window
//! - [`state`]: Search state and the reducer that is its only mutation path
//! - [`detail`]: State of the single-record detail view
//! - [`image`]: Cover reference resolution
//! - [`output`]: Serializable outputs for the CLI and JSON consumers
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use bookhub_core::state::{SearchAction, SearchState};
//!
//! let mut state = SearchState::new(8);
//! state.apply(SearchAction::FetchStarted)?;
//! let request = state.fetch_request();
//! state.apply(SearchAction::FetchFinished { request: request.seq, outcome: Ok(books) })?;
//!
//! assert_eq!(state.page().current_page, 1);
//! ```

pub mod book;
pub mod detail;
pub mod error;
pub mod filters;
pub mod image;
pub mod output;
pub mod pagination;
pub mod query;
pub mod state;

pub use book::BookRecord;
pub use error::FetchError;
pub use filters::{
    FilterError, FilterPatch, FilterSpec, SortField, SortOrder, YearRange, YearRangePatch,
};
pub use state::{FetchRequest, SearchAction, SearchPhase, SearchState};
