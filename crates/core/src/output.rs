//! Serializable outputs for the command line and JSON consumers

use serde::Serialize;

use crate::book::{format_timestamp, BookRecord};
use crate::error::FetchError;
use crate::filters::{FilterSpec, SortField, SortOrder, MAX_RATING, MIN_RATING};
use crate::image::resolve_image_url;
use crate::state::SearchState;

/// One row of a result listing
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BookSummary {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub rating: f64,
    pub year: Option<i32>,
    pub price: f64,
    pub in_stock: bool,
    pub cover_url: String,
}

/// Pagination metadata for search output
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_results: usize,
    pub page_size: usize,
    pub page_numbers: Vec<usize>,
    pub first_index: usize,
    pub last_index: usize,
    pub next_page_command: Option<String>,
    pub prev_page_command: Option<String>,
}

/// Complete search output with the visible page and pagination
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SearchOutput {
    pub query: String,
    pub filters: FilterSpec,
    pub filters_active: bool,
    pub books: Vec<BookSummary>,
    pub pagination: PaginationInfo,
    /// Set when the service could not be reached; `books` is empty then
    pub error: Option<FetchError>,
}

/// Full record plus derived display fields
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BookDetailOutput {
    #[serde(flatten)]
    pub book: BookRecord,
    pub cover_url: String,
    pub publication_year: Option<i32>,
    pub created: Option<String>,
    pub updated: Option<String>,
}

pub fn summarize_book(book: &BookRecord, origin: &str) -> BookSummary {
    BookSummary {
        id: book.id,
        title: book.title.clone(),
        author: book.author.clone(),
        genre: book.genre.clone(),
        rating: book.rating,
        year: book.publication_year(),
        price: book.price,
        in_stock: book.in_stock,
        cover_url: resolve_image_url(book.cover_reference().unwrap_or_default(), origin),
    }
}

/// Transform the current search state into output with pagination
///
/// Builds the visible page, pagination metadata and the navigation commands
/// that reproduce the same search on the neighbouring pages.
pub fn transform_search_results(state: &SearchState, origin: &str) -> SearchOutput {
    let page = state.page();

    let command_for = |target: usize| search_command(state.query(), state.filters(), target);

    let next_page_command = page.has_next().then(|| command_for(page.current_page + 1));
    let prev_page_command = page
        .has_previous()
        .then(|| command_for(page.current_page - 1));

    SearchOutput {
        query: state.query().to_string(),
        filters: state.filters().clone(),
        filters_active: state.filters().is_active(),
        books: page
            .items
            .iter()
            .map(|book| summarize_book(book, origin))
            .collect(),
        pagination: PaginationInfo {
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_results: page.total_results,
            page_size: page.page_size,
            page_numbers: page.page_numbers.clone(),
            first_index: page.first_index,
            last_index: page.last_index,
            next_page_command,
            prev_page_command,
        },
        error: state.last_error().cloned(),
    }
}

pub fn transform_book_detail(book: BookRecord, origin: &str) -> BookDetailOutput {
    BookDetailOutput {
        cover_url: resolve_image_url(book.cover_reference().unwrap_or_default(), origin),
        publication_year: book.publication_year(),
        created: format_timestamp(&book.created_at),
        updated: format_timestamp(&book.updated_at),
        book,
    }
}

fn quote(value: &str) -> String {
    shlex::try_quote(value)
        .map(|q| q.into_owned())
        .unwrap_or_else(|_| format!("{value:?}"))
}

/// Command line reproducing a search on the given page
///
/// Only settings that differ from the defaults are spelled out. The query goes
/// last, after `--`, so a query starting with `-` is not read as a flag.
pub fn search_command(query: &str, filters: &FilterSpec, page: usize) -> String {
    let mut parts = vec!["bookhub".to_string(), "search".to_string()];

    if let Some(genre) = filters.genre_constraint() {
        parts.push(format!("--genre {}", quote(genre)));
    }
    if filters.min_rating > MIN_RATING {
        parts.push(format!("--min-rating {}", filters.min_rating));
    }
    if filters.max_rating < MAX_RATING {
        parts.push(format!("--max-rating {}", filters.max_rating));
    }
    if !filters.author.trim().is_empty() {
        parts.push(format!("--author {}", quote(&filters.author)));
    }
    if let Some(start) = filters.year_range.start {
        parts.push(format!("--year-start {start}"));
    }
    if let Some(end) = filters.year_range.end {
        parts.push(format!("--year-end {end}"));
    }
    if filters.sort_by != SortField::default() {
        parts.push(format!("--sort-by {}", filters.sort_by));
    }
    if filters.sort_order != SortOrder::default() {
        parts.push(format!("--sort-order {}", filters.sort_order));
    }

    parts.push(format!("--page {page}"));

    if !query.trim().is_empty() {
        parts.push(format!("-- {}", quote(query)));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::fixtures;
    use crate::filters::{FilterPatch, YearRange};
    use crate::state::SearchAction;

    const ORIGIN: &str = "https://books.example.com";

    fn loaded(count: u64) -> SearchState {
        let mut state = SearchState::new(8);
        state.apply(SearchAction::FetchStarted).unwrap();
        let request = state.request_seq();
        state
            .apply(SearchAction::FetchFinished {
                request,
                outcome: Ok(fixtures::books(count)),
            })
            .unwrap();
        state
    }

    #[test]
    fn test_summarize_book() {
        let summary = summarize_book(&fixtures::book(3, "Dune"), ORIGIN);

        assert_eq!(summary.id, 3);
        assert_eq!(summary.title, "Dune");
        assert_eq!(summary.year, Some(1965));
        assert_eq!(
            summary.cover_url,
            "https://books.example.com/media/covers/dune.jpg"
        );
    }

    #[test]
    fn test_transform_first_page() {
        let output = transform_search_results(&loaded(47), ORIGIN);

        assert_eq!(output.books.len(), 8);
        assert_eq!(output.pagination.current_page, 1);
        assert_eq!(output.pagination.total_pages, 6);
        assert_eq!(output.pagination.total_results, 47);
        assert_eq!(output.pagination.page_numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            output.pagination.next_page_command,
            Some("bookhub search --page 2".to_string())
        );
        assert!(output.pagination.prev_page_command.is_none());
        assert!(output.error.is_none());
    }

    #[test]
    fn test_transform_last_page() {
        let mut state = loaded(47);
        state.apply(SearchAction::SetPage(6)).unwrap();

        let output = transform_search_results(&state, ORIGIN);

        assert_eq!(output.books.len(), 7);
        assert_eq!(output.pagination.first_index, 41);
        assert!(output.pagination.next_page_command.is_none());
        assert_eq!(
            output.pagination.prev_page_command,
            Some("bookhub search --page 5".to_string())
        );
    }

    #[test]
    fn test_transform_empty() {
        let output = transform_search_results(&loaded(0), ORIGIN);

        assert!(output.books.is_empty());
        assert_eq!(output.pagination.total_pages, 0);
        assert!(output.pagination.page_numbers.is_empty());
        assert!(output.pagination.next_page_command.is_none());
        assert!(output.pagination.prev_page_command.is_none());
    }

    #[test]
    fn test_transform_failed_fetch_carries_error() {
        let mut state = SearchState::new(8);
        state.apply(SearchAction::FetchStarted).unwrap();
        let request = state.request_seq();
        state
            .apply(SearchAction::FetchFinished {
                request,
                outcome: Err(FetchError::Status { status: 500 }),
            })
            .unwrap();

        let output = transform_search_results(&state, ORIGIN);

        assert!(output.books.is_empty());
        assert_eq!(output.error, Some(FetchError::Status { status: 500 }));
    }

    #[test]
    fn test_search_command_defaults() {
        assert_eq!(
            search_command("", &FilterSpec::default(), 3),
            "bookhub search --page 3"
        );
    }

    #[test]
    fn test_search_command_with_filters() {
        let filters = FilterSpec {
            genre: "Sci-Fi".to_string(),
            min_rating: 4.0,
            author: "Ursula K. Le Guin".to_string(),
            year_range: YearRange::new(1960, 1980),
            sort_by: SortField::Rating,
            sort_order: SortOrder::Desc,
            ..FilterSpec::default()
        };

        let command = search_command("left hand", &filters, 2);
        let args = shlex::split(&command).unwrap();

        assert_eq!(
            args,
            vec![
                "bookhub",
                "search",
                "--genre",
                "Sci-Fi",
                "--min-rating",
                "4",
                "--author",
                "Ursula K. Le Guin",
                "--year-start",
                "1960",
                "--year-end",
                "1980",
                "--sort-by",
                "rating",
                "--sort-order",
                "desc",
                "--page",
                "2",
                "--",
                "left hand",
            ]
        );
    }

    #[test]
    fn test_search_command_query_after_separator() {
        let command = search_command("-dune", &FilterSpec::default(), 2);

        assert_eq!(
            shlex::split(&command).unwrap(),
            vec!["bookhub", "search", "--page", "2", "--", "-dune"]
        );
    }

    #[test]
    fn test_transform_reports_active_filters() {
        let mut state = loaded(3);
        state
            .apply(SearchAction::UpdateFilters(FilterPatch::genre("Horror")))
            .unwrap();

        assert!(transform_search_results(&state, ORIGIN).filters_active);
    }

    #[test]
    fn test_transform_book_detail() {
        let output = transform_book_detail(fixtures::book(9, "Dune"), ORIGIN);

        assert_eq!(output.book.id, 9);
        assert_eq!(output.publication_year, Some(1965));
        assert_eq!(output.created, Some("2024-01-02 10:00 UTC".to_string()));
        assert_eq!(
            output.cover_url,
            "https://books.example.com/media/covers/dune.jpg"
        );
    }

    #[test]
    fn test_book_detail_json_is_flat() {
        let output = transform_book_detail(fixtures::book(9, "Dune"), ORIGIN);
        let json: serde_json::Value = serde_json::to_value(&output).unwrap();

        assert_eq!(json["id"], 9);
        assert_eq!(json["title"], "Dune");
        assert!(json.get("cover_url").is_some());
        assert!(json.get("book").is_none());
    }
}
