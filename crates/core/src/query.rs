//! Request parameters for the book service
//!
//! Pure functions turning a query and a `FilterSpec` into the exact parameter
//! list the search endpoint expects. Parameter order is fixed so the encoded
//! query string is stable.

use crate::filters::FilterSpec;

/// Build the search endpoint parameters
///
/// - `search` is omitted when the query is blank
/// - `genre` is omitted for the "All Genres" sentinel
/// - `min_rating` and `max_rating` are always sent, zero included
/// - `author` is omitted when blank
/// - `year_start` and `year_end` are sent together, only when both bounds exist
/// - `sort_by` and `sort_order` are always sent
pub fn search_params(query: &str, filters: &FilterSpec) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(9);

    if !query.trim().is_empty() {
        params.push(("search", query.to_string()));
    }

    if let Some(genre) = filters.genre_constraint() {
        params.push(("genre", genre.to_string()));
    }

    params.push(("min_rating", filters.min_rating.to_string()));
    params.push(("max_rating", filters.max_rating.to_string()));

    if !filters.author.trim().is_empty() {
        params.push(("author", filters.author.clone()));
    }

    if let Some((start, end)) = filters.year_range.bounds() {
        params.push(("year_start", start.to_string()));
        params.push(("year_end", end.to_string()));
    }

    params.push(("sort_by", filters.sort_by.as_param().to_string()));
    params.push(("sort_order", filters.sort_order.as_param().to_string()));

    params
}

/// Percent-encode parameters into a `key=value&...` string
pub fn encode_query_string(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Path of the search endpoint, relative to the API base
pub fn search_path(query: &str, filters: &FilterSpec) -> String {
    format!(
        "books/?{}",
        encode_query_string(&search_params(query, filters))
    )
}

/// Path of the detail endpoint, relative to the API base
pub fn detail_path(id: u64) -> String {
    format!("books/{id}/")
}
