use std::sync::Arc;

use crate::prelude::{println, *};
use bookhub_core::book::star_rating;
use bookhub_core::output::{transform_search_results, BookSummary, SearchOutput};
use bookhub_core::{FetchError, FilterPatch, SortField, SortOrder, YearRangePatch};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{BookSource, HttpBookSource};
use crate::config::ClientConfig;
use crate::controller::SearchController;

#[derive(Debug, clap::Args, Clone)]
pub struct SearchOptions {
    /// Free-text query matched against titles and authors
    #[arg(value_name = "QUERY", default_value = "")]
    pub query: String,

    /// Only books of this genre ("All Genres" for any)
    #[arg(short, long)]
    pub genre: Option<String>,

    /// Lowest rating to include (0-5)
    #[arg(long)]
    pub min_rating: Option<f64>,

    /// Highest rating to include (0-5)
    #[arg(long)]
    pub max_rating: Option<f64>,

    /// Only books whose author matches
    #[arg(short, long)]
    pub author: Option<String>,

    /// Earliest publication year
    #[arg(long)]
    pub year_start: Option<i32>,

    /// Latest publication year
    #[arg(long)]
    pub year_end: Option<i32>,

    /// Sort field: title, author, rating, publicationDate, price
    #[arg(long)]
    pub sort_by: Option<SortField>,

    /// Sort order: asc, desc
    #[arg(long)]
    pub sort_order: Option<SortOrder>,

    /// Page number (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchOptions {
    /// Filter changes requested on the command line
    pub fn filter_patch(&self) -> FilterPatch {
        let year_range = (self.year_start.is_some() || self.year_end.is_some()).then(|| {
            YearRangePatch {
                start: self.year_start.map(Some),
                end: self.year_end.map(Some),
            }
        });

        FilterPatch {
            genre: self.genre.clone(),
            min_rating: self.min_rating,
            max_rating: self.max_rating,
            author: self.author.clone(),
            year_range,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }
}

pub async fn run(options: SearchOptions, global: crate::Global) -> Result<()> {
    let config = ClientConfig::from_global(&global)?;

    if global.verbose {
        println!("Book service: {}", config.api_base);
        println!();
    }

    let spinner = (!options.json).then(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Searching books...");
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        spinner
    });

    let source: Arc<dyn BookSource> = Arc::new(HttpBookSource::new(&config)?);
    let output = search_books_data(source, &config, &options).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let output = output?;

    if options.json {
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| eyre!("JSON serialization failed: {}", e))?;
        println!("{}", json);
    } else {
        println!("{}", format_search_text(&output));
    }

    Ok(())
}

/// Runs one search through a controller and returns the requested page
pub async fn search_books_data(
    source: Arc<dyn BookSource>,
    config: &ClientConfig,
    options: &SearchOptions,
) -> Result<SearchOutput> {
    let mut controller = SearchController::new(source, config.controller_settings());
    let mut rx = controller.subscribe();

    controller
        .search(options.query.clone(), options.filter_patch())
        .map_err(Error::from)?;

    rx.wait_for(|state| state.is_settled())
        .await
        .map_err(|e| eyre!("Search was interrupted: {}", e))?;

    controller.set_page(options.page);

    Ok(transform_search_results(
        &controller.state(),
        &config.media_origin,
    ))
}

fn unavailable_message(err: &FetchError) -> String {
    f!("The book service is unavailable right now ({err}).")
}

/// Result rows shared by one-shot searches and the interactive browser
pub(crate) fn format_results(output: &SearchOutput) -> String {
    let mut result = String::new();

    if let Some(err) = &output.error {
        result.push_str(&format!("\n{}\n", unavailable_message(err).red()));
        return result;
    }

    if output.books.is_empty() {
        result.push_str(&format!("\n{}\n", "No books match your search.".yellow()));
        return result;
    }

    for (offset, book) in output.books.iter().enumerate() {
        let number = output.pagination.first_index + offset;
        result.push_str(&format_book_row(number, book));
    }

    result
}

fn format_book_row(number: usize, book: &BookSummary) -> String {
    let mut result = String::new();

    result.push_str(&format!(
        "\n{} {}\n",
        format!("[{number}]").yellow().bold(),
        book.title.white().bold()
    ));

    let year = book
        .year
        .map(|year| year.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    result.push_str(&format!(
        "    {}: {} | {}: {} | {}: {}\n",
        "By".green(),
        book.author.bright_white(),
        "Genre".green(),
        book.genre.bright_magenta(),
        "Year".green(),
        year.bright_black()
    ));

    let stock = if book.in_stock {
        "in stock".bright_green()
    } else {
        "out of stock".bright_red()
    };
    result.push_str(&format!(
        "    {}: {} | {}: {} | {}\n",
        "Rating".green(),
        star_rating(book.rating).bright_yellow(),
        "Price".green(),
        format!("${:.2}", book.price).bright_white(),
        stock
    ));

    result.push_str(&format!(
        "    {}: {} | {}: {}\n",
        "ID".green(),
        book.id.to_string().bright_white(),
        "Show".green(),
        format!("bookhub show {}", book.id).cyan()
    ));

    result
}

/// Convert search output to formatted text with colors
pub fn format_search_text(output: &SearchOutput) -> String {
    let mut result = String::new();
    let pagination = &output.pagination;

    let title = if output.query.trim().is_empty() {
        "BOOKS".to_string()
    } else {
        f!("BOOKS MATCHING {:?}", output.query)
    };

    // Header
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!("{}\n", title.bright_cyan().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if output.filters_active {
        result.push_str(&format!(
            "{} {}\n",
            "Filters:".green(),
            describe_filters(output).bright_white()
        ));
    }

    result.push_str(&format_results(output));

    if output.error.is_some() || output.books.is_empty() {
        return result;
    }

    // Navigation section
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_yellow()));
    result.push_str(&format!("{}\n", "NAVIGATION".bright_yellow().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_yellow()));

    result.push_str(&format!(
        "\n{} {}-{} {} {} ({} {} {} {})\n",
        "Showing".bright_white(),
        pagination.first_index.to_string().bright_cyan().bold(),
        pagination.last_index.to_string().bright_cyan().bold(),
        "of".bright_white(),
        pagination.total_results.to_string().bright_cyan().bold(),
        "page".bright_white(),
        pagination.current_page.to_string().bright_cyan().bold(),
        "of".bright_white(),
        pagination.total_pages.to_string().bright_cyan().bold(),
    ));

    let pages = pagination
        .page_numbers
        .iter()
        .map(|page| {
            if *page == pagination.current_page {
                f!("[{page}]").bright_cyan().bold().to_string()
            } else {
                page.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    result.push_str(&format!("{} {}\n", "Pages:".bright_white(), pages));

    if pagination.next_page_command.is_some() || pagination.prev_page_command.is_some() {
        result.push_str(&format!("\n{}:\n", "To navigate".bright_white().bold()));
    }
    if let Some(next) = &pagination.next_page_command {
        result.push_str(&format!("  {}: {}\n", "Next page".green(), next.cyan()));
    }
    if let Some(prev) = &pagination.prev_page_command {
        result.push_str(&format!("  {}: {}\n", "Previous page".green(), prev.cyan()));
    }

    result
}

fn describe_filters(output: &SearchOutput) -> String {
    let filters = &output.filters;
    let mut parts = Vec::new();

    if let Some(genre) = filters.genre_constraint() {
        parts.push(f!("genre {genre}"));
    }
    if filters.min_rating > bookhub_core::filters::MIN_RATING
        || filters.max_rating < bookhub_core::filters::MAX_RATING
    {
        parts.push(f!("rating {}-{}", filters.min_rating, filters.max_rating));
    }
    if !filters.author.trim().is_empty() {
        parts.push(f!("author {:?}", filters.author));
    }
    match (filters.year_range.start, filters.year_range.end) {
        (Some(start), Some(end)) => parts.push(f!("years {start}-{end}")),
        (Some(start), None) => parts.push(f!("from {start}")),
        (None, Some(end)) => parts.push(f!("until {end}")),
        (None, None) => {}
    }

    parts.join(", ")
}
