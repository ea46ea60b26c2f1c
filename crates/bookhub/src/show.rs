use std::sync::Arc;

use crate::prelude::{println, *};
use bookhub_core::book::star_rating;
use bookhub_core::output::{transform_book_detail, BookDetailOutput};
use colored::Colorize;
use regex::Regex;

use crate::api::{BookSource, HttpBookSource};
use crate::config::ClientConfig;
use crate::detail::DetailLoader;

#[derive(Debug, clap::Args, Clone)]
pub struct ShowOptions {
    /// Book ID or URL (e.g., "42" or "https://book-hub-5-vjef.onrender.com/api/books/42/")
    #[arg(value_name = "BOOK")]
    pub book: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: ShowOptions, global: crate::Global) -> Result<()> {
    let id = extract_book_id(&options.book)?;
    let config = ClientConfig::from_global(&global)?;

    if global.verbose {
        println!("Fetching book ID: {}", id);
    }

    let source: Arc<dyn BookSource> = Arc::new(HttpBookSource::new(&config)?);
    let detail = book_detail_data(source, &config, id).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        println!("{}", format_book_detail_text(&detail));
    }

    Ok(())
}

pub fn extract_book_id(input: &str) -> Result<u64> {
    let input = input.trim();

    if let Ok(id) = input.parse::<u64>() {
        return Ok(id);
    }

    let re = Regex::new(r"/books/(\d+)/?(?:[?#].*)?$")
        .map_err(|e| eyre!("Invalid book URL pattern: {}", e))?;
    if let Some(id_match) = re.captures(input).and_then(|caps| caps.get(1)) {
        return id_match
            .as_str()
            .parse::<u64>()
            .map_err(|_| Error::InvalidBookRef(input.to_string()).into());
    }

    Err(Error::InvalidBookRef(input.to_string()).into())
}

/// Loads a single book through a detail loader
pub async fn book_detail_data(
    source: Arc<dyn BookSource>,
    config: &ClientConfig,
    id: u64,
) -> Result<BookDetailOutput> {
    let mut loader = DetailLoader::new(source);
    let mut rx = loader.subscribe();

    loader.select(Some(id));

    let state = rx
        .wait_for(|state| !state.is_loading())
        .await
        .map_err(|e| eyre!("Book lookup was interrupted: {}", e))?
        .clone();

    match (state.book(), state.error()) {
        (Some(book), _) => Ok(transform_book_detail(book.clone(), &config.media_origin)),
        (None, Some(err)) => Err(Error::from(err.clone()))
            .wrap_err_with(|| f!("book {id} could not be loaded")),
        (None, None) => Err(eyre!("Book {} was not found", id)),
    }
}

/// Convert a book to a key/value table followed by its description
pub fn format_book_detail_text(detail: &BookDetailOutput) -> String {
    let book = &detail.book;
    let mut result = String::new();

    result.push_str(&format!(
        "\n{} {}\n",
        book.title.bright_white().bold(),
        f!("by {}", book.author).bright_black()
    ));
    result.push_str(&format!("{}\n\n", "=".repeat(80).bright_cyan()));

    let mut table = new_table();
    table.add_row(prettytable::row!["ID", book.id]);
    table.add_row(prettytable::row!["Genre", book.genre]);
    table.add_row(prettytable::row!["Rating", star_rating(book.rating)]);

    let published = match detail.publication_year {
        Some(year) if book.publication_date.trim().len() > 4 => {
            f!("{} ({year})", book.publication_date)
        }
        Some(year) => year.to_string(),
        None => "unknown".to_string(),
    };
    table.add_row(prettytable::row!["Published", published]);
    table.add_row(prettytable::row!["Pages", book.pages]);

    if !book.publisher.trim().is_empty() {
        table.add_row(prettytable::row!["Publisher", book.publisher]);
    }
    if !book.language.trim().is_empty() {
        table.add_row(prettytable::row!["Language", book.language]);
    }
    if !book.isbn.trim().is_empty() {
        table.add_row(prettytable::row!["ISBN", book.isbn]);
    }

    table.add_row(prettytable::row!["Price", f!("${:.2}", book.price)]);
    let stock = if book.in_stock { "In stock" } else { "Out of stock" };
    table.add_row(prettytable::row!["Availability", stock]);

    if !detail.cover_url.is_empty() {
        table.add_row(prettytable::row!["Cover", detail.cover_url]);
    }
    if let Some(created) = &detail.created {
        table.add_row(prettytable::row!["Added", created]);
    }
    if let Some(updated) = &detail.updated {
        table.add_row(prettytable::row!["Updated", updated]);
    }

    result.push_str(&table.to_string());

    if !book.description.trim().is_empty() {
        result.push_str(&format!("\n{}\n", "Description".green().bold()));
        result.push_str(&format!("{}\n", book.description.trim()));
    }

    result
}
