//! Interactive catalog browser
//!
//! Reads one command per line from stdin and drives a single search
//! controller and detail loader. The screen is redrawn whenever either of them
//! publishes a new state, so results show up as soon as their fetch lands.

use std::sync::Arc;

use crate::prelude::{eprintln, println, *};
use bookhub_core::detail::DetailState;
use bookhub_core::filters::ALL_GENRES;
use bookhub_core::output::{transform_book_detail, transform_search_results};
use bookhub_core::state::Listing;
use bookhub_core::{FilterPatch, SearchState, SortField, SortOrder};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::{BookSource, HttpBookSource};
use crate::config::ClientConfig;
use crate::controller::SearchController;
use crate::detail::DetailLoader;
use crate::search::format_results;
use crate::show::format_book_detail_text;

const HELP: &str = "\
Commands:
  search <text>            Search titles and authors (empty clears the query)
  genre <name|all>         Filter by genre
  rating <min> <max>       Filter by rating range (0-5)
  author <name>            Filter by author (empty clears)
  years <start|-> <end|->  Filter by publication years, '-' leaves a side open
  sort <field> [asc|desc]  Sort by title, author, rating, publicationDate or price
  clear                    Clear the search query
  reset                    Reset every filter
  page <n>                 Jump to a page
  next | prev              Move one page forward or back
  open <id>                Show a book
  close                    Close the book view
  refresh                  Fetch the current search again
  help                     Show this help
  quit                     Leave the browser";

#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Search(String),
    Genre(String),
    Rating(f64, f64),
    Author(String),
    Years(Option<i32>, Option<i32>),
    Sort(SortField, Option<SortOrder>),
    Clear,
    Reset,
    Page(usize),
    Next,
    Prev,
    Open(u64),
    Close,
    Refresh,
    Help,
    Quit,
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T, String> {
    value
        .parse::<T>()
        .map_err(|_| f!("{what} must be a number, got {value:?}"))
}

fn parse_year(value: &str) -> Result<Option<i32>, String> {
    match value {
        "-" | "any" => Ok(None),
        _ => parse_number(value, "year").map(Some),
    }
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<BrowseCommand>, String> {
    let words = shlex::split(line).ok_or_else(|| "unbalanced quotes".to_string())?;
    let Some((name, args)) = words.split_first() else {
        return Ok(None);
    };
    let rest = args.join(" ");

    let command = match (name.to_ascii_lowercase().as_str(), args) {
        ("search" | "s", _) => BrowseCommand::Search(rest),
        ("genre" | "g", [genre, ..]) if genre.eq_ignore_ascii_case("all") && args.len() == 1 => {
            BrowseCommand::Genre(ALL_GENRES.to_string())
        }
        ("genre" | "g", [_, ..]) => BrowseCommand::Genre(rest),
        ("genre" | "g", []) => BrowseCommand::Genre(ALL_GENRES.to_string()),
        ("rating" | "r", [min, max]) => {
            BrowseCommand::Rating(parse_number(min, "rating")?, parse_number(max, "rating")?)
        }
        ("rating" | "r", _) => return Err("usage: rating <min> <max>".to_string()),
        ("author" | "a", _) => BrowseCommand::Author(rest),
        ("years" | "y", [start, end]) => {
            BrowseCommand::Years(parse_year(start)?, parse_year(end)?)
        }
        ("years" | "y", _) => return Err("usage: years <start|-> <end|->".to_string()),
        ("sort", [field]) => BrowseCommand::Sort(parse_sort_field(field)?, None),
        ("sort", [field, order]) => BrowseCommand::Sort(
            parse_sort_field(field)?,
            Some(order.parse::<SortOrder>().map_err(|e| e.to_string())?),
        ),
        ("sort", _) => return Err("usage: sort <field> [asc|desc]".to_string()),
        ("clear", []) => BrowseCommand::Clear,
        ("reset", []) => BrowseCommand::Reset,
        ("page" | "p", [page]) => BrowseCommand::Page(parse_number(page, "page")?),
        ("page" | "p", _) => return Err("usage: page <n>".to_string()),
        ("next" | "n", []) => BrowseCommand::Next,
        ("prev" | "previous", []) => BrowseCommand::Prev,
        ("open" | "o" | "show", [id]) => BrowseCommand::Open(parse_number(id, "book id")?),
        ("open" | "o" | "show", _) => return Err("usage: open <id>".to_string()),
        ("close", []) => BrowseCommand::Close,
        ("refresh", []) => BrowseCommand::Refresh,
        ("help" | "h" | "?", _) => BrowseCommand::Help,
        ("quit" | "q" | "exit", []) => BrowseCommand::Quit,
        _ => return Err(f!("unknown command: {line:?} (type 'help' for a list)")),
    };

    Ok(Some(command))
}

fn parse_sort_field(value: &str) -> Result<SortField, String> {
    value.parse::<SortField>().map_err(|e| e.to_string())
}

/// Apply a command to the controller or the loader
fn execute(
    command: BrowseCommand,
    controller: &mut SearchController,
    loader: &mut DetailLoader,
) -> Result<(), Error> {
    match command {
        BrowseCommand::Search(query) if query.trim().is_empty() => controller.clear_query(),
        BrowseCommand::Search(query) => controller.set_query(query),
        BrowseCommand::Genre(genre) => controller.update_filters(FilterPatch::genre(genre))?,
        BrowseCommand::Rating(min, max) => {
            controller.update_filters(FilterPatch::rating(min, max))?
        }
        BrowseCommand::Author(author) => controller.update_filters(FilterPatch::author(author))?,
        BrowseCommand::Years(start, end) => {
            controller.update_filters(FilterPatch::years(start, end))?
        }
        BrowseCommand::Sort(field, order) => {
            controller.update_filters(FilterPatch::sort(field, order))?
        }
        BrowseCommand::Clear => controller.clear_query(),
        BrowseCommand::Reset => controller.clear_filters(),
        BrowseCommand::Page(page) => {
            controller.set_page(page);
        }
        BrowseCommand::Next => {
            controller.next_page();
        }
        BrowseCommand::Prev => {
            controller.previous_page();
        }
        BrowseCommand::Open(id) => loader.select(Some(id)),
        BrowseCommand::Close => loader.select(None),
        BrowseCommand::Refresh => controller.refresh(),
        BrowseCommand::Help => println!("{HELP}"),
        BrowseCommand::Quit => {}
    }

    Ok(())
}

/// Render the listing for the current search state
pub fn format_browse_view(state: &SearchState, origin: &str) -> String {
    match state.listing() {
        Listing::Idle => String::new(),
        Listing::Loading => f!("\n{}\n", "Searching books...".bright_black()),
        Listing::Empty | Listing::Unavailable(_) | Listing::Results(_) => {
            let output = transform_search_results(state, origin);
            let mut result = String::new();

            let title = if output.query.trim().is_empty() {
                "All books".to_string()
            } else {
                f!("Results for {:?}", output.query)
            };
            let badge = if output.filters_active {
                f!(" {}", "[filters active]".bright_magenta())
            } else {
                String::new()
            };
            result.push_str(&format!("\n{}{}\n", title.bright_cyan().bold(), badge));
            result.push_str(&format_results(&output));

            let pagination = &output.pagination;
            if pagination.total_pages > 0 {
                result.push_str(&format!(
                    "\n{} {}-{} of {} | page {} of {} | pages {:?}\n",
                    "Showing".bright_white(),
                    pagination.first_index,
                    pagination.last_index,
                    pagination.total_results,
                    pagination.current_page,
                    pagination.total_pages,
                    pagination.page_numbers
                ));
            }

            result
        }
    }
}

/// Render the detail view, `None` when there is nothing to show
pub fn format_detail_view(state: &DetailState, origin: &str) -> Option<String> {
    let id = state.selected()?;

    if state.is_loading() {
        return Some(f!("\n{}\n", f!("Loading book {id}...").bright_black()));
    }

    match (state.book(), state.error()) {
        (Some(book), _) => Some(format_book_detail_text(&transform_book_detail(
            book.clone(),
            origin,
        ))),
        (None, Some(err)) => Some(f!(
            "\n{}\n",
            f!("Book {id} could not be loaded ({err}).").red()
        )),
        (None, None) => None,
    }
}

pub async fn run(global: crate::Global) -> Result<()> {
    let config = ClientConfig::from_global(&global)?;

    if global.verbose {
        println!("Book service: {}", config.api_base);
    }

    let source: Arc<dyn BookSource> = Arc::new(HttpBookSource::new(&config)?);
    let mut controller = SearchController::new(Arc::clone(&source), config.controller_settings());
    let mut loader = DetailLoader::new(source);
    let mut search_rx = controller.subscribe();
    let mut detail_rx = loader.subscribe();

    println!("{}", HELP);
    controller.refresh();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.wrap_err("Failed to read from stdin")? else {
                    break;
                };

                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(BrowseCommand::Quit)) => break,
                    Ok(Some(command)) => {
                        if let Err(err) = execute(command, &mut controller, &mut loader) {
                            eprintln!("{}", err.to_string().red());
                        }
                    }
                    Err(message) => eprintln!("{}", message.red()),
                }
            }
            changed = search_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = search_rx.borrow_and_update().clone();
                let view = format_browse_view(&state, &config.media_origin);
                if !view.is_empty() {
                    println!("{}", view);
                }
            }
            changed = detail_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = detail_rx.borrow_and_update().clone();
                if let Some(view) = format_detail_view(&state, &config.media_origin) {
                    println!("{}", view);
                }
            }
        }
    }

    log::debug!("browser closed");
    Ok(())
}
