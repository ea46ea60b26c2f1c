#![allow(unused)]

use crate::prelude::*;
use clap::Parser;

mod api;
mod browse;
mod config;
mod controller;
mod detail;
mod error;
mod prelude;
mod search;
mod show;

#[cfg(test)]
mod testing;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Search, filter and page through a remote book catalog"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Base URL of the book service API
    #[clap(long, env = "BOOKHUB_API_URL", global = true, default_value = config::DEFAULT_API_URL)]
    api_url: String,

    /// Number of books shown per page
    #[clap(long, env = "BOOKHUB_PAGE_SIZE", global = true, default_value = "8")]
    page_size: usize,

    /// Quiet period in milliseconds before a query edit is searched
    #[clap(long, env = "BOOKHUB_DEBOUNCE_MS", global = true, default_value = "300")]
    debounce_ms: u64,

    /// HTTP request timeout in seconds
    #[clap(long, env = "BOOKHUB_TIMEOUT_SECS", global = true, default_value = "30")]
    timeout_secs: u64,

    /// Whether to display additional information.
    #[clap(long, env = "BOOKHUB_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Search the catalog and print one page of results
    Search(crate::search::SearchOptions),

    /// Show a single book
    Show(crate::show::ShowOptions),

    /// Browse the catalog interactively
    Browse,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Search(options) => crate::search::run(options, app.global).await,
        SubCommands::Show(options) => crate::show::run(options, app.global).await,
        SubCommands::Browse => crate::browse::run(app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        App::command().debug_assert();
    }

    #[test]
    fn test_global_defaults() {
        let app = App::try_parse_from(["bookhub", "browse"]).unwrap();

        assert!(matches!(app.command, SubCommands::Browse));
        assert_eq!(app.global.page_size, 8);
        assert_eq!(app.global.debounce_ms, 300);
        assert_eq!(app.global.timeout_secs, 30);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let app = App::try_parse_from([
            "bookhub",
            "search",
            "dune",
            "--page-size",
            "4",
            "--api-url",
            "http://localhost:8000/api",
        ])
        .unwrap();

        assert_eq!(app.global.page_size, 4);
        assert_eq!(app.global.api_url, "http://localhost:8000/api");
        match app.command {
            SubCommands::Search(options) => assert_eq!(options.query, "dune"),
            other => panic!("expected search, got {other:?}"),
        }
    }
}
