use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use paperfeed::app::App;
use paperfeed::config::Config;
use paperfeed::feed::{start_of_day, ArxivFeed, FilterCriteria, MAX_SEARCH_RESULTS};
use paperfeed::render::{self, DEFAULT_WIDTH};
use paperfeed::shell::{self, FeedBrowser};
use paperfeed::util::validate_url;

/// Get the config directory path (~/.config/paperfeed/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("paperfeed"))
}

/// Output width from `$COLUMNS`, falling back to a fixed default.
fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|&w| w > 0)
        .unwrap_or(DEFAULT_WIDTH)
}

fn parse_since(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD ({e})"))
}

fn parse_max_results(s: &str) -> std::result::Result<u32, String> {
    let n: u32 = s.parse().map_err(|e| format!("{e}"))?;
    if (1..=MAX_SEARCH_RESULTS).contains(&n) {
        Ok(n)
    } else {
        Err(format!("must be between 1 and {MAX_SEARCH_RESULTS}"))
    }
}

#[derive(Parser, Debug)]
#[command(name = "paperfeed", version, about = "Search and browse arXiv papers from the terminal")]
struct Args {
    /// Config file (default: ~/.config/paperfeed/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search arXiv by keyword
    Search {
        /// Search phrase (default from config)
        query: Option<String>,

        /// Number of results, 1-50
        #[arg(short = 'n', long, value_parser = parse_max_results)]
        max_results: Option<u32>,
    },

    /// Browse an arXiv RSS feed
    Feed {
        /// Built-in feed to browse
        #[arg(long, value_enum, conflicts_with = "url")]
        feed: Option<ArxivFeed>,

        /// Any other RSS/Atom feed URL
        #[arg(long)]
        url: Option<String>,

        /// Only papers published on or after this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_since)]
        since: Option<NaiveDate>,

        /// Only papers whose title or summary contains this text
        #[arg(long)]
        keyword: Option<String>,

        /// Page to show first
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Page through results interactively
        #[arg(short, long)]
        interactive: bool,
    },

    /// List the built-in feeds
    Feeds,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only rendered output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let width = terminal_width();
    let mut out = std::io::stdout();

    match args.command {
        Command::Feeds => {
            print!("{}", render::render_catalog());
        }
        Command::Search { query, max_results } => {
            let app = App::new(&config).context("Failed to build HTTP client")?;
            let query = query.unwrap_or_else(|| config.default_query.clone());
            let max_results = max_results.unwrap_or(config.default_max_results);
            shell::run_search(&app, &query, max_results, width, &mut out).await?;
        }
        Command::Feed {
            feed,
            url,
            since,
            keyword,
            page,
            interactive,
        } => {
            let url = match url {
                Some(raw) => match validate_url(&raw) {
                    Ok(valid) => valid.to_string(),
                    Err(e) => {
                        eprintln!("Warning: Invalid feed URL '{raw}': {e}");
                        return Ok(());
                    }
                },
                None => feed.unwrap_or(config.default_feed).url().to_string(),
            };
            let criteria = FilterCriteria::new(since.map(start_of_day), keyword);

            let mut app = App::new(&config).context("Failed to build HTTP client")?;
            app.set_page(page);

            let mut browser = FeedBrowser::new(&mut app, url, criteria, width);
            browser.load(&mut out).await?;
            if interactive {
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                browser.interact(stdin, &mut out).await?;
            }
        }
    }

    Ok(())
}
