//! Line-oriented front end: one-shot search/feed output and the
//! interactive feed pager.
//!
//! Pipeline failures are printed as warnings and never end the session.

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::app::{App, FeedView, PipelineError};
use crate::feed::FilterCriteria;
use crate::render;

const PROMPT: &str = "[n]ext  [p]revious  [r]efresh  [q]uit > ";

/// A pager keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Refresh,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "n" | "next" => Some(Command::Next),
            "p" | "prev" | "previous" => Some(Command::Previous),
            "r" | "refresh" => Some(Command::Refresh),
            "q" | "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

fn warn(out: &mut impl Write, err: &PipelineError) -> io::Result<()> {
    tracing::warn!(error = %err, "Pipeline action failed");
    writeln!(out, "Warning: {}", err.user_message())
}

/// Runs one search and prints the results.
pub async fn run_search<W: Write>(
    app: &App,
    query: &str,
    max_results: u32,
    width: usize,
    out: &mut W,
) -> io::Result<()> {
    match app.search(query, max_results).await {
        Ok(result) => write!(out, "{}", render::render_search(query, &result, width)),
        Err(e) => warn(out, &e),
    }
}

/// Feed browsing state for one URL and filter.
pub struct FeedBrowser<'a> {
    app: &'a mut App,
    url: String,
    criteria: FilterCriteria,
    width: usize,
    view: Option<FeedView>,
}

impl<'a> FeedBrowser<'a> {
    pub fn new(
        app: &'a mut App,
        url: impl Into<String>,
        criteria: FilterCriteria,
        width: usize,
    ) -> Self {
        Self {
            app,
            url: url.into(),
            criteria,
            width,
            view: None,
        }
    }

    /// Loads the feed (or reuses the cached copy) and prints the current page.
    pub async fn load<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match self.app.browse(&self.url, &self.criteria).await {
            Ok(view) => {
                self.view = Some(view);
                self.show(out)
            }
            Err(e) => {
                self.view = None;
                warn(out, &e)
            }
        }
    }

    fn show<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if let Some(view) = &self.view {
            let page = self.app.current_page(view);
            write!(out, "{}", render::render_feed_page(view, &page, self.width))?;
        }
        Ok(())
    }

    fn total_pages(&self) -> usize {
        self.view
            .as_ref()
            .map(|v| self.app.current_page(v).total_pages)
            .unwrap_or(0)
    }

    /// Applies one pager command. Returns `false` when the user quits.
    pub async fn handle<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<bool> {
        match command {
            Command::Next => {
                let total = self.total_pages();
                if self.app.next_page(total) {
                    self.show(out)?;
                } else {
                    writeln!(out, "Already on the last page.")?;
                }
            }
            Command::Previous => {
                if self.app.previous_page() {
                    self.show(out)?;
                } else {
                    writeln!(out, "Already on the first page.")?;
                }
            }
            Command::Refresh => {
                self.app.refresh(&self.url);
                self.load(out).await?;
            }
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Reads pager commands from `input` until `q` or end of input.
    pub async fn interact<R, W>(&mut self, input: R, out: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            match Command::parse(&line) {
                Some(command) => {
                    if !self.handle(command, out).await? {
                        break;
                    }
                }
                None => writeln!(out, "Unknown command: {}", line.trim())?,
            }
        }
        Ok(())
    }
}
