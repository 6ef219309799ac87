use std::sync::Arc;

use anyhow::Result;
use model::{Criteria, OrderBy};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, trace, warn};

use crate::cli::parse_sort;
use crate::cli::render::{catalog_listing, render_state};
use crate::config::AppConfig;
use crate::controller::TransactionsController;
use crate::error::InputError;
use crate::input::{amount_range, date_range, parse_amount_input, parse_date_input};
use crate::orchestrator::FetchHandles;

const HELP: &str = "\
Commands:
  sort <key|-key|none>    change the sort key
  reverse                 flip the direction of the current sort
  filter <field>=<value>  add a partial-match filter
  unfilter <id>           remove the filter with that id
  amount [<min> <max>]    set or clear the amount range
  dates [<from> <to>]     set or clear the date range (YYYY-MM-DD)
  search [<text>]         search operation code or email (debounced)
  page <n>                go to page n (starting at 1)
  next, prev              move one page
  size <n>                rows per page
  clear                   remove every filter
  refresh                 reload the current page
  show                    print the current state
  fields                  list filterable fields and sort keys
  quit                    leave";

/// One line of input of the interactive session.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Sort(Option<OrderBy>),
    Reverse,
    Filter { field: String, value: String },
    Unfilter(String),
    /// Both bounds, or none to clear.
    Amount(Option<(String, String)>),
    Dates(Option<(String, String)>),
    Search(String),
    Page(u32),
    Next,
    Prev,
    Size(u32),
    Clear,
    Refresh,
    Show,
    Fields,
    Help,
    Quit,
}

impl BrowseCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match verb.to_lowercase().as_str() {
            "sort" => Self::Sort(parse_sort(rest).map_err(|e| e.to_string())?),
            "reverse" => Self::Reverse,
            "filter" => {
                let (field, value) = rest
                    .split_once('=')
                    .ok_or_else(|| InputError::InvalidFilter(rest.to_string()).to_string())?;
                Self::Filter {
                    field: field.trim().to_string(),
                    value: value.to_string(),
                }
            }
            "unfilter" => match args.as_slice() {
                [id] => Self::Unfilter((*id).to_string()),
                _ => return Err("usage: unfilter <id>".to_string()),
            },
            "amount" => Self::Amount(bounds(&args, "amount <min> <max>")?),
            "dates" => Self::Dates(bounds(&args, "dates <from> <to>")?),
            "search" => Self::Search(rest.to_string()),
            "page" => match args.as_slice() {
                [page] => match page.parse::<u32>() {
                    Ok(page) if page > 0 => Self::Page(page),
                    _ => return Err(format!("'{}' is not a page number", page)),
                },
                _ => return Err("usage: page <n>".to_string()),
            },
            "next" => Self::Next,
            "prev" => Self::Prev,
            "size" => match args.as_slice() {
                [size] => Self::Size(size.parse().map_err(|_| format!("'{}' is not a page size", size))?),
                _ => return Err("usage: size <n>".to_string()),
            },
            "clear" => Self::Clear,
            "refresh" => Self::Refresh,
            "show" | "" => Self::Show,
            "fields" => Self::Fields,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("Unknown command '{}', type help", other)),
        };
        Ok(command)
    }
}

fn bounds(args: &[&str], usage: &str) -> Result<Option<(String, String)>, String> {
    match args {
        [] => Ok(None),
        [low, high] => Ok(Some(((*low).to_string(), (*high).to_string()))),
        _ => Err(format!("usage: {}", usage)),
    }
}

/// What the session does after a command ran.
enum Outcome {
    Fetching(FetchHandles),
    Searching,
    Print(String),
    Quit,
}

fn execute(controller: &TransactionsController, command: BrowseCommand) -> Result<Outcome, InputError> {
    let state = controller.state();
    let outcome = match command {
        BrowseCommand::Sort(order_by) => Outcome::Fetching(controller.set_order_by(order_by)),
        BrowseCommand::Reverse => match &state.criteria.order_by {
            Some(order_by) => Outcome::Fetching(controller.set_order_by(Some(order_by.reversed()))),
            None => Outcome::Print("No sort key to reverse".to_string()),
        },
        BrowseCommand::Filter { field, value } => {
            let (id, handles) = controller.add_field_filter(&field, &value)?;
            println!("Added filter {}", id);
            Outcome::Fetching(handles)
        }
        BrowseCommand::Unfilter(id) => {
            if !state.criteria.field_filters.iter().any(|filter| filter.id == id) {
                return Ok(Outcome::Print(format!("No filter with id {}", id)));
            }
            Outcome::Fetching(controller.remove_field_filter(&id))
        }
        BrowseCommand::Amount(bounds) => {
            let range = match bounds {
                Some((min, max)) => amount_range(parse_amount_input(&min)?, parse_amount_input(&max)?)?,
                None => None,
            };
            Outcome::Fetching(controller.set_amount_range(range))
        }
        BrowseCommand::Dates(bounds) => {
            let range = match bounds {
                Some((from, to)) => date_range(parse_date_input(&from)?, parse_date_input(&to)?)?,
                None => None,
            };
            Outcome::Fetching(controller.set_date_range(range))
        }
        BrowseCommand::Search(text) => {
            controller.search(&text);
            Outcome::Searching
        }
        BrowseCommand::Page(page) => Outcome::Fetching(controller.set_page(page - 1)),
        BrowseCommand::Next => {
            let last = state.total_pages().saturating_sub(1);
            let next = u64::from(state.criteria.page) + 1;
            if next > last {
                return Ok(Outcome::Print("Already on the last page".to_string()));
            }
            Outcome::Fetching(controller.set_page(state.criteria.page + 1))
        }
        BrowseCommand::Prev => match state.criteria.page.checked_sub(1) {
            Some(previous) => Outcome::Fetching(controller.set_page(previous)),
            None => Outcome::Print("Already on the first page".to_string()),
        },
        BrowseCommand::Size(size) => Outcome::Fetching(controller.set_page_size(size)?),
        BrowseCommand::Clear => Outcome::Fetching(controller.clear_all_filters()),
        BrowseCommand::Refresh => Outcome::Fetching(controller.refresh()),
        BrowseCommand::Show => Outcome::Print(render_state(&state)),
        BrowseCommand::Fields => Outcome::Print(catalog_listing()),
        BrowseCommand::Help => Outcome::Print(HELP.to_string()),
        BrowseCommand::Quit => Outcome::Quit,
    };
    Ok(outcome)
}

/// Waits for the debounced search to commit and its fetch to settle.
async fn wait_for_search(controller: &TransactionsController, generation: u64) {
    let mut receiver = controller.subscribe();
    let committed = receiver
        .wait_for(|state| state.generation > generation && state.is_settled())
        .await;
    if committed.is_err() {
        warn!("State channel closed while waiting for search results");
    }
}

/// Interactive session: reads commands from stdin, prints the state after
/// every change.
pub async fn browse(config: Arc<AppConfig>, criteria: Criteria) -> Result<()> {
    trace!("Entering browse function");
    info!("Browsing transactions from {}", config.endpoint);

    let controller = TransactionsController::with_criteria(&config, criteria)?;
    controller.refresh().join().await;
    println!("{}", render_state(&controller.state()));
    println!("Type help for the list of commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match BrowseCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        debug!("Browse command: {:?}", command);

        let generation = controller.state().generation;
        match execute(&controller, command) {
            Ok(Outcome::Fetching(handles)) => {
                handles.join().await;
                println!("{}", render_state(&controller.state()));
            }
            Ok(Outcome::Searching) => {
                wait_for_search(&controller, generation).await;
                println!("{}", render_state(&controller.state()));
            }
            Ok(Outcome::Print(text)) => println!("{}", text),
            Ok(Outcome::Quit) => break,
            Err(e) => println!("{}", e),
        }
    }

    info!("Browse session finished");
    Ok(())
}
