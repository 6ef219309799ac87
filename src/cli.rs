use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use model::{Criteria, OrderBy};
use tracing::debug;

pub mod commands;
pub mod render;

use commands::{browse, list_transactions, print_urls};

use crate::config::AppConfig;
use crate::error::InputError;
use crate::input::{amount_range, date_range, parse_amount_input, parse_date_input, parse_filter_input, validate_page_size};

#[derive(Parser)]
#[command(name = "txgrid")]
#[command(about = "Browse payment transactions served by a paginated transactions API")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    ///
    /// Values in the file override built-in defaults and are themselves
    /// overridden by TXGRID_* environment variables.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Transactions endpoint, e.g. https://api.example.com/v1/transactions
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Token sent verbatim in the Authorization header
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the page and count URLs for the given criteria
    Url {
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
    /// Fetch one page and print it with the total count
    List {
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
    /// Interactive session reading filter commands from stdin
    ///
    /// Type `help` inside the session for the list of commands.
    Browse {
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
}

/// Filter, sort and pagination flags shared by every subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct CriteriaArgs {
    /// Sort key, `-` prefixed for descending (e.g. -amount); `none` for server order
    #[arg(short, long, allow_hyphen_values = true)]
    pub sort: Option<String>,

    /// Page number, starting at 1
    #[arg(short, long)]
    pub page: Option<u32>,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Partial-match filter, repeatable (e.g. --filter status=1)
    #[arg(short, long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,

    /// Free-text search on operation code, or on email when it contains '@'
    #[arg(long)]
    pub search: Option<String>,

    /// Lower amount bound, used together with --max-amount
    #[arg(long)]
    pub min_amount: Option<String>,

    /// Upper amount bound, used together with --min-amount
    #[arg(long)]
    pub max_amount: Option<String>,

    /// First day, YYYY-MM-DD, used together with --to
    #[arg(long)]
    pub from: Option<String>,

    /// Last day, YYYY-MM-DD, used together with --from
    #[arg(long)]
    pub to: Option<String>,
}

impl CriteriaArgs {
    /// Applies the flags on top of `base`.
    pub fn apply(&self, base: Criteria) -> Result<Criteria, InputError> {
        let mut criteria = base;

        if let Some(sort) = &self.sort {
            criteria.order_by = parse_sort(sort)?;
        }
        if let Some(page_size) = self.page_size {
            criteria.page_size = validate_page_size(page_size)?;
        }
        for filter in &self.filters {
            criteria.field_filters.push(parse_filter_input(filter)?);
        }
        if let Some(search) = &self.search {
            let trimmed = search.trim();
            criteria.free_text = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }

        let min = parse_amount_input(self.min_amount.as_deref().unwrap_or_default())?;
        let max = parse_amount_input(self.max_amount.as_deref().unwrap_or_default())?;
        if let Some(range) = amount_range(min, max)? {
            criteria.amount_range = Some(range);
        }

        let start = parse_date_input(self.from.as_deref().unwrap_or_default())?;
        let end = parse_date_input(self.to.as_deref().unwrap_or_default())?;
        if let Some(range) = date_range(start, end)? {
            criteria.date_range = Some(range);
        }

        criteria.page = self.page.unwrap_or(1).saturating_sub(1);
        debug!("Criteria from flags: {:?}", criteria);
        Ok(criteria)
    }
}

/// Sort key as typed by the user; `none` or blank selects server order.
pub fn parse_sort(input: &str) -> Result<Option<OrderBy>, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Ok(Some(trimmed.parse()?))
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = AppConfig::load(self.config.as_deref())?.with_overrides(self.endpoint, self.token)?;
        let config = Arc::new(config);

        match self.command {
            Commands::Url { criteria } => {
                let criteria = criteria.apply(config.initial_criteria()?)?;
                print_urls(&config, &criteria);
            }
            Commands::List { criteria } => {
                let criteria = criteria.apply(config.initial_criteria()?)?;
                list_transactions(config, criteria).await?;
            }
            Commands::Browse { criteria } => {
                let criteria = criteria.apply(config.initial_criteria()?)?;
                browse(config, criteria).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["txgrid"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn criteria_of(cli: Cli) -> CriteriaArgs {
        match cli.command {
            Commands::Url { criteria } | Commands::List { criteria } | Commands::Browse { criteria } => criteria,
        }
    }

    #[test]
    fn test_flags_build_criteria() {
        let cli = parse(&[
            "list",
            "--sort",
            "-amount",
            "--page",
            "2",
            "--page-size",
            "20",
            "--filter",
            "status=1",
            "-f",
            "email=shop",
            "--min-amount",
            "10",
            "--max-amount",
            "99.5",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
            "--search",
            "OP-1",
        ]);

        let criteria = criteria_of(cli).apply(Criteria::default()).unwrap();

        assert_eq!(criteria.order_by, Some(OrderBy::descending("amount")));
        assert_eq!(criteria.page, 1);
        assert_eq!(criteria.page_size.get(), 20);
        assert_eq!(criteria.field_filters.len(), 2);
        assert_eq!(criteria.field_filters[1].field, "email");
        let amount = criteria.amount_range.unwrap();
        assert_eq!(amount.min(), Decimal::new(10, 0));
        assert_eq!(amount.max(), Decimal::new(995, 1));
        assert!(criteria.date_range.is_some());
        assert_eq!(criteria.free_text.as_deref(), Some("OP-1"));
    }

    #[test]
    fn test_no_flags_keep_base_criteria() {
        let criteria = criteria_of(parse(&["url"])).apply(Criteria::default()).unwrap();
        assert_eq!(criteria, Criteria::default());
    }

    #[test]
    fn test_half_ranges_are_ignored() {
        let criteria = criteria_of(parse(&["url", "--min-amount", "5", "--from", "2024-01-01"]))
            .apply(Criteria::default())
            .unwrap();
        assert_eq!(criteria.amount_range, None);
        assert_eq!(criteria.date_range, None);
    }

    #[test]
    fn test_invalid_flags_are_reported() {
        let bad_amount = criteria_of(parse(&["url", "--min-amount", "1e3", "--max-amount", "3"]));
        assert!(matches!(bad_amount.apply(Criteria::default()), Err(InputError::InvalidAmount(_))));

        let inverted = criteria_of(parse(&["url", "--from", "2024-02-01", "--to", "2024-01-01"]));
        assert!(matches!(inverted.apply(Criteria::default()), Err(InputError::Model(_))));

        let zero = criteria_of(parse(&["url", "--page-size", "0"]));
        assert_eq!(zero.apply(Criteria::default()), Err(InputError::ZeroPageSize));
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("none").unwrap(), None);
        assert_eq!(parse_sort(" email ").unwrap(), Some(OrderBy::ascending("email")));
        assert!(parse_sort("-").is_err());
    }
}
