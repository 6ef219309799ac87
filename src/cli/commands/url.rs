use model::Criteria;
use query::{QueryBuilder, QueryMode};
use tracing::trace;

use crate::config::AppConfig;

/// Prints the page and count URLs without contacting the server.
pub fn print_urls(config: &AppConfig, criteria: &Criteria) {
    trace!("Entering print_urls function");
    let builder = QueryBuilder::new(config.endpoint.clone());
    println!("page:  {}", builder.build_url(criteria, QueryMode::Page));
    println!("count: {}", builder.build_url(criteria, QueryMode::Count));
}
