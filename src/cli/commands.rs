pub mod browse;
pub mod list;
pub mod url;

pub use browse::browse;
pub use list::list_transactions;
pub use url::print_urls;
