//! Data model shared by the query builder, the state store and the client.
//!
//! `Criteria` is the full filter/sort/pagination input of one fetch;
//! `Transaction` is the row shape returned by the transactions API.

pub mod catalog;
pub mod criteria;
pub mod error;
pub mod transaction;

pub use criteria::{
    free_text_field, AmountRange, Criteria, DateRange, FieldFilter, OrderBy, DEFAULT_ORDER_FIELD,
    DEFAULT_PAGE_SIZE,
};
pub use error::{ModelError, Result};
pub use transaction::{total_pages, Transaction, TransactionStatus, TransactionsResult};

// Re-export tracing for use in this crate
pub use tracing;
