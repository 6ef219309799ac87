//! Turns a [`model::Criteria`] into the request URLs understood by the
//! transactions API.
//!
//! Two requests are derived from the same criteria: the page of rows and the
//! total count. Both share the `conditional` predicate; only the page
//! request carries `sort`, `limit` and `offset`.

pub mod builder;
pub mod conditional;

pub use builder::{QueryBuilder, QueryMode, TransactionsRequest, COUNT_DIRECTIVE};
pub use conditional::{render_conditional, Condition};
