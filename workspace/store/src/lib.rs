//! Filter state store.
//!
//! Holds the current [`model::Criteria`] and the latest fetched rows and
//! total. All transitions go through the pure [`reduce`] function; the
//! [`TransactionsStore`] container publishes every new state to its
//! subscribers.

pub mod container;
pub mod event;
pub mod reducer;
pub mod state;

pub use container::{FetchTicket, TransactionsStore};
pub use event::StoreEvent;
pub use reducer::reduce;
pub use state::{FetchState, TrackStatus};
