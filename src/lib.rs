//! Client for a paginated payment-transactions API.
//!
//! The [`controller::TransactionsController`] owns the filter state and turns
//! every change into a pair of requests (one page of rows, one total count)
//! that resolve independently. The `txgrid` binary drives it from the
//! command line.

pub mod api_client;
pub mod cli;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod input;
pub mod orchestrator;

mod test_utils;

pub use api_client::{HttpTransactionsApi, TransactionsApi};
pub use config::AppConfig;
pub use controller::TransactionsController;
pub use error::{FetchError, InputError};
pub use orchestrator::{FetchHandles, FetchOrchestrator};
