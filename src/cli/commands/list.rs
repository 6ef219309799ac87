use std::sync::Arc;

use anyhow::{bail, Result};
use model::Criteria;
use tracing::{debug, error, info, trace};

use crate::cli::render::render_state;
use crate::config::AppConfig;
use crate::controller::TransactionsController;

/// Runs one fetch cycle and prints the page. Fails when either request
/// failed, after printing whatever did load.
pub async fn list_transactions(config: Arc<AppConfig>, criteria: Criteria) -> Result<()> {
    trace!("Entering list_transactions function");
    debug!("Endpoint: {}", config.endpoint);

    let controller = TransactionsController::with_criteria(&config, criteria)?;
    controller.refresh().join().await;
    let state = controller.state();

    println!("{}", render_state(&state));

    if let Some(message) = &state.error {
        error!("Listing transactions failed: {}", message);
        bail!("{}", message);
    }

    info!("Listed {} of {} transactions", state.rows.len(), state.total);
    Ok(())
}
