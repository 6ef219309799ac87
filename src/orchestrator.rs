use std::sync::Arc;

use query::{QueryBuilder, QueryMode};
use store::{StoreEvent, TransactionsStore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};

use crate::api_client::TransactionsApi;

/// Join handles of the two tasks spawned by one fetch cycle.
///
/// Dropping them detaches the tasks; they still report to the store.
#[derive(Debug)]
pub struct FetchHandles {
    pub page: JoinHandle<()>,
    pub count: JoinHandle<()>,
}

impl FetchHandles {
    /// Waits for both tracks to report.
    pub async fn join(self) {
        if let Err(e) = self.page.await {
            error!("Page task ended abnormally: {}", e);
        }
        if let Err(e) = self.count.await {
            error!("Count task ended abnormally: {}", e);
        }
    }
}

/// Issues the page and count requests for the store's current criteria.
#[derive(Clone)]
pub struct FetchOrchestrator {
    api: Arc<dyn TransactionsApi>,
    builder: QueryBuilder,
    store: TransactionsStore,
}

impl FetchOrchestrator {
    pub fn new(api: Arc<dyn TransactionsApi>, builder: QueryBuilder, store: TransactionsStore) -> Self {
        Self { api, builder, store }
    }

    pub fn store(&self) -> &TransactionsStore {
        &self.store
    }

    /// Starts a fetch cycle: both tracks go to loading, then the page and the
    /// count requests run as independent tasks. Each task reports its own
    /// outcome tagged with the cycle's generation, so a result that arrives
    /// after a newer cycle has started is dropped by the store.
    pub fn fetch(&self) -> FetchHandles {
        trace!("Entering fetch");
        let ticket = self.store.begin_fetch();
        let generation = ticket.generation;
        let page_request = self.builder.build_request(&ticket.criteria, QueryMode::Page);
        let count_request = self.builder.build_request(&ticket.criteria, QueryMode::Count);
        debug!("Fetch cycle {}: {}", generation, page_request.url());

        let page = {
            let api = Arc::clone(&self.api);
            let store = self.store.clone();
            tokio::spawn(async move {
                let event = match api.fetch_page(&page_request).await {
                    Ok(rows) => {
                        info!("Page of cycle {} loaded with {} rows", generation, rows.len());
                        StoreEvent::PageLoaded { generation, rows }
                    }
                    Err(e) => {
                        error!("Page of cycle {} failed: {}", generation, e);
                        StoreEvent::PageFailed {
                            generation,
                            message: e.user_message(),
                        }
                    }
                };
                store.dispatch(event);
            })
        };

        let count = {
            let api = Arc::clone(&self.api);
            let store = self.store.clone();
            tokio::spawn(async move {
                let event = match api.fetch_count(&count_request).await {
                    Ok(total) => {
                        info!("Count of cycle {} loaded: {}", generation, total);
                        StoreEvent::CountLoaded { generation, total }
                    }
                    Err(e) => {
                        error!("Count of cycle {} failed: {}", generation, e);
                        StoreEvent::CountFailed {
                            generation,
                            message: e.user_message(),
                        }
                    }
                };
                store.dispatch(event);
            })
        };

        FetchHandles { page, count }
    }
}
