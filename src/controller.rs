use std::sync::Arc;
use std::time::Duration;

use model::catalog::is_filterable;
use model::{AmountRange, Criteria, DateRange, FieldFilter, OrderBy};
use query::QueryBuilder;
use store::{FetchState, StoreEvent, TransactionsStore};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use crate::api_client::{HttpTransactionsApi, TransactionsApi};
use crate::config::AppConfig;
use crate::debounce::Debouncer;
use crate::error::InputError;
use crate::input::validate_page_size;
use crate::orchestrator::{FetchHandles, FetchOrchestrator};

/// One commit function per filter dimension. Every commit updates the store
/// and starts a fetch cycle; free-text search goes through a debouncer
/// first.
pub struct TransactionsController {
    orchestrator: FetchOrchestrator,
    search: Debouncer<Option<String>>,
}

impl TransactionsController {
    pub fn new(orchestrator: FetchOrchestrator, debounce: Duration) -> Self {
        let committer = orchestrator.clone();
        let search = Debouncer::new(debounce, move |text: Option<String>| {
            debug!("Committing search text {:?}", text);
            committer.store().dispatch(StoreEvent::SetFreeText(text));
            committer.fetch();
        });

        Self { orchestrator, search }
    }

    /// Controller over `api`, starting from `criteria`.
    pub fn with_api_and_criteria(config: &AppConfig, api: Arc<dyn TransactionsApi>, criteria: Criteria) -> Self {
        let store = TransactionsStore::new(criteria);
        let orchestrator = FetchOrchestrator::new(api, QueryBuilder::new(config.endpoint.clone()), store);
        Self::new(orchestrator, config.debounce())
    }

    pub fn with_api(config: &AppConfig, api: Arc<dyn TransactionsApi>) -> anyhow::Result<Self> {
        Ok(Self::with_api_and_criteria(config, api, config.initial_criteria()?))
    }

    /// HTTP controller starting from `criteria` instead of the configured
    /// defaults.
    pub fn with_criteria(config: &AppConfig, criteria: Criteria) -> anyhow::Result<Self> {
        let api = HttpTransactionsApi::from_config(config)?;
        Ok(Self::with_api_and_criteria(config, Arc::new(api), criteria))
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Self::with_criteria(config, config.initial_criteria()?)
    }

    pub fn store(&self) -> &TransactionsStore {
        self.orchestrator.store()
    }

    pub fn state(&self) -> FetchState {
        self.store().state()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.store().subscribe()
    }

    fn commit(&self, event: StoreEvent) -> FetchHandles {
        trace!("Committing {}", event.name());
        self.store().dispatch(event);
        self.orchestrator.fetch()
    }

    /// Re-runs the current criteria.
    pub fn refresh(&self) -> FetchHandles {
        self.orchestrator.fetch()
    }

    pub fn set_order_by(&self, order_by: Option<OrderBy>) -> FetchHandles {
        self.commit(StoreEvent::SetOrderBy(order_by))
    }

    /// Adds a `field contains value` filter and returns its id. Fields
    /// outside the catalog are still sent; the server decides.
    pub fn add_field_filter(&self, field: &str, value: &str) -> Result<(String, FetchHandles), InputError> {
        let filter = FieldFilter::new(field, value)?;
        if !is_filterable(&filter.field) {
            warn!("Filtering on {} which is not a catalog filter field", filter.field);
        }
        let id = filter.id.clone();
        info!("Adding filter {} ({} contains {:?})", id, filter.field, filter.value);
        Ok((id, self.commit(StoreEvent::AddFieldFilter(filter))))
    }

    pub fn remove_field_filter(&self, id: &str) -> FetchHandles {
        self.commit(StoreEvent::RemoveFieldFilter(id.to_string()))
    }

    pub fn set_amount_range(&self, range: Option<AmountRange>) -> FetchHandles {
        self.commit(StoreEvent::SetAmountRange(range))
    }

    pub fn set_date_range(&self, range: Option<DateRange>) -> FetchHandles {
        self.commit(StoreEvent::SetDateRange(range))
    }

    /// Selects a zero-based page. Filters are left untouched.
    pub fn set_page(&self, page: u32) -> FetchHandles {
        self.commit(StoreEvent::SetPage(page))
    }

    pub fn set_page_size(&self, page_size: u32) -> Result<FetchHandles, InputError> {
        let page_size = validate_page_size(page_size)?;
        Ok(self.commit(StoreEvent::SetPageSize(page_size)))
    }

    /// Drops every filter, including search text still waiting in the
    /// debouncer.
    pub fn clear_all_filters(&self) -> FetchHandles {
        self.search.cancel();
        self.commit(StoreEvent::ClearAllFilters)
    }

    /// Schedules a free-text search. Blank text clears the search.
    pub fn search(&self, text: &str) {
        let trimmed = text.trim();
        let value = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self.search.push(value);
    }

    pub fn search_pending(&self) -> bool {
        self.search.is_pending()
    }
}
