use tracing::{debug, trace, warn};

use crate::event::StoreEvent;
use crate::state::{FetchState, TrackStatus};

/// Applies `event` to `state` and returns the new state.
///
/// Every filter change and every page-size change moves back to the first
/// page. A page change touches nothing else. Track results whose generation
/// is not the current one are dropped.
pub fn reduce(mut state: FetchState, event: StoreEvent) -> FetchState {
    trace!("Reducing {}", event.name());

    match event {
        StoreEvent::SetOrderBy(order_by) => {
            state.criteria.order_by = order_by;
            state.criteria.page = 0;
        }
        StoreEvent::AddFieldFilter(filter) => {
            if state.criteria.field_filters.iter().any(|existing| existing.id == filter.id) {
                warn!("Field filter {} already present, ignoring", filter.id);
                return state;
            }
            state.criteria.field_filters.push(filter);
            state.criteria.page = 0;
        }
        StoreEvent::RemoveFieldFilter(id) => {
            let before = state.criteria.field_filters.len();
            state.criteria.field_filters.retain(|filter| filter.id != id);
            if state.criteria.field_filters.len() == before {
                debug!("No field filter with id {}", id);
                return state;
            }
            state.criteria.page = 0;
        }
        StoreEvent::SetFieldFilters(filters) => {
            state.criteria.field_filters = filters;
            state.criteria.page = 0;
        }
        StoreEvent::SetFreeText(text) => {
            state.criteria.free_text = text;
            state.criteria.page = 0;
        }
        StoreEvent::SetAmountRange(range) => {
            state.criteria.amount_range = range;
            state.criteria.page = 0;
        }
        StoreEvent::SetDateRange(range) => {
            state.criteria.date_range = range;
            state.criteria.page = 0;
        }
        StoreEvent::SetPage(page) => {
            state.criteria.page = page;
        }
        StoreEvent::SetPageSize(page_size) => {
            state.criteria.page_size = page_size;
            state.criteria.page = 0;
        }
        StoreEvent::ClearAllFilters => {
            state.criteria = state.criteria.without_filters();
        }

        StoreEvent::FetchStarted => {
            state.generation += 1;
            state.data_track = TrackStatus::Loading;
            state.count_track = TrackStatus::Loading;
            state.error = None;
        }
        StoreEvent::PageLoaded { generation, rows } => {
            if is_stale(&state, generation, "page") {
                return state;
            }
            state.rows = rows;
            state.data_track = TrackStatus::Success;
        }
        StoreEvent::PageFailed { generation, message } => {
            if is_stale(&state, generation, "page") {
                return state;
            }
            state.rows.clear();
            state.error = Some(message);
            state.data_track = TrackStatus::Failed;
        }
        StoreEvent::CountLoaded { generation, total } => {
            if is_stale(&state, generation, "count") {
                return state;
            }
            state.total = total;
            state.count_track = TrackStatus::Success;
        }
        StoreEvent::CountFailed { generation, message } => {
            if is_stale(&state, generation, "count") {
                return state;
            }
            state.total = 0;
            state.error = Some(message);
            state.count_track = TrackStatus::Failed;
        }
    }

    state
}

fn is_stale(state: &FetchState, generation: u64, track: &str) -> bool {
    if generation != state.generation {
        debug!(
            "Discarding stale {} result from generation {} (current {})",
            track, generation, state.generation
        );
        return true;
    }
    false
}
