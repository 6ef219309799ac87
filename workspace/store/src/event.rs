use std::num::NonZeroU32;

use model::{AmountRange, DateRange, FieldFilter, OrderBy, Transaction};

/// A state transition request.
///
/// The first group mutates the criteria; the second reports progress of the
/// page and count requests. Results carry the generation of the fetch cycle
/// they belong to.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    SetOrderBy(Option<OrderBy>),
    AddFieldFilter(FieldFilter),
    /// Removes the field filter with this id.
    RemoveFieldFilter(String),
    SetFieldFilters(Vec<FieldFilter>),
    SetFreeText(Option<String>),
    SetAmountRange(Option<AmountRange>),
    SetDateRange(Option<DateRange>),
    SetPage(u32),
    SetPageSize(NonZeroU32),
    ClearAllFilters,

    /// A new fetch cycle begins for both tracks.
    FetchStarted,
    PageLoaded { generation: u64, rows: Vec<Transaction> },
    PageFailed { generation: u64, message: String },
    CountLoaded { generation: u64, total: u64 },
    CountFailed { generation: u64, message: String },
}

impl StoreEvent {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetOrderBy(_) => "set_order_by",
            Self::AddFieldFilter(_) => "add_field_filter",
            Self::RemoveFieldFilter(_) => "remove_field_filter",
            Self::SetFieldFilters(_) => "set_field_filters",
            Self::SetFreeText(_) => "set_free_text",
            Self::SetAmountRange(_) => "set_amount_range",
            Self::SetDateRange(_) => "set_date_range",
            Self::SetPage(_) => "set_page",
            Self::SetPageSize(_) => "set_page_size",
            Self::ClearAllFilters => "clear_all_filters",
            Self::FetchStarted => "fetch_started",
            Self::PageLoaded { .. } => "page_loaded",
            Self::PageFailed { .. } => "page_failed",
            Self::CountLoaded { .. } => "count_loaded",
            Self::CountFailed { .. } => "count_failed",
        }
    }
}
