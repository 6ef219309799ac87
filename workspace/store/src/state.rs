use model::{total_pages, Criteria, Transaction, TransactionsResult};

/// Lifecycle of one of the two request tracks (page rows, total count).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

impl TrackStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Everything a front-end needs to render the transactions list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchState {
    pub criteria: Criteria,
    /// Rows of the current page, replaced wholesale on every page load.
    pub rows: Vec<Transaction>,
    /// Rows matching the filters across all pages.
    pub total: u64,
    pub data_track: TrackStatus,
    pub count_track: TrackStatus,
    /// Most recent failure of either track.
    pub error: Option<String>,
    /// Marker of the latest fetch cycle. Results carrying an older marker
    /// are discarded.
    pub generation: u64,
}

impl FetchState {
    pub fn with_criteria(criteria: Criteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    pub fn loading(&self) -> bool {
        self.data_track.is_loading()
    }

    pub fn count_loading(&self) -> bool {
        self.count_track.is_loading()
    }

    /// Neither track has a request in flight.
    pub fn is_settled(&self) -> bool {
        !self.loading() && !self.count_loading()
    }

    pub fn has_active_filters(&self) -> bool {
        self.criteria.has_active_filters()
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.total, self.criteria.page_size)
    }

    /// Loaded rows and total as one result.
    pub fn result(&self) -> TransactionsResult {
        TransactionsResult {
            rows: self.rows.clone(),
            total: self.total,
        }
    }
}
