use std::fmt;

use model::Criteria;

use crate::conditional::render_conditional;

/// Aggregation directive sent instead of paging parameters when only the
/// number of matching rows is wanted.
pub const COUNT_DIRECTIVE: &str = "idTransaction::COUNT";

/// Which of the two requests derived from a criteria bundle to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryMode {
    /// One page of rows: `sort`, `limit`, `offset`, `conditional`.
    Page,
    /// Number of matching rows: `field`, `conditional`.
    Count,
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page => f.write_str("page"),
            Self::Count => f.write_str("count"),
        }
    }
}

/// A request descriptor: endpoint plus ordered, unencoded query
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionsRequest {
    pub mode: QueryMode,
    pub endpoint: String,
    pub params: Vec<(&'static str, String)>,
}

impl TransactionsRequest {
    /// Value of the first parameter named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Percent-encoded query string, without the leading `?`.
    pub fn query_string(&self) -> String {
        self.params
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full URL.
    pub fn url(&self) -> String {
        let query = self.query_string();
        if query.is_empty() {
            return self.endpoint.clone();
        }
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.endpoint, separator, query)
    }
}

/// Builds page and count requests against one transactions endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    endpoint: String,
}

impl QueryBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request descriptor for `criteria` in the given mode.
    ///
    /// Deterministic: equal criteria give equal requests. Field filter ids
    /// are never read.
    pub fn build_request(&self, criteria: &Criteria, mode: QueryMode) -> TransactionsRequest {
        let mut params: Vec<(&'static str, String)> = Vec::new();

        match mode {
            QueryMode::Count => {
                params.push(("field", COUNT_DIRECTIVE.to_string()));
            }
            QueryMode::Page => {
                if let Some(order_by) = &criteria.order_by {
                    params.push(("sort", order_by.to_string()));
                }
                params.push(("limit", criteria.page_size.get().to_string()));
                params.push(("offset", criteria.offset().to_string()));
            }
        }

        if let Some(conditional) = render_conditional(criteria) {
            params.push(("conditional", conditional));
        }

        let request = TransactionsRequest {
            mode,
            endpoint: self.endpoint.clone(),
            params,
        };
        tracing::trace!("Built {} request: {}", mode, request.url());
        request
    }

    /// Full URL for `criteria` in the given mode.
    pub fn build_url(&self, criteria: &Criteria, mode: QueryMode) -> String {
        self.build_request(criteria, mode).url()
    }
}
