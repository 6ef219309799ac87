use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::{ModelError, Result};

/// Column the list is sorted by until the user picks another one.
pub const DEFAULT_ORDER_FIELD: &str = "dateTms";

/// Rows per page until the user picks another size.
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = NonZeroU32::new(10).unwrap();

static FILTER_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A single sort key. Displayed and parsed in the wire form used by the
/// `sort` query parameter: `field` for ascending, `-field` for descending.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderBy {
    field: String,
    descending: bool,
}

impl OrderBy {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }

    /// Same column, opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            field: self.field.clone(),
            descending: !self.descending,
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            f.write_str(&self.field)
        }
    }
}

impl FromStr for OrderBy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (field, descending) = match trimmed.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };
        if field.is_empty() || field.starts_with('-') {
            return Err(ModelError::InvalidOrderBy(s.to_string()));
        }
        Ok(Self {
            field: field.to_string(),
            descending,
        })
    }
}

/// A user-added partial-match constraint on one field.
///
/// The `id` only addresses the filter for removal; it is never part of a
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
    pub id: String,
}

impl FieldFilter {
    /// Creates a filter with a fresh id built from the field name and the
    /// creation time. The value is stored trimmed.
    pub fn new(field: impl Into<String>, value: impl AsRef<str>) -> Result<Self> {
        let field = field.into().trim().to_string();
        if field.is_empty() {
            return Err(ModelError::EmptyFilterField);
        }
        let value = value.as_ref().trim().to_string();
        if value.is_empty() {
            return Err(ModelError::EmptyFilterValue(field));
        }
        let sequence = FILTER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let id = format!("{}-{}-{}", field, Utc::now().timestamp_millis(), sequence);
        tracing::trace!("Created field filter {} ({} ~ {})", id, field, value);
        Ok(Self { field, value, id })
    }

    /// Creates a filter with a caller-chosen id.
    pub fn with_id(field: impl Into<String>, value: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            id: id.into(),
        }
    }
}

/// Inclusive amount bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    min: Decimal,
    max: Decimal,
}

impl AmountRange {
    pub fn new(min: Decimal, max: Decimal) -> Result<Self> {
        if min > max {
            return Err(ModelError::InvertedAmountRange {
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> Decimal {
        self.min
    }

    pub fn max(&self) -> Decimal {
        self.max
    }
}

/// Inclusive calendar-day bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ModelError::InvertedDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Field a free-text search is matched against: `email` when the text
/// looks like an address, the operation code otherwise.
pub fn free_text_field(text: &str) -> &'static str {
    if text.contains('@') { "email" } else { "codOper" }
}

/// The full filter/sort/pagination input of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria {
    pub free_text: Option<String>,
    pub field_filters: Vec<FieldFilter>,
    pub amount_range: Option<AmountRange>,
    pub date_range: Option<DateRange>,
    pub order_by: Option<OrderBy>,
    /// Zero-based page index.
    pub page: u32,
    pub page_size: NonZeroU32,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            free_text: None,
            field_filters: Vec::new(),
            amount_range: None,
            date_range: None,
            order_by: Some(OrderBy::ascending(DEFAULT_ORDER_FIELD)),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Criteria {
    /// Number of rows skipped before the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size.get())
    }

    /// Free text that will actually be sent, if any.
    pub fn search_text(&self) -> Option<&str> {
        self.free_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn has_active_filters(&self) -> bool {
        self.search_text().is_some()
            || !self.field_filters.is_empty()
            || self.amount_range.is_some()
            || self.date_range.is_some()
    }

    /// Same criteria with every filter dimension unset and the first page
    /// selected. Sort key and page size are kept.
    pub fn without_filters(&self) -> Self {
        Self {
            order_by: self.order_by.clone(),
            page_size: self.page_size,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by_round_trips_wire_form() {
        let desc: OrderBy = "-amount".parse().unwrap();
        assert_eq!(desc.field(), "amount");
        assert!(desc.is_descending());
        assert_eq!(desc.to_string(), "-amount");

        let asc: OrderBy = "codOper".parse().unwrap();
        assert!(!asc.is_descending());
        assert_eq!(asc.to_string(), "codOper");
        assert_eq!(asc.reversed().to_string(), "-codOper");
    }

    #[test]
    fn test_order_by_rejects_empty_keys() {
        assert!("".parse::<OrderBy>().is_err());
        assert!("-".parse::<OrderBy>().is_err());
        assert!("--amount".parse::<OrderBy>().is_err());
    }

    #[test]
    fn test_field_filter_trims_and_generates_unique_ids() {
        let first = FieldFilter::new("status", "  1 ").unwrap();
        let second = FieldFilter::new("status", "1").unwrap();
        assert_eq!(first.value, "1");
        assert!(first.id.starts_with("status-"));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_field_filter_rejects_blank_input() {
        assert_eq!(FieldFilter::new("", "x"), Err(ModelError::EmptyFilterField));
        assert_eq!(
            FieldFilter::new("email", "   "),
            Err(ModelError::EmptyFilterValue("email".to_string()))
        );
    }

    #[test]
    fn test_ranges_reject_inverted_bounds() {
        assert!(AmountRange::new(Decimal::new(10, 0), Decimal::new(5, 0)).is_err());
        let amounts = AmountRange::new(Decimal::new(5, 0), Decimal::new(5, 0)).unwrap();
        assert_eq!(amounts.min(), amounts.max());

        let start = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(DateRange::new(start, end).is_err());
        assert_eq!(DateRange::new(end, start).unwrap().end(), start);
    }

    #[test]
    fn test_offset_is_page_times_page_size() {
        let criteria = Criteria {
            page: 3,
            page_size: NonZeroU32::new(20).unwrap(),
            ..Criteria::default()
        };
        assert_eq!(criteria.offset(), 60);
    }

    #[test]
    fn test_without_filters_keeps_sort_and_page_size() {
        let criteria = Criteria {
            free_text: Some("abc".to_string()),
            field_filters: vec![FieldFilter::with_id("status", "1", "status-1")],
            amount_range: Some(AmountRange::new(Decimal::new(1, 0), Decimal::new(2, 0)).unwrap()),
            order_by: Some(OrderBy::descending("amount")),
            page: 4,
            page_size: NonZeroU32::new(50).unwrap(),
            ..Criteria::default()
        };
        let cleared = criteria.without_filters();
        assert!(!cleared.has_active_filters());
        assert_eq!(cleared.page, 0);
        assert_eq!(cleared.order_by, Some(OrderBy::descending("amount")));
        assert_eq!(cleared.page_size.get(), 50);
    }

    #[test]
    fn test_free_text_field_picks_email_for_addresses() {
        assert_eq!(free_text_field("someone@example.com"), "email");
        assert_eq!(free_text_field("OP-123"), "codOper");
    }

    #[test]
    fn test_blank_search_text_is_not_a_filter() {
        let criteria = Criteria {
            free_text: Some("   ".to_string()),
            ..Criteria::default()
        };
        assert_eq!(criteria.search_text(), None);
        assert!(!criteria.has_active_filters());
    }
}
