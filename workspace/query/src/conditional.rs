use std::fmt;

use chrono::NaiveDate;
use model::{free_text_field, Criteria};
use rust_decimal::Decimal;

/// Operator token for a partial ("like") match.
pub const OP_CONTAINS: &str = "$lk";
/// Operator token for an inclusive range.
pub const OP_BETWEEN: &str = "$bt";
/// Separates the two bounds of a range.
pub const RANGE_SEPARATOR: &str = "::";
/// Separates clauses inside the `conditional` parameter.
pub const CLAUSE_SEPARATOR: &str = "|";

pub const DATE_FIELD: &str = "dateTms";
pub const AMOUNT_FIELD: &str = "amount";

/// One clause of the composite predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `field` contains `value` anywhere.
    Contains { field: String, value: String },
    /// `field` lies between `low` and `high`, both inclusive.
    Between { field: String, low: String, high: String },
}

impl Condition {
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whole calendar days: start at midnight, end at the last second.
    pub fn date_between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::Between {
            field: DATE_FIELD.to_string(),
            low: format!("{}T00:00:00", start.format("%Y-%m-%d")),
            high: format!("{}T23:59:59", end.format("%Y-%m-%d")),
        }
    }

    pub fn amount_between(min: Decimal, max: Decimal) -> Self {
        Self::Between {
            field: AMOUNT_FIELD.to_string(),
            low: min.normalize().to_string(),
            high: max.normalize().to_string(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains { field, value } => write!(f, "{field}{OP_CONTAINS}%{value}%"),
            Self::Between { field, low, high } => {
                write!(f, "{field}{OP_BETWEEN}{low}{RANGE_SEPARATOR}{high}")
            }
        }
    }
}

/// Clauses for every active filter of `criteria`, in wire order: free text,
/// field filters, date range, amount range.
pub fn conditions(criteria: &Criteria) -> Vec<Condition> {
    let mut clauses = Vec::new();

    if let Some(text) = criteria.search_text() {
        clauses.push(Condition::contains(free_text_field(text), text));
    }

    for filter in &criteria.field_filters {
        let value = filter.value.trim();
        if filter.field.is_empty() || value.is_empty() {
            tracing::trace!("Skipping blank field filter {}", filter.id);
            continue;
        }
        clauses.push(Condition::contains(filter.field.as_str(), value));
    }

    if let Some(range) = criteria.date_range {
        clauses.push(Condition::date_between(range.start(), range.end()));
    }

    if let Some(range) = criteria.amount_range {
        clauses.push(Condition::amount_between(range.min(), range.max()));
    }

    clauses
}

/// The unencoded `conditional` value, or `None` when no filter is active.
pub fn render_conditional(criteria: &Criteria) -> Option<String> {
    let clauses = conditions(criteria);
    if clauses.is_empty() {
        return None;
    }
    Some(
        clauses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(CLAUSE_SEPARATOR),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{AmountRange, DateRange, FieldFilter};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_no_filters_no_conditional() {
        assert_eq!(render_conditional(&Criteria::default()), None);
    }

    #[test]
    fn test_clause_order_is_fields_then_dates_then_amounts() {
        let criteria = Criteria {
            amount_range: Some(AmountRange::new(Decimal::new(100, 0), Decimal::new(25050, 2)).unwrap()),
            date_range: Some(DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap()),
            field_filters: vec![
                FieldFilter::with_id("email", "shop", "email-1"),
                FieldFilter::with_id("status", "1", "status-2"),
            ],
            ..Criteria::default()
        };

        assert_eq!(
            render_conditional(&criteria).unwrap(),
            "email$lk%shop%|status$lk%1%|dateTms$bt2024-01-01T00:00:00::2024-01-31T23:59:59|amount$bt100::250.5"
        );
    }

    #[test]
    fn test_free_text_becomes_leading_contains_clause() {
        let criteria = Criteria {
            free_text: Some(" buyer@example.com ".to_string()),
            field_filters: vec![FieldFilter::with_id("cardType", "VISA", "cardType-1")],
            ..Criteria::default()
        };
        assert_eq!(
            render_conditional(&criteria).unwrap(),
            "email$lk%buyer@example.com%|cardType$lk%VISA%"
        );

        let by_code = Criteria {
            free_text: Some("OP-77".to_string()),
            ..Criteria::default()
        };
        assert_eq!(render_conditional(&by_code).unwrap(), "codOper$lk%OP-77%");
    }

    #[test]
    fn test_blank_field_filters_are_skipped() {
        let criteria = Criteria {
            field_filters: vec![
                FieldFilter::with_id("email", "   ", "email-1"),
                FieldFilter::with_id("", "x", "blank-2"),
            ],
            ..Criteria::default()
        };
        assert_eq!(render_conditional(&criteria), None);
    }

    #[test]
    fn test_single_day_range_spans_whole_day() {
        let day = date(2023, 12, 24);
        assert_eq!(
            Condition::date_between(day, day).to_string(),
            "dateTms$bt2023-12-24T00:00:00::2023-12-24T23:59:59"
        );
    }
}
