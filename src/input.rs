//! Validation of raw user input before it reaches the store.

use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::NaiveDate;
use model::{AmountRange, DateRange, FieldFilter};
use once_cell::sync::OnceCell;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::InputError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses an amount field. Blank input means "unset".
pub fn parse_amount_input(input: &str) -> Result<Option<Decimal>, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    // Digits with at most one decimal point; signs and exponents are refused
    static AMOUNT_PATTERN: OnceCell<Regex> = OnceCell::new();
    let amount_regex = AMOUNT_PATTERN.get_or_init(|| Regex::new(r"^\d*\.?\d*$").unwrap());
    if !amount_regex.is_match(trimmed) {
        return Err(InputError::InvalidAmount(input.to_string()));
    }

    // "12." and ".5" pass the pattern but not every decimal parser
    let normalized = trimmed.strip_suffix('.').unwrap_or(trimmed);
    let normalized = if normalized.starts_with('.') {
        format!("0{}", normalized)
    } else {
        normalized.to_string()
    };

    Decimal::from_str(&normalized)
        .map(Some)
        .map_err(|_| InputError::InvalidAmount(input.to_string()))
}

/// Parses a `YYYY-MM-DD` date field. Blank input means "unset".
pub fn parse_date_input(input: &str) -> Result<Option<NaiveDate>, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|_| InputError::InvalidDate(input.to_string()))
}

pub fn validate_page_size(page_size: u32) -> Result<NonZeroU32, InputError> {
    NonZeroU32::new(page_size).ok_or(InputError::ZeroPageSize)
}

/// Builds an amount range from two optional bounds. The range only exists
/// once both bounds are given.
pub fn amount_range(min: Option<Decimal>, max: Option<Decimal>) -> Result<Option<AmountRange>, InputError> {
    match (min, max) {
        (Some(min), Some(max)) => Ok(Some(AmountRange::new(min, max)?)),
        _ => Ok(None),
    }
}

/// Same as [`amount_range`] for dates.
pub fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Option<DateRange>, InputError> {
    match (start, end) {
        (Some(start), Some(end)) => Ok(Some(DateRange::new(start, end)?)),
        _ => Ok(None),
    }
}

/// Parses `field=value` into a new field filter.
pub fn parse_filter_input(input: &str) -> Result<FieldFilter, InputError> {
    let (field, value) = input
        .split_once('=')
        .ok_or_else(|| InputError::InvalidFilter(input.to_string()))?;
    Ok(FieldFilter::new(field.trim(), value)?)
}
