use std::num::NonZeroU32;

use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Status of a transaction as reported by the API.
///
/// Older deployments send a numeric code, newer ones a textual label; both
/// are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransactionStatus {
    Code(i64),
    Label(String),
}

impl TransactionStatus {
    /// Human-readable label: `1` is approved, `0` denied, any other code
    /// pending. Known labels are normalised, unknown ones kept verbatim.
    pub fn label(&self) -> String {
        match self {
            Self::Code(1) => "Approved".to_string(),
            Self::Code(0) => "Denied".to_string(),
            Self::Code(_) => "Pending".to_string(),
            Self::Label(label) => match label.to_lowercase().as_str() {
                "approved" | "aprobado" => "Approved".to_string(),
                "denied" | "denegado" => "Denied".to_string(),
                "pending" | "pendiente" => "Pending".to_string(),
                _ => label.clone(),
            },
        }
    }
}

/// `null` decodes as the type's default, same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A payment transaction row.
///
/// Mirrors the API row shape. Extra fields sent by the server are ignored
/// and missing or `null` ones fall back to their defaults, so a partial row
/// still decodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    #[serde(deserialize_with = "null_as_default")]
    pub id_transaction: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub merchant_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ip_country: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tx_concept: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tx_description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tx_descriptor: String,
    #[serde(deserialize_with = "null_as_default")]
    pub amount: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub tax_amount: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub tx_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cod_auth: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cod_oper: String,
    #[serde(deserialize_with = "null_as_default")]
    pub auth_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message_sys: String,
    #[serde(deserialize_with = "null_as_default")]
    pub auth_amount: String,
    /// Transaction timestamp as sent by the server.
    #[serde(deserialize_with = "null_as_default")]
    pub date_tms: String,
    #[serde(deserialize_with = "null_as_default")]
    pub avs: String,
    pub auth_cvv2: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub auth_currency: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub auth_date_gmt: String,
    #[serde(deserialize_with = "null_as_default")]
    pub auth_card_country_code: i64,
    pub auth_card_currency: Option<i64>,
    pub status: Option<TransactionStatus>,
    #[serde(deserialize_with = "null_as_default")]
    pub display_card_num: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cardholder_full_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub card_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tax: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub tax_retention: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub sub_total_com: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub total_com: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub inter_com: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub total_cost: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub total_reserve: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub blocked_funds: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub reserve_is_liberated: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub reserve_liberated_manually: bool,
    pub contains_claim: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub reserve_liberation_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reserve_liberation_reason: String,
    #[serde(deserialize_with = "null_as_default")]
    pub contain_open_claim: bool,
    pub id_related_transaction: Option<i64>,
    pub id_usr: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub id_merchant: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub id_activity: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub ip_sended_check: String,
    pub verification_requested: Option<bool>,
    pub verification_date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub in_revision: bool,
    pub revision_level: Option<i64>,
    pub revision_options: Option<String>,
    pub revision_approved_date: Option<String>,
    pub revision_approved_id_usr: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub pay_expired: bool,
}

impl Transaction {
    /// Stable identifier for display: the operation code, or the numeric id
    /// when the code is missing.
    pub fn row_id(&self) -> String {
        if self.cod_oper.is_empty() {
            self.id_transaction.to_string()
        } else {
            self.cod_oper.clone()
        }
    }

    pub fn status_label(&self) -> String {
        self.status
            .as_ref()
            .map(TransactionStatus::label)
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Parsed transaction timestamp, if the server sent a recognisable one.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.date_tms.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Some(with_offset.naive_local());
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }

    /// Timestamp as `DD/MM/YYYY HH:mm:ss`, or the raw text when it cannot be
    /// parsed.
    pub fn formatted_date(&self) -> String {
        match self.timestamp() {
            Some(timestamp) => timestamp.format("%d/%m/%Y %H:%M:%S").to_string(),
            None => self.date_tms.clone(),
        }
    }
}

/// One page of rows plus the number of rows matching the filters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionsResult {
    pub rows: Vec<Transaction>,
    pub total: u64,
}

impl TransactionsResult {
    pub fn total_pages(&self, page_size: NonZeroU32) -> u64 {
        total_pages(self.total, page_size)
    }
}

/// Pages needed to show `total` rows at `page_size` rows per page.
pub fn total_pages(total: u64, page_size: NonZeroU32) -> u64 {
    total.div_ceil(u64::from(page_size.get()))
}
