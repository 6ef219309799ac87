use std::time::Duration;

use async_trait::async_trait;
use model::Transaction;
use query::TransactionsRequest;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, trace, warn};

use crate::config::AppConfig;
use crate::error::FetchError;

/// Transport for the two requests of a fetch cycle.
#[async_trait]
pub trait TransactionsApi: Send + Sync {
    /// Rows of the page described by `request`.
    async fn fetch_page(&self, request: &TransactionsRequest) -> Result<Vec<Transaction>, FetchError>;

    /// Total number of rows matching `request`.
    async fn fetch_count(&self, request: &TransactionsRequest) -> Result<u64, FetchError>;
}

/// [`TransactionsApi`] over HTTP.
pub struct HttpTransactionsApi {
    http_client: HttpClient,
    api_token: String,
}

impl HttpTransactionsApi {
    pub fn new(api_token: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_token: api_token.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        Self::new(config.api_token.clone(), config.request_timeout())
    }

    /// The token goes into `Authorization` as is, without a scheme.
    fn create_headers(&self) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&self.api_token)
            .map_err(|e| FetchError::Header(format!("Failed to create auth header: {}", e)))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    async fn handle_error_response(status: reqwest::StatusCode, response: reqwest::Response) -> FetchError {
        let body_text = response.text().await.unwrap_or_default();
        let description = error_description(&body_text);
        warn!("Transactions API returned {}: {}", status, body_text);

        FetchError::Http {
            status: status.as_u16(),
            description,
        }
    }

    async fn get_json(&self, request: &TransactionsRequest) -> Result<Value, FetchError> {
        let url = request.url();
        debug!("GET {} request to: {}", request.mode, url);

        let response = self
            .http_client
            .get(&url)
            .headers(self.create_headers()?)
            .send()
            .await
            .map_err(|e| {
                error!("{} request failed: {}", request.mode, e);
                FetchError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }

        response.json::<Value>().await.map_err(|e| {
            error!("Failed to parse {} response: {}", request.mode, e);
            FetchError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl TransactionsApi for HttpTransactionsApi {
    async fn fetch_page(&self, request: &TransactionsRequest) -> Result<Vec<Transaction>, FetchError> {
        trace!("Entering fetch_page");
        let body = self.get_json(request).await?;
        let rows = normalize_rows(&body);
        info!("Fetched {} transactions", rows.len());
        Ok(rows)
    }

    async fn fetch_count(&self, request: &TransactionsRequest) -> Result<u64, FetchError> {
        trace!("Entering fetch_count");
        let body = self.get_json(request).await?;
        let total = normalize_count(&body);
        info!("Counted {} transactions", total);
        Ok(total)
    }
}

/// `headerStatus.description` of an error body, if the body carries one.
pub fn error_description(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("headerStatus")?
        .get("description")?
        .as_str()
        .map(str::to_string)
}

/// Rows of a page body.
///
/// A body without a `data` array yields no rows. Entries that do not decode
/// as a transaction are skipped.
pub fn normalize_rows(body: &Value) -> Vec<Transaction> {
    let Some(items) = body.get("data").and_then(Value::as_array) else {
        debug!("Page response has no data array");
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            if !item.is_object() {
                warn!("Skipping row {}: not an object", index);
                return None;
            }
            match Transaction::deserialize(item) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!("Skipping row {}: {}", index, e);
                    None
                }
            }
        })
        .collect()
}

/// Total of a count body, tried in order: `{data: [n]}`,
/// `{data: [{count: n}]}`, `{total: n}`, `{count: n}`. Anything else is 0.
pub fn normalize_count(body: &Value) -> u64 {
    if let Some(first) = body.get("data").and_then(Value::as_array).and_then(|items| items.first()) {
        return match first {
            Value::Number(_) => count_value(first),
            other => other.get("count").and_then(count_value),
        }
        .unwrap_or(0);
    }

    body.get("total")
        .and_then(count_value)
        .or_else(|| body.get("count").and_then(count_value))
        .unwrap_or(0)
}

fn count_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().map(|f| if f.is_finite() && f > 0.0 { f as u64 } else { 0 })),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
