#[cfg(test)]
pub mod test_utils {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::extract::{Query, RawQuery, State};
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use model::Transaction;
    use query::TransactionsRequest;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    use crate::api_client::TransactionsApi;
    use crate::config::AppConfig;
    use crate::error::FetchError;

    pub const TEST_TOKEN: &str = "test-token-123";
    pub const MOCK_PATH: &str = "/api/transactions";

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is read from RUST_LOG and defaults to WARN.
    pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Canned response of the mock API.
    #[derive(Debug, Clone)]
    pub struct MockResponse {
        pub status: StatusCode,
        pub body: String,
        pub delay: Option<Duration>,
    }

    impl MockResponse {
        pub fn json(body: serde_json::Value) -> Self {
            Self {
                status: StatusCode::OK,
                body: body.to_string(),
                delay: None,
            }
        }

        pub fn error(status: StatusCode, body: impl Into<String>) -> Self {
            Self {
                status,
                body: body.into(),
                delay: None,
            }
        }

        pub fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    /// A request as seen by the mock API.
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub raw_query: String,
        pub params: HashMap<String, String>,
        pub headers: HeaderMap,
    }

    impl RecordedRequest {
        pub fn is_count(&self) -> bool {
            self.params.contains_key("field")
        }

        pub fn header(&self, name: header::HeaderName) -> Option<&str> {
            self.headers.get(name).and_then(|value| value.to_str().ok())
        }
    }

    #[derive(Clone)]
    struct MockState {
        page: MockResponse,
        count: MockResponse,
        requests: Arc<Mutex<Vec<RecordedRequest>>>,
    }

    /// In-process transactions API bound on an ephemeral port.
    pub struct MockApiServer {
        pub endpoint: String,
        requests: Arc<Mutex<Vec<RecordedRequest>>>,
    }

    impl MockApiServer {
        pub async fn start(page: MockResponse, count: MockResponse) -> Self {
            let requests = Arc::new(Mutex::new(Vec::new()));
            let state = MockState {
                page,
                count,
                requests: Arc::clone(&requests),
            };
            let app = Router::new().route(MOCK_PATH, get(mock_transactions)).with_state(state);

            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind mock API");
            let address = listener.local_addr().expect("Mock API has no address");
            tokio::spawn(async move {
                axum::serve(listener, app).await.expect("Mock API stopped");
            });

            Self {
                endpoint: format!("http://{}{}", address, MOCK_PATH),
                requests,
            }
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn page_requests(&self) -> Vec<RecordedRequest> {
            self.requests().into_iter().filter(|request| !request.is_count()).collect()
        }

        pub fn count_requests(&self) -> Vec<RecordedRequest> {
            self.requests().into_iter().filter(RecordedRequest::is_count).collect()
        }

        /// Configuration pointing at this server.
        pub fn config(&self) -> AppConfig {
            AppConfig {
                endpoint: self.endpoint.clone(),
                api_token: TEST_TOKEN.to_string(),
                request_timeout_ms: 5_000,
                ..AppConfig::default()
            }
        }
    }

    async fn mock_transactions(
        State(state): State<MockState>,
        RawQuery(raw_query): RawQuery,
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
        let request = RecordedRequest {
            raw_query: raw_query.unwrap_or_default(),
            params,
            headers,
        };
        let response = if request.is_count() { state.count } else { state.page };
        state.requests.lock().unwrap().push(request);

        if let Some(delay) = response.delay {
            tokio::time::sleep(delay).await;
        }
        (
            response.status,
            [(header::CONTENT_TYPE, "application/json")],
            response.body,
        )
    }

    type Scripted<T> = Mutex<VecDeque<(Option<oneshot::Receiver<()>>, Result<T, FetchError>)>>;

    /// In-memory [`TransactionsApi`] answering from a script.
    ///
    /// Each scripted answer may wait on a gate so tests can decide the order
    /// in which responses arrive. Once the script is exhausted the fallback
    /// answers are returned.
    #[derive(Default)]
    pub struct ScriptedApi {
        pages: Scripted<Vec<Transaction>>,
        counts: Scripted<u64>,
        fallback_rows: Vec<Transaction>,
        fallback_total: u64,
        page_calls: AtomicUsize,
        count_calls: AtomicUsize,
        page_requests: Mutex<Vec<TransactionsRequest>>,
    }

    impl ScriptedApi {
        pub fn new(fallback_rows: Vec<Transaction>, fallback_total: u64) -> Self {
            Self {
                fallback_rows,
                fallback_total,
                ..Self::default()
            }
        }

        pub fn push_page(&self, result: Result<Vec<Transaction>, FetchError>) {
            self.pages.lock().unwrap().push_back((None, result));
        }

        /// Scripts a page answer held back until the returned sender fires.
        pub fn push_gated_page(&self, result: Result<Vec<Transaction>, FetchError>) -> oneshot::Sender<()> {
            let (sender, receiver) = oneshot::channel();
            self.pages.lock().unwrap().push_back((Some(receiver), result));
            sender
        }

        pub fn push_gated_count(&self, result: Result<u64, FetchError>) -> oneshot::Sender<()> {
            let (sender, receiver) = oneshot::channel();
            self.counts.lock().unwrap().push_back((Some(receiver), result));
            sender
        }

        pub fn page_calls(&self) -> usize {
            self.page_calls.load(Ordering::SeqCst)
        }

        pub fn count_calls(&self) -> usize {
            self.count_calls.load(Ordering::SeqCst)
        }

        pub fn page_requests(&self) -> Vec<TransactionsRequest> {
            self.page_requests.lock().unwrap().clone()
        }
    }

    async fn answer<T>(script: &Scripted<T>, fallback: impl FnOnce() -> T) -> Result<T, FetchError> {
        let next = script.lock().unwrap().pop_front();
        match next {
            Some((gate, result)) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                result
            }
            None => Ok(fallback()),
        }
    }

    #[async_trait]
    impl TransactionsApi for ScriptedApi {
        async fn fetch_page(&self, request: &TransactionsRequest) -> Result<Vec<Transaction>, FetchError> {
            self.page_calls.fetch_add(1, Ordering::SeqCst);
            self.page_requests.lock().unwrap().push(request.clone());
            answer(&self.pages, || self.fallback_rows.clone()).await
        }

        async fn fetch_count(&self, _request: &TransactionsRequest) -> Result<u64, FetchError> {
            self.count_calls.fetch_add(1, Ordering::SeqCst);
            answer(&self.counts, || self.fallback_total).await
        }
    }

    pub fn transaction(id: i64, code: &str) -> Transaction {
        Transaction {
            id_transaction: id,
            cod_oper: code.to_string(),
            ..Transaction::default()
        }
    }
}
