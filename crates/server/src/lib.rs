//! HTTP surface of the impressions ETL job.
//!
//! Every route funnels into [`EtlPipeline`]; the handlers only parse and
//! validate dates and map outcomes to status codes.

pub mod error;
mod handlers;

use crate::error::ServerError;
use axum::{
    Router,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use engine_core::pipeline::EtlPipeline;
use std::{future::IntoFuture, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// How long in-flight requests may keep running once shutdown is requested.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: EtlPipeline,
    /// Source of "now" for the default `/run` date.
    pub clock: Clock,
}

impl AppState {
    pub fn new(pipeline: EtlPipeline) -> Self {
        Self {
            pipeline,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/run", get(handlers::run_single))
        .route("/batch", get(handlers::run_batch))
        .route("/reprocess", post(handlers::reprocess))
        .route("/health", get(handlers::health_check))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn bind(addr: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr).await.map_err(|source| ServerError::Bind {
        addr: addr.to_string(),
        source,
    })
}

/// Serves until `shutdown` is cancelled, then waits up to [`DRAIN_TIMEOUT`]
/// for open requests to finish.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let addr = listener.local_addr()?;
    info!("Impressions ETL listening on {addr}");

    let signal = shutdown.clone();
    let server = axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { signal.cancelled().await })
        .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        result = &mut server => return result.map_err(ServerError::from),
        _ = shutdown.cancelled() => {}
    }

    info!("Shutdown requested, draining open connections");
    match tokio::time::timeout(DRAIN_TIMEOUT, server).await {
        Ok(result) => {
            info!("HTTP server closed");
            result.map_err(ServerError::from)
        }
        Err(_) => {
            warn!("Forcing shutdown after {:?}", DRAIN_TIMEOUT);
            Err(ServerError::DrainTimeout(DRAIN_TIMEOUT))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use chrono::TimeZone;
    use connectors::warehouse::base::{
        adapter::{QueryRequest, QueryResponse, WarehouseAdapter, WarehouseKind},
        error::WarehouseError,
    };
    use engine_core::etl::EtlOptions;
    use model::{
        core::{
            table::TableIdent,
            value::{FieldValue, Value},
        },
        records::row::RowData,
    };
    use serde_json::{Value as Json, json};
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Answers counts with a fixed value and rejects any statement that
    /// mentions one of `failing` (matches the date literal in the
    /// aggregation query).
    struct StubWarehouse {
        count: i64,
        failing: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl StubWarehouse {
        fn new(count: i64) -> Self {
            Self {
                count,
                failing: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(mut self, needle: &'static str) -> Self {
            self.failing.push(needle);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WarehouseAdapter for StubWarehouse {
        async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, WarehouseError> {
            self.calls.lock().unwrap().push(request.sql.clone());

            if request.sql.starts_with("CREATE OR REPLACE")
                && self.failing.iter().any(|n| request.sql.contains(n))
            {
                return Err(WarehouseError::Query("Access Denied".into()));
            }

            if request.sql.starts_with("SELECT COUNT") {
                let row = RowData::new(vec![FieldValue {
                    name: "row_count".into(),
                    value: Value::Int(self.count),
                }]);
                return Ok(QueryResponse {
                    rows: vec![row],
                    affected_rows: None,
                });
            }
            Ok(QueryResponse::default())
        }

        fn kind(&self) -> WarehouseKind {
            WarehouseKind::Other("stub")
        }
    }

    fn app(warehouse: Arc<StubWarehouse>) -> Router {
        let destination = TableIdent::new("rfs-proj", "sg_reports_tmp", "signage_impressions");
        let pipeline = EtlPipeline::new(warehouse, destination, EtlOptions::default());
        // 12:00 UTC on the 23rd is the 23rd in Tokyo
        let now = Utc.with_ymd_and_hms(2025, 3, 23, 12, 0, 0).unwrap();
        router(AppState::new(pipeline).with_clock(Arc::new(move || now)))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Json) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_run_with_explicit_date() {
        let warehouse = Arc::new(StubWarehouse::new(3));
        let (status, body) = send(app(warehouse), get("/run?date=2025-03-22")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"success": true, "processedDate": "2025-03-22", "rowCount": 3})
        );
    }

    #[tokio::test]
    async fn test_run_defaults_to_yesterday() {
        let warehouse = Arc::new(StubWarehouse::new(0));
        let (status, body) = send(app(warehouse), get("/run")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["processedDate"], json!("2025-03-22"));
        assert_eq!(body["rowCount"], json!(0));
    }

    #[tokio::test]
    async fn test_run_accepts_timestamps() {
        let warehouse = Arc::new(StubWarehouse::new(1));
        let (status, body) = send(app(warehouse), get("/run?date=2025-03-22T20:00:00Z")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["processedDate"], json!("2025-03-23"));
    }

    #[tokio::test]
    async fn test_run_rejects_garbage_without_touching_warehouse() {
        let warehouse = Arc::new(StubWarehouse::new(1));
        let (status, body) = send(app(warehouse.clone()), get("/run?date=not-a-date")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().unwrap().contains("not-a-date"));
        assert!(warehouse.calls().is_empty());
    }

    #[tokio::test]
    async fn test_run_failure_is_500() {
        let warehouse = Arc::new(StubWarehouse::new(1).failing("2025-03-22"));
        let (status, body) = send(app(warehouse), get("/run?date=2025-03-22")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["processedDate"], json!("2025-03-22"));
        assert!(body["error"].as_str().unwrap().contains("Access Denied"));
    }

    #[tokio::test]
    async fn test_batch_all_succeed() {
        let warehouse = Arc::new(StubWarehouse::new(2));
        let (status, body) = send(
            app(warehouse),
            get("/batch?startDate=2025-03-20&endDate=2025-03-22"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["totalRowCount"], json!(6));
        assert_eq!(body["results"].as_array().unwrap().len(), 3);
        assert!(body.get("failedDates").is_none());
    }

    #[tokio::test]
    async fn test_batch_partial_failure_is_multi_status() {
        let warehouse = Arc::new(StubWarehouse::new(2).failing("2025-03-21"));
        let (status, body) = send(
            app(warehouse),
            get("/batch?startDate=2025-03-20&endDate=2025-03-22"),
        )
        .await;

        assert_eq!(status, StatusCode::MULTI_STATUS);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["totalRowCount"], json!(4));
        assert_eq!(body["failedDates"], json!(["2025-03-21"]));
    }

    #[tokio::test]
    async fn test_batch_total_failure_is_500() {
        let warehouse = Arc::new(StubWarehouse::new(2).failing("2025-03-2"));
        let (status, body) = send(
            app(warehouse),
            get("/batch?startDate=2025-03-20&endDate=2025-03-21"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["failedDates"], json!(["2025-03-20", "2025-03-21"]));
    }

    #[tokio::test]
    async fn test_batch_end_date_defaults_to_start() {
        let warehouse = Arc::new(StubWarehouse::new(1));
        let (status, body) = send(app(warehouse), get("/batch?startDate=2025-03-20")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endDate"], json!("2025-03-20"));
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_batch_rejects_bad_ranges_before_any_work() {
        for uri in [
            "/batch",
            "/batch?endDate=2025-03-22",
            "/batch?startDate=2025-3-20",
            "/batch?startDate=2025-03-20&endDate=2025-02-30",
            "/batch?startDate=2025-03-22&endDate=2025-03-20",
        ] {
            let warehouse = Arc::new(StubWarehouse::new(1));
            let (status, body) = send(app(warehouse.clone()), get(uri)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["success"], json!(false), "{uri}");
            assert!(warehouse.calls().is_empty(), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_reprocess() {
        let warehouse = Arc::new(StubWarehouse::new(5));
        let (status, body) = send(
            app(warehouse),
            post_json("/reprocess", r#"{"date": "2025-03-22"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rowCount"], json!(5));
    }

    #[tokio::test]
    async fn test_reprocess_rejects_missing_or_invalid_date() {
        for payload in ["", "{}", r#"{"date": ""}"#, r#"{"date": "2025/03/22"}"#, r#"{"date": 20250322}"#, "not json"] {
            let warehouse = Arc::new(StubWarehouse::new(5));
            let (status, body) = send(app(warehouse.clone()), post_json("/reprocess", payload)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
            assert_eq!(body["success"], json!(false), "{payload}");
            assert!(warehouse.calls().is_empty(), "{payload}");
        }
    }

    #[tokio::test]
    async fn test_health_and_fallback() {
        let warehouse = Arc::new(StubWarehouse::new(0));
        let (status, body) = send(app(warehouse.clone()), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));

        let (status, body) = send(app(warehouse), get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Not Found"}));
    }

    #[tokio::test]
    async fn test_serve_stops_on_cancel() {
        let warehouse = Arc::new(StubWarehouse::new(0));
        let destination = TableIdent::new("p", "d", "t");
        let state = AppState::new(EtlPipeline::new(warehouse, destination, EtlOptions::default()));
        let listener = bind("127.0.0.1:0").await.unwrap();
        let token = CancellationToken::new();

        let handle = tokio::spawn(serve(listener, state, token.clone()));
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert!(result.is_ok());
    }
}
