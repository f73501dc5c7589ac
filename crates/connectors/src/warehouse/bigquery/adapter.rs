use crate::warehouse::{
    base::{
        adapter::{QueryRequest, QueryResponse, WarehouseAdapter, WarehouseKind},
        error::WarehouseError,
    },
    bigquery::{
        auth::TokenProvider,
        params::to_wire_param,
        row::decode_rows,
        wire::{ErrorResponse, QueryRequestBody, QueryResults},
    },
};
use async_trait::async_trait;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Longest single server-side wait for a job before the client polls again.
const MAX_WAIT_PER_CALL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct BigQueryConfig {
    pub project_id: String,
    pub location: Option<String>,
    /// Client-side deadline for a job to finish.
    pub timeout: Duration,
    pub base_url: String,
}

impl BigQueryConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            location: None,
            timeout: Duration::from_secs(60),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Runs statements through `jobs.query`, polling and paging
/// `jobs.getQueryResults` until the job is complete and every row is read.
#[derive(Clone)]
pub struct BigQueryAdapter {
    client: reqwest::Client,
    config: BigQueryConfig,
    tokens: Arc<dyn TokenProvider>,
}

impl BigQueryAdapter {
    pub fn new(
        config: BigQueryConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, WarehouseError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout + MAX_WAIT_PER_CALL)
            .build()?;
        Ok(Self::with_client(client, config, tokens))
    }

    pub fn with_client(
        client: reqwest::Client,
        config: BigQueryConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            config,
            tokens,
        }
    }

    pub fn config(&self) -> &BigQueryConfig {
        &self.config
    }

    fn queries_url(&self) -> String {
        format!(
            "{}/projects/{}/queries",
            self.config.base_url.trim_end_matches('/'),
            self.config.project_id
        )
    }

    fn wait_ms(&self) -> u64 {
        self.config.timeout.min(MAX_WAIT_PER_CALL).as_millis() as u64
    }

    async fn start(&self, request: &QueryRequest) -> Result<QueryResults, WarehouseError> {
        let query_parameters = request.params.iter().map(to_wire_param).collect::<Vec<_>>();
        let body = QueryRequestBody {
            query: &request.sql,
            use_legacy_sql: false,
            parameter_mode: (!query_parameters.is_empty()).then_some("NAMED"),
            query_parameters,
            timeout_ms: self.wait_ms(),
            location: self.config.location.as_deref(),
            request_id: Uuid::new_v4().to_string(),
        };

        let token = self.tokens.access_token().await?;
        let builder = self
            .client
            .post(self.queries_url())
            .bearer_auth(token)
            .json(&body);
        send(builder).await
    }

    async fn fetch_results(
        &self,
        job_id: &str,
        location: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<QueryResults, WarehouseError> {
        let mut query = vec![("timeoutMs", self.wait_ms().to_string())];
        if let Some(location) = location {
            query.push(("location", location.to_string()));
        }
        if let Some(page_token) = page_token {
            query.push(("pageToken", page_token.to_string()));
        }

        let token = self.tokens.access_token().await?;
        let builder = self
            .client
            .get(format!("{}/{}", self.queries_url(), job_id))
            .bearer_auth(token)
            .query(&query);
        send(builder).await
    }
}

#[async_trait]
impl WarehouseAdapter for BigQueryAdapter {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, WarehouseError> {
        let started = Instant::now();
        let mut page = self.start(request).await?;

        let job = page.job_reference.clone().ok_or_else(|| {
            WarehouseError::Unexpected("response carries no job reference".into())
        })?;
        let location = job.location.clone().or_else(|| self.config.location.clone());

        while !page.job_complete {
            if started.elapsed() >= self.config.timeout {
                return Err(WarehouseError::Timeout {
                    job_id: job.job_id.clone(),
                    timeout_secs: self.config.timeout.as_secs(),
                });
            }
            debug!("Job {} still running, polling", job.job_id);
            page = self
                .fetch_results(&job.job_id, location.as_deref(), None)
                .await?;
        }

        let schema = page.schema.clone().unwrap_or_default();
        let affected_rows = page
            .num_dml_affected_rows
            .as_deref()
            .and_then(|n| n.parse::<u64>().ok());
        let mut rows = decode_rows(&schema, &page.rows)?;

        while let Some(page_token) = page.page_token.take() {
            page = self
                .fetch_results(&job.job_id, location.as_deref(), Some(&page_token))
                .await?;
            rows.extend(decode_rows(&schema, &page.rows)?);
        }

        debug!(
            "Job {} finished in {:?} with {} rows",
            job.job_id,
            started.elapsed(),
            rows.len()
        );

        Ok(QueryResponse {
            rows,
            affected_rows,
        })
    }

    fn kind(&self) -> WarehouseKind {
        WarehouseKind::BigQuery
    }
}

async fn send(builder: reqwest::RequestBuilder) -> Result<QueryResults, WarehouseError> {
    let response = builder.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        warn!("Warehouse request failed with HTTP {}", status.as_u16());
        return Err(WarehouseError::Http {
            status: status.as_u16(),
            message,
        });
    }

    let results = response
        .json::<QueryResults>()
        .await
        .map_err(|e| WarehouseError::Decode(e.to_string()))?;

    if !results.errors.is_empty() {
        let message = results
            .errors
            .iter()
            .map(|e| e.describe())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(WarehouseError::Query(message));
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::bigquery::auth::StaticTokenProvider;
    use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
    };
    use model::core::value::{QueryParam, Value};
    use serde_json::{Value as JsonValue, json};
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    #[derive(Default)]
    struct Recorded {
        bodies: Mutex<Vec<JsonValue>>,
        polls: AtomicUsize,
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn adapter(base_url: String) -> BigQueryAdapter {
        let mut config = BigQueryConfig::new("rfs-proj");
        config.base_url = base_url;
        config.location = Some("asia-northeast1".into());
        config.timeout = Duration::from_secs(5);
        BigQueryAdapter::new(config, Arc::new(StaticTokenProvider::new("test-token"))).unwrap()
    }

    fn job_ref() -> JsonValue {
        json!({"projectId": "rfs-proj", "jobId": "job_1", "location": "asia-northeast1"})
    }

    fn count_schema() -> JsonValue {
        json!({"fields": [{"name": "row_count", "type": "INTEGER"}]})
    }

    async fn start_job(
        State(recorded): State<Arc<Recorded>>,
        Path(project): Path<String>,
        headers: HeaderMap,
        Json(body): Json<JsonValue>,
    ) -> impl IntoResponse {
        assert_eq!(project, "rfs-proj");
        assert_eq!(
            headers.get("authorization").and_then(|v| v.to_str().ok()),
            Some("Bearer test-token")
        );
        recorded.bodies.lock().unwrap().push(body);
        Json(json!({"jobReference": job_ref(), "jobComplete": false}))
    }

    async fn job_results(
        State(recorded): State<Arc<Recorded>>,
        Path((_, job_id)): Path<(String, String)>,
        Query(query): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        assert_eq!(job_id, "job_1");
        assert_eq!(query.get("location").map(String::as_str), Some("asia-northeast1"));
        recorded.polls.fetch_add(1, Ordering::SeqCst);

        match query.get("pageToken").map(String::as_str) {
            None => Json(json!({
                "jobReference": job_ref(),
                "jobComplete": true,
                "schema": count_schema(),
                "rows": [{"f": [{"v": "1"}]}],
                "totalRows": "2",
                "pageToken": "page-2"
            })),
            Some("page-2") => Json(json!({
                "jobReference": job_ref(),
                "jobComplete": true,
                "rows": [{"f": [{"v": "2"}]}],
                "totalRows": "2"
            })),
            Some(other) => panic!("unexpected page token {other}"),
        }
    }

    #[tokio::test]
    async fn test_query_polls_and_pages_until_all_rows_read() {
        let recorded = Arc::new(Recorded::default());
        let router = Router::new()
            .route("/projects/:project/queries", post(start_job))
            .route("/projects/:project/queries/:job_id", get(job_results))
            .with_state(recorded.clone());
        let adapter = adapter(serve(router).await);

        let request = QueryRequest::new("DELETE FROM `t` WHERE DATE(`ts`) = @partition_date")
            .with_params(vec![QueryParam::new(
                "partition_date",
                Value::String("2025-03-22".into()),
            )]);
        let response = adapter.query(&request).await.unwrap();

        let values = response
            .rows
            .iter()
            .map(|r| r.get_value("row_count"))
            .collect::<Vec<_>>();
        assert_eq!(values, vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(recorded.polls.load(Ordering::SeqCst), 2);

        let bodies = recorded.bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["useLegacySql"], json!(false));
        assert_eq!(bodies[0]["parameterMode"], json!("NAMED"));
        assert_eq!(bodies[0]["location"], json!("asia-northeast1"));
        assert_eq!(bodies[0]["queryParameters"][0]["name"], json!("partition_date"));
        assert!(bodies[0]["requestId"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_completed_dml_reports_affected_rows() {
        let router = Router::new().route(
            "/projects/:project/queries",
            post(|| async {
                Json(json!({
                    "jobReference": job_ref(),
                    "jobComplete": true,
                    "numDmlAffectedRows": "17"
                }))
            }),
        );
        let adapter = adapter(serve(router).await);

        let affected = adapter.exec("DELETE FROM `t` WHERE TRUE").await.unwrap();
        assert_eq!(affected, Some(17));
    }

    #[tokio::test]
    async fn test_http_error_carries_warehouse_message() {
        let router = Router::new().route(
            "/projects/:project/queries",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": {"code": 400, "message": "Syntax error: Unexpected keyword"}})),
                )
            }),
        );
        let adapter = adapter(serve(router).await);

        let err = adapter.query_rows("SELEC 1").await.unwrap_err();
        match err {
            WarehouseError::Http { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Syntax error: Unexpected keyword");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_job_errors_are_query_errors() {
        let router = Router::new().route(
            "/projects/:project/queries",
            post(|| async {
                Json(json!({
                    "jobReference": job_ref(),
                    "jobComplete": true,
                    "errors": [{"reason": "invalidQuery", "message": "Table not found"}]
                }))
            }),
        );
        let adapter = adapter(serve(router).await);

        let err = adapter.exec("SELECT 1").await.unwrap_err();
        assert!(matches!(err, WarehouseError::Query(msg) if msg == "invalidQuery: Table not found"));
    }

    #[tokio::test]
    async fn test_unfinished_job_times_out() {
        let router = Router::new()
            .route(
                "/projects/:project/queries",
                post(|| async { Json(json!({"jobReference": job_ref(), "jobComplete": false})) }),
            )
            .route(
                "/projects/:project/queries/:job_id",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Json(json!({"jobReference": job_ref(), "jobComplete": false}))
                }),
            );
        let mut adapter = adapter(serve(router).await);
        adapter.config.timeout = Duration::from_millis(200);

        let err = adapter.exec("SELECT 1").await.unwrap_err();
        assert!(matches!(err, WarehouseError::Timeout { job_id, .. } if job_id == "job_1"));
    }
}
