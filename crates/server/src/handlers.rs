use crate::{AppState, error::ApiError};
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use model::{
    core::date::{DateRange, TargetDate},
    execution::{
        errors::ValidationError,
        result::{BatchOutcome, PartitionResult},
    },
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct RunParams {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchParams {
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReprocessBody {
    date: Option<serde_json::Value>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn partition_response(result: PartitionResult) -> (StatusCode, Json<PartitionResult>) {
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(result))
}

/// GET /run - replace a single day, yesterday by default
pub(crate) async fn run_single(
    State(state): State<AppState>,
    Query(params): Query<RunParams>,
) -> Result<impl IntoResponse, ApiError> {
    let date = match non_blank(params.date) {
        Some(raw) => TargetDate::parse_lenient(&raw)?,
        None => TargetDate::yesterday_at((state.clock)()),
    };

    info!("Received ETL request for {date}");
    let result = state.pipeline.process(date).await;
    Ok(partition_response(result))
}

/// GET /batch - replace every day of an inclusive range
pub(crate) async fn run_batch(
    State(state): State<AppState>,
    Query(params): Query<BatchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let start = non_blank(params.start_date)
        .ok_or_else(|| ValidationError::MissingParameter("startDate".into()))?;
    let start = TargetDate::parse_strict(&start)?;
    let end = match non_blank(params.end_date) {
        Some(raw) => TargetDate::parse_strict(&raw)?,
        None => start,
    };
    let range = DateRange::new(start, end)?;

    info!("Received batch request for {start}..={end}");
    let result = state.pipeline.run_batch(range).await;

    let status = match result.outcome() {
        BatchOutcome::Complete => StatusCode::OK,
        BatchOutcome::Partial => StatusCode::MULTI_STATUS,
        BatchOutcome::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    };
    Ok((status, Json(result)))
}

/// POST /reprocess - replace one explicitly named day
pub(crate) async fn reprocess(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        ReprocessBody { date: None }
    } else {
        serde_json::from_slice::<ReprocessBody>(&body)
            .map_err(|e| ApiError::InvalidBody(e.to_string()))?
    };

    let raw = match body.date {
        None | Some(serde_json::Value::Null) => {
            return Err(ValidationError::MissingParameter("date".into()).into());
        }
        Some(serde_json::Value::String(s)) if s.is_empty() => {
            return Err(ValidationError::MissingParameter("date".into()).into());
        }
        Some(serde_json::Value::String(s)) => s,
        Some(other) => return Err(ValidationError::InvalidDateFormat(other.to_string()).into()),
    };
    let date = TargetDate::parse_strict(&raw)?;

    info!("Received reprocess request for {date}");
    let result = state.pipeline.process(date).await;
    Ok(partition_response(result))
}

/// GET /health - liveness probe
pub(crate) async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

pub(crate) async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Not Found"})))
}
