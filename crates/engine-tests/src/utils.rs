use crate::warehouse::{ImpressionRow, SimulatedWarehouse};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use engine_core::{etl::EtlOptions, pipeline::EtlPipeline};
use model::core::{date::TargetDate, table::TableIdent};
use server::{AppState, router};
use std::sync::Arc;
use tower::ServiceExt;

/// Fully-qualified destination used by every scenario.
pub const DESTINATION: &str = "rfs-proj.sg_reports_tmp.signage_impressions";

pub fn destination() -> TableIdent {
    TableIdent::new("rfs-proj", "sg_reports_tmp", "signage_impressions")
}

pub fn date(s: &str) -> TargetDate {
    TargetDate::parse_strict(s).unwrap()
}

/// `count` rows spread over consecutive hours of `day`.
pub fn rows(day: &str, medium_id: &str, count: u32) -> Vec<ImpressionRow> {
    (0..count)
        .map(|hour| ImpressionRow::at(date(day), hour, medium_id, u64::from(hour) + 1))
        .collect()
}

pub fn pipeline(warehouse: &Arc<SimulatedWarehouse>, options: EtlOptions) -> EtlPipeline {
    EtlPipeline::new(warehouse.clone(), destination(), options)
}

/// Router whose clock reads 2025-03-23 12:00 UTC, so "yesterday" is 2025-03-22.
pub fn app(warehouse: &Arc<SimulatedWarehouse>) -> Router {
    let now = Utc.with_ymd_and_hms(2025, 3, 23, 12, 0, 0).unwrap();
    let state = AppState::new(pipeline(warehouse, EtlOptions::default()))
        .with_clock(Arc::new(move || now));
    router(state)
}

pub async fn call(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
