use async_trait::async_trait;
use connectors::warehouse::base::{
    adapter::{QueryRequest, QueryResponse, WarehouseAdapter, WarehouseKind},
    error::WarehouseError,
};
use model::{
    core::{
        date::TargetDate,
        table::TableIdent,
        value::{FieldValue, Value},
    },
    records::row::RowData,
};
use std::sync::Mutex;

pub fn date(s: &str) -> TargetDate {
    TargetDate::parse_strict(s).unwrap()
}

pub fn destination() -> TableIdent {
    TableIdent::new("rfs-proj", "sg_reports_tmp", "signage_impressions")
}

/// Records every request and answers row-count queries with a fixed count.
pub struct RecordingAdapter {
    count: u64,
    fail_on: Option<&'static str>,
    requests: Mutex<Vec<QueryRequest>>,
}

impl RecordingAdapter {
    pub fn with_count(count: u64) -> Self {
        Self {
            count,
            fail_on: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fails every statement starting with `prefix`.
    pub fn failing_on(mut self, prefix: &'static str) -> Self {
        self.fail_on = Some(prefix);
        self
    }

    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn sql_log(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.sql).collect()
    }

    pub fn statement_kinds(&self) -> Vec<&'static str> {
        self.sql_log().iter().map(|sql| statement_kind(sql)).collect()
    }
}

pub fn statement_kind(sql: &str) -> &'static str {
    [
        "CREATE TABLE IF NOT EXISTS",
        "CREATE OR REPLACE",
        "SELECT COUNT",
        "DELETE",
        "INSERT",
        "DROP",
    ]
    .into_iter()
    .find(|prefix| sql.starts_with(prefix))
    .unwrap_or("OTHER")
}

#[async_trait]
impl WarehouseAdapter for RecordingAdapter {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, WarehouseError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(prefix) = self.fail_on
            && request.sql.starts_with(prefix)
        {
            return Err(WarehouseError::Query(format!("{prefix} rejected")));
        }

        if request.sql.starts_with("SELECT COUNT") {
            let row = RowData::new(vec![FieldValue {
                name: "row_count".to_string(),
                value: Value::Int(self.count as i64),
            }]);
            return Ok(QueryResponse {
                rows: vec![row],
                affected_rows: None,
            });
        }

        Ok(QueryResponse::default())
    }

    fn kind(&self) -> WarehouseKind {
        WarehouseKind::Other("recording")
    }
}
