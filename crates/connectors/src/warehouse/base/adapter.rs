use crate::warehouse::base::error::WarehouseError;
use async_trait::async_trait;
use model::{core::value::QueryParam, records::row::RowData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarehouseKind {
    BigQuery,
    Other(&'static str),
}

/// One statement plus the named parameters it binds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRequest {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl QueryRequest {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<QueryParam>) -> Self {
        self.params = params;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResponse {
    pub rows: Vec<RowData>,
    /// Rows touched by a DML statement, when the warehouse reports it.
    pub affected_rows: Option<u64>,
}

#[async_trait]
pub trait WarehouseAdapter: Send + Sync {
    /// Runs one statement to completion and returns every result row.
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, WarehouseError>;

    async fn exec(&self, sql: &str) -> Result<Option<u64>, WarehouseError> {
        let response = self.query(&QueryRequest::new(sql)).await?;
        Ok(response.affected_rows)
    }

    async fn query_rows(&self, sql: &str) -> Result<Vec<RowData>, WarehouseError> {
        let response = self.query(&QueryRequest::new(sql)).await?;
        Ok(response.rows)
    }

    fn kind(&self) -> WarehouseKind;
}
