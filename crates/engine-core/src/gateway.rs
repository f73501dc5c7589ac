//! The only component that talks to the warehouse.
//!
//! Every call either succeeds or fails exactly once; nothing here retries.

use connectors::warehouse::base::{
    adapter::{QueryRequest, WarehouseAdapter},
    error::WarehouseError,
};
use model::{
    core::{date::TargetDate, table::TableIdent},
    records::row::RowData,
};
use planner::query::{
    dialect::BigQuery,
    generator::{QueryGenerator, ROW_COUNT_ALIAS},
    impressions::{PARTITION_COLUMN, impression_column_names},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Hours after which an abandoned staging table is dropped by the warehouse.
pub const DEFAULT_STAGING_EXPIRATION_HOURS: u32 = 24;

pub struct WarehouseGateway {
    adapter: Arc<dyn WarehouseAdapter>,
    dialect: BigQuery,
    staging_expiration_hours: Option<u32>,
}

impl WarehouseGateway {
    pub fn new(adapter: Arc<dyn WarehouseAdapter>) -> Self {
        debug!("Warehouse gateway over {:?}", adapter.kind());
        Self {
            adapter,
            dialect: BigQuery,
            staging_expiration_hours: Some(DEFAULT_STAGING_EXPIRATION_HOURS),
        }
    }

    pub fn with_staging_expiration(mut self, hours: Option<u32>) -> Self {
        self.staging_expiration_hours = hours;
        self
    }

    fn generator(&self) -> QueryGenerator<'_> {
        QueryGenerator::new(&self.dialect)
    }

    /// Runs a statement and returns its rows; statements without a result
    /// set yield an empty vector.
    pub async fn execute_query(&self, request: &QueryRequest) -> Result<Vec<RowData>, WarehouseError> {
        debug!("Executing query: {}", request.sql);
        for param in &request.params {
            debug!("  @{} = {}", param.name, param.value);
        }
        let response = self.adapter.query(request).await?;
        debug!("Query returned {} rows", response.rows.len());
        Ok(response.rows)
    }

    pub async fn execute(&self, sql: &str) -> Result<Vec<RowData>, WarehouseError> {
        self.execute_query(&QueryRequest::new(sql)).await
    }

    /// Deletes every destination row whose hour bucket falls on `date`.
    #[instrument(skip(self), fields(table = %table, date = %date))]
    pub async fn delete_partition(
        &self,
        table: &TableIdent,
        date: TargetDate,
    ) -> Result<(), WarehouseError> {
        let (sql, params) = self
            .generator()
            .delete_partition(table, PARTITION_COLUMN, date);
        self.execute_query(&QueryRequest::new(sql).with_params(params))
            .await?;
        info!("Deleted partition {date} of {table}");
        Ok(())
    }

    /// Materialises `sql` into a fresh staging table and, when it produced
    /// rows, replaces the destination partition for `date` with them.
    ///
    /// Returns the number of staged rows. An empty result leaves the
    /// destination untouched.
    #[instrument(skip(self, sql), fields(destination = %destination, date = %date))]
    pub async fn stage_and_commit(
        &self,
        sql: &str,
        destination: &TableIdent,
        date: TargetDate,
    ) -> Result<u64, WarehouseError> {
        let staging = staging_table(destination, date);
        let create = self
            .generator()
            .create_table_as(&staging, sql, self.staging_expiration_hours);
        self.execute(&create).await?;
        debug!("Created staging table {staging}");

        match self.commit_staged(&staging, destination, date).await {
            Ok(row_count) => {
                self.execute(&self.generator().drop_table(&staging)).await?;
                debug!("Dropped staging table {staging}");
                Ok(row_count)
            }
            Err(err) => {
                self.discard_staging(&staging).await;
                Err(err)
            }
        }
    }

    async fn commit_staged(
        &self,
        staging: &TableIdent,
        destination: &TableIdent,
        date: TargetDate,
    ) -> Result<u64, WarehouseError> {
        let row_count = self.count_rows(staging).await?;
        if row_count == 0 {
            info!("No rows staged for {date}; destination left untouched");
            return Ok(0);
        }

        self.delete_partition(destination, date).await?;

        let columns = impression_column_names();
        let insert = self.generator().insert_from(destination, &columns, staging);
        self.execute(&insert).await?;
        info!("Inserted {row_count} rows into {destination} for {date}");

        Ok(row_count)
    }

    async fn count_rows(&self, table: &TableIdent) -> Result<u64, WarehouseError> {
        let rows = self.execute(&self.generator().count_rows(table)).await?;
        rows.first()
            .and_then(|row| row.get_value(ROW_COUNT_ALIAS).as_u64())
            .ok_or_else(|| {
                WarehouseError::Unexpected(format!("row count missing for staging table {table}"))
            })
    }

    /// Best-effort drop after a failed commit; the table's expiration
    /// covers the case where this fails too.
    async fn discard_staging(&self, staging: &TableIdent) {
        if let Err(err) = self.execute(&self.generator().drop_table(staging)).await {
            warn!("Failed to drop staging table {staging}: {err}");
        }
    }
}

/// `<destination>_staging_<yyyymmdd>_<uuid>` next to the destination.
pub fn staging_table(destination: &TableIdent, date: TargetDate) -> TableIdent {
    destination.sibling(format!(
        "{}_staging_{}_{}",
        destination.table,
        date.compact(),
        Uuid::new_v4().simple()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{RecordingAdapter, date, destination};
    use model::core::value::Value;

    #[test]
    fn test_staging_table_names_are_unique_and_scoped() {
        let a = staging_table(&destination(), date("2025-03-22"));
        let b = staging_table(&destination(), date("2025-03-22"));

        assert_ne!(a, b);
        assert_eq!(a.project, "rfs-proj");
        assert_eq!(a.dataset, "sg_reports_tmp");
        assert!(a.table.starts_with("signage_impressions_staging_20250322_"));
    }

    #[tokio::test]
    async fn test_execute_query_returns_empty_rows() {
        let adapter = Arc::new(RecordingAdapter::with_count(0));
        let gateway = WarehouseGateway::new(adapter.clone());

        let rows = gateway.execute("SELECT 1 LIMIT 0").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_delete_partition_binds_date_param() {
        let adapter = Arc::new(RecordingAdapter::with_count(0));
        let gateway = WarehouseGateway::new(adapter.clone());

        gateway
            .delete_partition(&destination(), date("2025-03-22"))
            .await
            .unwrap();

        let requests = adapter.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].sql,
            "DELETE FROM `rfs-proj.sg_reports_tmp.signage_impressions` WHERE DATE(`timestamp_hourly`) = @partition_date"
        );
        assert_eq!(
            requests[0].params[0].value,
            Value::Date(date("2025-03-22").as_naive())
        );
    }

    #[tokio::test]
    async fn test_stage_and_commit_replaces_partition() {
        let adapter = Arc::new(RecordingAdapter::with_count(3));
        let gateway = WarehouseGateway::new(adapter.clone());

        let count = gateway
            .stage_and_commit("SELECT 1", &destination(), date("2025-03-22"))
            .await
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(
            adapter.statement_kinds(),
            vec!["CREATE OR REPLACE", "SELECT COUNT", "DELETE", "INSERT", "DROP"]
        );

        let sql = adapter.sql_log();
        assert!(sql[0].contains("expiration_timestamp"));
        assert!(sql[0].ends_with("AS\nSELECT 1"));
        assert!(sql[3].contains("SELECT * FROM `rfs-proj.sg_reports_tmp.signage_impressions_staging_20250322_"));
    }

    #[tokio::test]
    async fn test_stage_and_commit_empty_result_leaves_destination_untouched() {
        let adapter = Arc::new(RecordingAdapter::with_count(0));
        let gateway = WarehouseGateway::new(adapter.clone());

        let count = gateway
            .stage_and_commit("SELECT 1", &destination(), date("2025-03-22"))
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert_eq!(
            adapter.statement_kinds(),
            vec!["CREATE OR REPLACE", "SELECT COUNT", "DROP"]
        );
    }

    #[tokio::test]
    async fn test_stage_and_commit_cleans_up_after_failed_insert() {
        let adapter = Arc::new(RecordingAdapter::with_count(5).failing_on("INSERT"));
        let gateway = WarehouseGateway::new(adapter.clone());

        let err = gateway
            .stage_and_commit("SELECT 1", &destination(), date("2025-03-22"))
            .await
            .unwrap_err();

        assert!(matches!(err, WarehouseError::Query(_)));
        assert_eq!(
            adapter.statement_kinds(),
            vec!["CREATE OR REPLACE", "SELECT COUNT", "DELETE", "INSERT", "DROP"]
        );
    }

    #[tokio::test]
    async fn test_stage_and_commit_failed_create_issues_nothing_else() {
        let adapter = Arc::new(RecordingAdapter::with_count(5).failing_on("CREATE OR REPLACE"));
        let gateway = WarehouseGateway::new(adapter.clone());

        assert!(
            gateway
                .stage_and_commit("SELECT 1", &destination(), date("2025-03-22"))
                .await
                .is_err()
        );
        assert_eq!(adapter.statement_kinds(), vec!["CREATE OR REPLACE"]);
    }

    #[tokio::test]
    async fn test_staging_without_expiration() {
        let adapter = Arc::new(RecordingAdapter::with_count(0));
        let gateway = WarehouseGateway::new(adapter.clone()).with_staging_expiration(None);

        gateway
            .stage_and_commit("SELECT 1", &destination(), date("2025-03-22"))
            .await
            .unwrap();
        assert!(!adapter.sql_log()[0].contains("OPTIONS"));
    }
}
