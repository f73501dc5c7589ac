use crate::gateway::WarehouseGateway;
use async_trait::async_trait;
use connectors::warehouse::base::error::WarehouseError;
use model::{
    core::{date::TargetDate, table::TableIdent},
    execution::result::PartitionResult,
};
use planner::query::impressions::{
    AggregationOptions, build_aggregation_query, build_create_table_ddl,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EtlOptions {
    pub aggregation: AggregationOptions,
    /// Delete the destination partition before staging, so that a day whose
    /// source produced no rows ends up empty instead of unchanged.
    pub preclean_partition: bool,
}

/// Replaces one date partition. Never fails: every error becomes a failed
/// [`PartitionResult`].
#[async_trait]
pub trait PartitionProcessor: Send + Sync {
    async fn process(&self, date: TargetDate) -> PartitionResult;
}

pub struct PartitionEtl {
    gateway: Arc<WarehouseGateway>,
    destination: TableIdent,
    options: EtlOptions,
}

impl PartitionEtl {
    pub fn new(gateway: Arc<WarehouseGateway>, destination: TableIdent, options: EtlOptions) -> Self {
        Self {
            gateway,
            destination,
            options,
        }
    }

    async fn ensure_table(&self) -> Result<(), WarehouseError> {
        let ddl = build_create_table_ddl(&self.destination);
        self.gateway.execute(&ddl).await?;
        debug!("Destination table {} is present", self.destination);
        Ok(())
    }

    async fn run_steps(&self, date: TargetDate) -> Result<u64, WarehouseError> {
        self.ensure_table().await?;

        if self.options.preclean_partition {
            self.gateway.delete_partition(&self.destination, date).await?;
        }

        let sql = build_aggregation_query(date, &self.options.aggregation);
        self.gateway
            .stage_and_commit(&sql, &self.destination, date)
            .await
    }
}

#[async_trait]
impl PartitionProcessor for PartitionEtl {
    #[instrument(skip(self), fields(date = %date))]
    async fn process(&self, date: TargetDate) -> PartitionResult {
        info!("Starting ETL for {date}");

        match self.run_steps(date).await {
            Ok(row_count) => {
                info!("Processed {row_count} rows for {date}");
                PartitionResult::succeeded(date, row_count)
            }
            Err(err) => {
                error!("ETL for {date} failed: {err}");
                PartitionResult::failed(date, err.to_string())
            }
        }
    }
}
