use crate::{
    batch::BatchDriver,
    etl::{EtlOptions, PartitionEtl, PartitionProcessor},
    gateway::WarehouseGateway,
};
use connectors::warehouse::base::adapter::WarehouseAdapter;
use model::{
    core::{
        date::{DateRange, TargetDate},
        table::TableIdent,
    },
    execution::result::{BatchResult, PartitionResult},
};
use std::sync::Arc;

/// Single-date and date-range entry points over one warehouse connection.
#[derive(Clone)]
pub struct EtlPipeline {
    etl: Arc<PartitionEtl>,
    batch: Arc<BatchDriver>,
}

impl EtlPipeline {
    pub fn new(
        adapter: Arc<dyn WarehouseAdapter>,
        destination: TableIdent,
        options: EtlOptions,
    ) -> Self {
        let gateway = Arc::new(WarehouseGateway::new(adapter));
        Self::from_gateway(gateway, destination, options)
    }

    pub fn from_gateway(
        gateway: Arc<WarehouseGateway>,
        destination: TableIdent,
        options: EtlOptions,
    ) -> Self {
        let etl = Arc::new(PartitionEtl::new(gateway, destination, options));
        let batch = Arc::new(BatchDriver::new(etl.clone()));
        Self { etl, batch }
    }

    pub async fn process(&self, date: TargetDate) -> PartitionResult {
        self.etl.process(date).await
    }

    pub async fn run_batch(&self, range: DateRange) -> BatchResult {
        self.batch.run(range).await
    }
}
