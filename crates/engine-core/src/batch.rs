use crate::etl::PartitionProcessor;
use model::{core::date::DateRange, execution::result::BatchResult};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Processes a date range one day at a time, oldest first, carrying on past
/// failed days.
pub struct BatchDriver {
    processor: Arc<dyn PartitionProcessor>,
}

impl BatchDriver {
    pub fn new(processor: Arc<dyn PartitionProcessor>) -> Self {
        Self { processor }
    }

    #[instrument(skip(self), fields(start = %range.start(), end = %range.end()))]
    pub async fn run(&self, range: DateRange) -> BatchResult {
        info!("Starting batch of {} days", range.num_days());

        let mut results = Vec::with_capacity(range.num_days());
        for date in range {
            let result = self.processor.process(date).await;
            if !result.success {
                warn!("Day {date} failed, continuing with the rest of the batch");
            }
            results.push(result);
        }

        let batch = BatchResult::from_results(range, results);
        info!(
            "Batch finished: {} rows, {} failed days",
            batch.total_row_count,
            batch.failed_dates.as_ref().map_or(0, Vec::len)
        );
        batch
    }
}
