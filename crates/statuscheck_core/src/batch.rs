use std::time::Duration;

/// Maximum number of companies submitted in one external call.
pub const BATCH_SIZE: usize = 10;
/// Pause between consecutive batches.
pub const INTER_BATCH_DELAY: Duration = Duration::from_secs(5);

pub const PREPARING_LABEL: &str = "Preparing for analysis...";

/// Position of one batch within a run. All indices are 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSpan {
    pub index: usize,
    pub total: usize,
    pub first: usize,
    pub last: usize,
    pub records: usize,
}

impl BatchSpan {
    pub fn is_last(&self) -> bool {
        self.index == self.total
    }

    /// "Analyzing batch 2 of 3 (11-20 of 25)"
    pub fn label(&self) -> String {
        format!(
            "Analyzing batch {} of {} ({}-{} of {})",
            self.index, self.total, self.first, self.last, self.records
        )
    }
}

/// Label shown while pausing after batch `index`.
pub fn waiting_label(index: usize, delay: Duration) -> String {
    format!(
        "Batch {index} complete. Waiting {} seconds to avoid rate limits...",
        delay.as_secs()
    )
}

/// User-visible message for a run that stopped on batch `index`.
pub fn failure_message(index: usize, error: &str) -> String {
    format!("Analysis failed on batch {index}. Error: {error}")
}

pub fn batch_count(records: usize, batch_size: usize) -> usize {
    records.div_ceil(batch_size.max(1))
}

/// Splits `queue` into consecutive, order-preserving batches of at most
/// `batch_size` items. A zero size is treated as 1.
pub fn partition<T>(queue: &[T], batch_size: usize) -> Vec<(BatchSpan, &[T])> {
    let size = batch_size.max(1);
    let total = batch_count(queue.len(), size);
    queue
        .chunks(size)
        .enumerate()
        .map(|(i, chunk)| {
            let span = BatchSpan {
                index: i + 1,
                total,
                first: i * size + 1,
                last: i * size + chunk.len(),
                records: queue.len(),
            };
            (span, chunk)
        })
        .collect()
}
