use std::time::Duration;

use crate::{AnalysisResult, BatchSpan, Citation, CompanyFields, CompanyId, CompanyRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted the single-company form.
    CompanySubmitted(CompanyFields),
    /// User uploaded a bulk CSV document.
    BulkUploaded(String),
    /// User removed a queued company.
    CompanyRemoved(CompanyId),
    /// Restore a previously persisted queue.
    RestoreQueue(Vec<CompanyRecord>),
    /// User asked to analyze the queue.
    AnalyzeClicked,
    /// Engine is about to submit a batch.
    BatchStarted(BatchSpan),
    /// Engine finished a batch; carries the full accumulated snapshot.
    BatchCompleted {
        batch: usize,
        results: Vec<AnalysisResult>,
        citations: Vec<Citation>,
    },
    /// Engine is pausing before the next batch.
    BatchWaiting { batch: usize, delay: Duration },
    /// Every batch succeeded.
    RunSucceeded,
    /// A batch failed; the run stopped there.
    RunFailed { batch: usize, message: String },
    /// The run was cancelled between batches.
    RunCancelled,
    /// The engine refused to start the run.
    RunRejected { message: String },
    /// User asked for a CSV export of the results.
    ExportClicked,
    /// User cleared the results panel.
    ResultsCleared,
}
