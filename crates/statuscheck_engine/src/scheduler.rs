use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use statuscheck_core::{
    parse_response, partition, AnalysisResult, Citation, CompanyRecord, BATCH_SIZE,
    INTER_BATCH_DELAY,
};
use tokio_util::sync::CancellationToken;

use crate::client::AnalysisClient;
use crate::{BatchError, EngineEvent, RunError, RunReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerSettings {
    pub batch_size: usize,
    pub inter_batch_delay: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            inter_batch_delay: INTER_BATCH_DELAY,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Drives a run: one batch in flight at a time, a fixed pause between
/// batches, stop on the first failure.
pub struct BatchScheduler {
    client: Arc<dyn AnalysisClient>,
    settings: SchedulerSettings,
    running: AtomicBool,
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl BatchScheduler {
    pub fn new(client: Arc<dyn AnalysisClient>, settings: SchedulerSettings) -> Self {
        Self {
            client,
            settings,
            running: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Analyzes `queue` in order. Progress goes to `sink`; `cancel` is
    /// honoured before each batch and during the pause between batches.
    ///
    /// The queue itself is left untouched; consuming it on success is the
    /// caller's job.
    pub async fn run(
        &self,
        queue: &[CompanyRecord],
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<RunReport, RunError> {
        if queue.is_empty() {
            return Err(RunError::EmptyInput);
        }
        if self.running.swap(true, Ordering::AcqRel) {
            engine_warn!("Rejected analysis run: another run is in progress");
            return Err(RunError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);

        let batches = partition(queue, self.settings.batch_size);
        let total = batches.len();
        let mut report = RunReport::default();

        for (span, batch) in batches {
            if cancel.is_cancelled() {
                engine_info!("Run cancelled before batch {} of {}", span.index, total);
                return Err(RunError::Cancelled {
                    total,
                    partial: report,
                });
            }

            engine_info!("{}", span.label());
            sink.emit(EngineEvent::BatchStarted(span));

            let (results, citations) = match self.analyze_batch(batch).await {
                Ok(output) => output,
                Err(source) => {
                    engine_warn!("Batch {} of {} failed: {}", span.index, total, source);
                    return Err(RunError::BatchFailed {
                        batch: span.index,
                        source,
                        partial: report,
                    });
                }
            };
            engine_info!(
                "Batch {} of {} done: {} rows, {} citations",
                span.index,
                total,
                results.len(),
                citations.len()
            );
            report.results.extend(results);
            report.citations.extend(citations);
            report.batches += 1;
            sink.emit(EngineEvent::BatchCompleted {
                batch: span.index,
                results: report.results.clone(),
                citations: report.citations.clone(),
            });

            if !span.is_last() {
                let delay = self.settings.inter_batch_delay;
                sink.emit(EngineEvent::Waiting {
                    batch: span.index,
                    delay,
                });
                if tokio::time::timeout(delay, cancel.cancelled()).await.is_ok() {
                    engine_info!("Run cancelled while waiting after batch {}", span.index);
                    return Err(RunError::Cancelled {
                        total,
                        partial: report,
                    });
                }
            }
        }

        Ok(report)
    }

    async fn analyze_batch(
        &self,
        batch: &[CompanyRecord],
    ) -> Result<(Vec<AnalysisResult>, Vec<Citation>), BatchError> {
        let response = self.client.analyze(batch).await?;
        let results = parse_response(&response.raw_text).inspect_err(|_| {
            engine_debug!("Unparsable response: {}", response.raw_text);
        })?;
        Ok((results, response.citations))
    }
}
