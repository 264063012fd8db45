use std::time::Duration;

use crate::batch::{self, BatchSpan, PREPARING_LABEL};
use crate::ingest::{self, FormatError, ValidationError, NO_VALID_COMPANIES};
use crate::view_model::{AppViewModel, CompanyRowView, FormErrors};
use crate::{AnalysisResult, Citation, CompanyFields, CompanyId, CompanyRecord};

pub const EMPTY_QUEUE_MESSAGE: &str = "Please add at least one company to analyze.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled
        )
    }
}

/// Aggregated state of the queue and of the current or last analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    queue: Vec<CompanyRecord>,
    in_flight: Vec<CompanyId>,
    results: Vec<AnalysisResult>,
    citations: Vec<Citation>,
    run: RunStatus,
    progress: String,
    error: Option<String>,
    form_errors: ValidationError,
    upload_error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            run: self.run,
            progress: self.progress.clone(),
            error: self.error.clone(),
            form_errors: FormErrors {
                name: self.form_errors.name_message(),
                location: self.form_errors.location_message(),
            },
            upload_error: self.upload_error.clone(),
            queue: self.queue.iter().map(CompanyRowView::from).collect(),
            analyze_label: analyze_label(self.run, self.queue.len()),
            results: self.results.clone(),
            citations: self.citations.clone(),
            show_results: self.run.is_finished(),
            dirty: self.dirty,
        }
    }

    pub fn queue(&self) -> &[CompanyRecord] {
        &self.queue
    }

    pub fn results(&self) -> &[AnalysisResult] {
        &self.results
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn run_status(&self) -> RunStatus {
        self.run
    }

    /// Returns and resets the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Validates and appends one company. Field errors are kept for display.
    pub fn add_single(&mut self, fields: CompanyFields) -> Result<CompanyId, ValidationError> {
        self.mark_dirty();
        match ingest::ingest_single(fields) {
            Ok(record) => {
                self.form_errors = ValidationError::default();
                let id = record.id().clone();
                self.queue.push(record);
                Ok(id)
            }
            Err(err) => {
                self.form_errors = err;
                Err(err)
            }
        }
    }

    /// Parses a bulk upload and appends every valid row. Returns how many
    /// companies were added.
    pub fn add_bulk(&mut self, raw: &str) -> Result<usize, FormatError> {
        self.mark_dirty();
        let records = match ingest::parse_bulk(raw) {
            Ok(records) => records,
            Err(err) => {
                self.upload_error = Some(err.to_string());
                return Err(err);
            }
        };
        self.upload_error = if records.is_empty() {
            Some(NO_VALID_COMPANIES.to_string())
        } else {
            None
        };
        let added = records.len();
        self.queue.extend(records);
        Ok(added)
    }

    /// Removes the record with `id`. Returns false when nothing matched.
    pub fn remove(&mut self, id: &CompanyId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|record| record.id() != id);
        let removed = self.queue.len() != before;
        if removed {
            self.mark_dirty();
        }
        removed
    }

    pub(crate) fn restore_queue(&mut self, records: Vec<CompanyRecord>) {
        self.queue = records;
        self.mark_dirty();
    }

    /// Moves to Running and returns the batch input, or `None` when a run is
    /// already active or the queue is empty.
    pub(crate) fn begin_run(&mut self) -> Option<Vec<CompanyRecord>> {
        if self.run == RunStatus::Running {
            return None;
        }
        self.mark_dirty();
        if self.queue.is_empty() {
            self.error = Some(EMPTY_QUEUE_MESSAGE.to_string());
            return None;
        }
        self.run = RunStatus::Running;
        self.error = None;
        self.results.clear();
        self.citations.clear();
        self.progress = PREPARING_LABEL.to_string();
        self.in_flight = self.queue.iter().map(|r| r.id().clone()).collect();
        Some(self.queue.clone())
    }

    pub(crate) fn apply_batch_started(&mut self, span: BatchSpan) {
        if self.run != RunStatus::Running {
            return;
        }
        self.progress = span.label();
        self.mark_dirty();
    }

    pub(crate) fn apply_snapshot(
        &mut self,
        results: Vec<AnalysisResult>,
        citations: Vec<Citation>,
    ) {
        if self.run != RunStatus::Running {
            return;
        }
        self.results = results;
        self.citations = citations;
        self.mark_dirty();
    }

    pub(crate) fn apply_waiting(&mut self, batch: usize, delay: Duration) {
        if self.run != RunStatus::Running {
            return;
        }
        self.progress = batch::waiting_label(batch, delay);
        self.mark_dirty();
    }

    /// Consumes the submitted records. Returns false if no run was active.
    pub(crate) fn finish_success(&mut self) -> bool {
        if self.run != RunStatus::Running {
            return false;
        }
        let submitted = std::mem::take(&mut self.in_flight);
        self.queue.retain(|record| !submitted.contains(record.id()));
        self.finish(RunStatus::Completed);
        true
    }

    pub(crate) fn finish_failure(&mut self, message: String) {
        if self.run != RunStatus::Running {
            return;
        }
        self.in_flight.clear();
        self.error = Some(message);
        self.finish(RunStatus::Failed);
    }

    pub(crate) fn finish_cancelled(&mut self) {
        if self.run != RunStatus::Running {
            return;
        }
        self.in_flight.clear();
        self.finish(RunStatus::Cancelled);
    }

    pub(crate) fn clear_results(&mut self) {
        if self.run == RunStatus::Running {
            return;
        }
        self.results.clear();
        self.citations.clear();
        self.run = RunStatus::Idle;
        self.mark_dirty();
    }

    fn finish(&mut self, status: RunStatus) {
        self.run = status;
        self.progress.clear();
        self.mark_dirty();
    }
}

fn analyze_label(run: RunStatus, queued: usize) -> Option<String> {
    if queued == 0 {
        return None;
    }
    if run == RunStatus::Running {
        return Some("Analyzing...".to_string());
    }
    let noun = if queued > 1 { "Companies" } else { "Company" };
    Some(format!("Analyze {queued} {noun}"))
}
