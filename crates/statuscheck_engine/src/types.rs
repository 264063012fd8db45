use std::fmt;
use std::time::Duration;

use statuscheck_core::{AnalysisResult, BatchSpan, Citation, ParseError};

/// Raw output of one external call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchResponse {
    pub raw_text: String,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A batch is about to be submitted.
    BatchStarted(BatchSpan),
    /// A batch succeeded. Carries everything accumulated so far.
    BatchCompleted {
        batch: usize,
        results: Vec<AnalysisResult>,
        citations: Vec<Citation>,
    },
    /// Pausing after `batch` before the next one.
    Waiting { batch: usize, delay: Duration },
    /// The run ended.
    RunFinished(Result<RunReport, RunError>),
}

/// Accumulated output of a run, or of the part that completed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    pub results: Vec<AnalysisResult>,
    pub citations: Vec<Citation>,
    /// Number of batches that completed.
    pub batches: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    HttpStatus(u16),
    Timeout,
    Network,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    MalformedBody,
    Blocked,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::MalformedBody => write!(f, "malformed response body"),
            FailureKind::Blocked => write!(f, "request blocked"),
        }
    }
}

/// Why a single batch could not be turned into results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("{message}")]
    ExternalService { kind: FailureKind, message: String },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl BatchError {
    pub fn service(kind: FailureKind, message: impl Into<String>) -> Self {
        BatchError::ExternalService {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("Please add at least one company to analyze.")]
    EmptyInput,
    #[error("an analysis run is already in progress")]
    AlreadyRunning,
    #[error("Analysis failed on batch {batch}. Error: {source}")]
    BatchFailed {
        batch: usize,
        source: BatchError,
        partial: RunReport,
    },
    #[error("analysis cancelled after {} of {total} batches", .partial.batches)]
    Cancelled { total: usize, partial: RunReport },
}

impl RunError {
    /// Results gathered before the run stopped, if any batch completed.
    pub fn partial(&self) -> Option<&RunReport> {
        match self {
            RunError::BatchFailed { partial, .. } | RunError::Cancelled { partial, .. } => {
                Some(partial)
            }
            RunError::EmptyInput | RunError::AlreadyRunning => None,
        }
    }
}
