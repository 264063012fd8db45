//! Statuscheck engine: external analysis calls, batch scheduling and file output.
mod client;
mod engine;
mod export;
mod persist;
mod prompt;
mod scheduler;
mod types;
mod wire;

pub use client::{
    AnalysisClient, ClientSettings, ConfigurationError, GeminiClient, DEFAULT_BASE_URL,
    DEFAULT_MODEL,
};
pub use engine::EngineHandle;
pub use export::{
    export_results, results_to_csv, ExportError, ExportSummary, EXPORT_FILENAME, EXPORT_HEADERS,
};
pub use persist::{ensure_output_dir, read_if_exists, AtomicFileWriter, PersistError};
pub use prompt::{build_user_message, SYSTEM_PROMPT};
pub use scheduler::{BatchScheduler, ChannelProgressSink, ProgressSink, SchedulerSettings};
pub use types::{BatchError, BatchResponse, EngineEvent, FailureKind, RunError, RunReport};
