//! Statuscheck core: domain records, ingestion, table parsing and the pure
//! run state machine.
mod batch;
mod effect;
mod ingest;
mod msg;
mod record;
mod state;
mod table;
mod update;
mod view_model;

pub use batch::{
    batch_count, failure_message, partition, waiting_label, BatchSpan, BATCH_SIZE,
    INTER_BATCH_DELAY, PREPARING_LABEL,
};
pub use effect::Effect;
pub use ingest::{
    ingest_single, parse_bulk, FormatError, ValidationError, LOCATION_REQUIRED, NAME_REQUIRED,
    NO_VALID_COMPANIES,
};
pub use msg::Msg;
pub use record::{
    AnalysisResult, Citation, CompanyFields, CompanyId, CompanyRecord, ConfidenceLevel, Status,
};
pub use state::{AppState, RunStatus, EMPTY_QUEUE_MESSAGE};
pub use table::{parse_response, parse_table, ParseError, MIN_CELLS};
pub use update::update;
pub use view_model::{AppViewModel, CompanyRowView, FormErrors};
