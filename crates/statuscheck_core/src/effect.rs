use crate::{AnalysisResult, CompanyRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand a snapshot of the queue to the engine.
    StartRun { companies: Vec<CompanyRecord> },
    /// The pending queue changed and should be saved.
    PersistQueue { companies: Vec<CompanyRecord> },
    /// Write the results out as CSV.
    ExportResults { results: Vec<AnalysisResult> },
}
