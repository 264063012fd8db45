use crate::{AnalysisResult, Citation, CompanyId, CompanyRecord, RunStatus};

/// Inline messages for the single-company form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormErrors {
    pub name: Option<&'static str>,
    pub location: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub run: RunStatus,
    pub progress: String,
    /// Single user-visible run error.
    pub error: Option<String>,
    pub form_errors: FormErrors,
    pub upload_error: Option<String>,
    pub queue: Vec<CompanyRowView>,
    /// Label for the analyze action; `None` when nothing is queued.
    pub analyze_label: Option<String>,
    pub results: Vec<AnalysisResult>,
    pub citations: Vec<Citation>,
    /// True once a run has ended, whatever the outcome.
    pub show_results: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRowView {
    pub id: CompanyId,
    pub name: String,
    pub website: String,
    pub location: String,
}

impl From<&CompanyRecord> for CompanyRowView {
    fn from(record: &CompanyRecord) -> Self {
        Self {
            id: record.id().clone(),
            name: record.name().to_string(),
            website: record.website().to_string(),
            location: record.location().to_string(),
        }
    }
}
