use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use statuscheck_core::AnalysisResult;

use crate::persist::{AtomicFileWriter, PersistError};

pub const EXPORT_FILENAME: &str = "analysis_results.csv";
pub const EXPORT_HEADERS: [&str; 5] = [
    "Company Name",
    "Status",
    "Confidence Level",
    "Brief Summary",
    "Supporting Links",
];

const UTF8_BOM: &str = "\u{feff}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub rows: usize,
    pub output_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer error: {0}")]
    Buffer(String),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Renders results as CSV: header row, one line per result, cells quoted
/// only when they hold a comma, quote or line break, UTF-8 BOM up front.
pub fn results_to_csv(results: &[AnalysisResult]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADERS)?;
    for result in results {
        writer.write_record([
            result.company_name.as_str(),
            result.status.as_str(),
            result.confidence_level.as_str(),
            result.summary.as_str(),
            result.links.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Buffer(err.to_string()))?;
    let body = String::from_utf8(bytes).map_err(|err| ExportError::Buffer(err.to_string()))?;
    Ok(format!("{UTF8_BOM}{body}"))
}

/// Writes the CSV export atomically to `{dir}/{filename}`.
pub fn export_results(
    dir: &Path,
    filename: &str,
    results: &[AnalysisResult],
) -> Result<ExportSummary, ExportError> {
    let content = results_to_csv(results)?;
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    let output_path = writer.write(filename, content)?;
    engine_info!("Exported {} results to {:?}", results.len(), output_path);
    Ok(ExportSummary {
        rows: results.len(),
        output_path,
    })
}
