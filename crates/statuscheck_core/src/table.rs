//! Parser for the markdown result table returned by the analysis service.
use crate::record::{AnalysisResult, ConfidenceLevel, Status};

/// Minimum pipe-split cells for a data row, counting the empty cells produced
/// by leading and trailing pipes.
pub const MIN_CELLS: usize = 6;

const HEADER_LINES: usize = 2;
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("could not extract any result rows from a non-empty response")]
pub struct ParseError;

/// Parses rows best-effort. The first two lines (header and separator) are
/// skipped without inspection, and rows with too few cells are dropped.
pub fn parse_table(raw: &str) -> Vec<AnalysisResult> {
    raw.trim()
        .lines()
        .skip(HEADER_LINES)
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_row)
        .collect()
}

/// Like [`parse_table`], but a non-empty response without a single usable row
/// is an error. Whitespace counts as content.
pub fn parse_response(raw: &str) -> Result<Vec<AnalysisResult>, ParseError> {
    let rows = parse_table(raw);
    if rows.is_empty() && !raw.is_empty() {
        return Err(ParseError);
    }
    Ok(rows)
}

fn parse_row(line: &str) -> Option<AnalysisResult> {
    let cells: Vec<&str> = line.split('|').map(str::trim).collect();
    if cells.len() < MIN_CELLS {
        engine_logging::engine_debug!("Dropping table row with {} cells: {}", cells.len(), line);
        return None;
    }
    let or_na = |cell: &str| {
        if cell.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            cell.to_string()
        }
    };
    Some(AnalysisResult {
        company_name: or_na(cells[1]),
        status: Status::from_cell(cells[2]),
        confidence_level: ConfidenceLevel::from_cell(cells[3]),
        summary: or_na(cells[4]),
        links: cells[5].to_string(),
    })
}
