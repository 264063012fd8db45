//! Record ingestion: single manual entries and bulk CSV uploads.
use std::fmt;

use crate::record::{CompanyFields, CompanyRecord};

pub const NAME_REQUIRED: &str = "Company name is required.";
pub const LOCATION_REQUIRED: &str = "Location is required.";
pub const NO_VALID_COMPANIES: &str =
    "No valid companies found in the file. Please check the format.";

const BULK_DELIMITER: u8 = b',';

/// A single entry was missing one or both required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub name_missing: bool,
    pub location_missing: bool,
}

impl ValidationError {
    pub fn has_errors(&self) -> bool {
        self.name_missing || self.location_missing
    }

    /// Message for the name field, if it is in error.
    pub fn name_message(&self) -> Option<&'static str> {
        self.name_missing.then_some(NAME_REQUIRED)
    }

    /// Message for the location field, if it is in error.
    pub fn location_message(&self) -> Option<&'static str> {
        self.location_missing.then_some(LOCATION_REQUIRED)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = [self.name_message(), self.location_message()]
            .into_iter()
            .flatten()
            .collect();
        f.write_str(&messages.join(" "))
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("CSV must contain \"name\" and \"location\" columns.")]
    MissingColumns,
    #[error("Failed to parse CSV file: {0}")]
    Malformed(String),
}

/// Validates a single manual entry and mints its id.
pub fn ingest_single(fields: CompanyFields) -> Result<CompanyRecord, ValidationError> {
    CompanyRecord::new(fields)
}

/// Parses a bulk upload.
///
/// The first row is a header naming at least `name` and `location`
/// (case-insensitive, any order); `website` is optional. Rows missing a
/// name or location are dropped. Quoted cells are honoured; a row with more
/// cells than the header has its surplus joined back into the last column,
/// so an unquoted `Ohio, USA` in a trailing location column stays whole.
pub fn parse_bulk(raw: &str) -> Result<Vec<CompanyRecord>, FormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(BULK_DELIMITER)
        .from_reader(raw.trim_start_matches('\u{feff}').as_bytes());
    let mut rows = reader.records();

    let header = match rows.next() {
        Some(row) => row.map_err(|err| FormatError::Malformed(err.to_string()))?,
        None => return Ok(Vec::new()),
    };
    let columns = HeaderMap::from_header(&header)?;

    let mut records = Vec::new();
    for row in rows {
        let row = row.map_err(|err| FormatError::Malformed(err.to_string()))?;
        let cells = fold_surplus(row.iter().collect(), columns.width);
        let fields = CompanyFields {
            name: columns.cell(&cells, Some(columns.name)),
            website: columns.cell(&cells, columns.website),
            location: columns.cell(&cells, Some(columns.location)),
        };
        if let Ok(record) = CompanyRecord::new(fields) {
            records.push(record);
        }
    }
    Ok(records)
}

struct HeaderMap {
    name: usize,
    website: Option<usize>,
    location: usize,
    width: usize,
}

impl HeaderMap {
    fn from_header(header: &csv::StringRecord) -> Result<Self, FormatError> {
        let names: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |wanted: &str| names.iter().position(|h| h == wanted);
        match (find("name"), find("location")) {
            (Some(name), Some(location)) => Ok(Self {
                name,
                website: find("website"),
                location,
                width: names.len(),
            }),
            _ => Err(FormatError::MissingColumns),
        }
    }

    fn cell(&self, cells: &[String], index: Option<usize>) -> String {
        index
            .and_then(|i| cells.get(i))
            .map(|cell| cell.trim().to_string())
            .unwrap_or_default()
    }
}

fn fold_surplus(cells: Vec<&str>, width: usize) -> Vec<String> {
    if width == 0 || cells.len() <= width {
        return cells.into_iter().map(ToOwned::to_owned).collect();
    }
    let mut folded: Vec<String> = cells[..width - 1].iter().map(|c| c.to_string()).collect();
    folded.push(cells[width - 1..].join(","));
    folded
}
