use std::fmt;

use crate::ingest::ValidationError;

/// Opaque unique token identifying a queued company.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompanyId(String);

impl CompanyId {
    /// Mints a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CompanyId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CompanyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw, unvalidated input for a single company.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompanyFields {
    pub name: String,
    pub website: String,
    pub location: String,
}

impl CompanyFields {
    pub fn new(
        name: impl Into<String>,
        website: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            website: website.into(),
            location: location.into(),
        }
    }
}

/// A validated company waiting in the queue.
///
/// Name and location are always non-empty and trimmed. Records are never
/// mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    id: CompanyId,
    name: String,
    website: String,
    location: String,
}

impl CompanyRecord {
    /// Validates `fields` and assigns a freshly minted id.
    pub fn new(fields: CompanyFields) -> Result<Self, ValidationError> {
        Self::with_id(CompanyId::generate(), fields)
    }

    /// Rebuilds a record under a known id, e.g. when restoring a saved queue.
    pub fn with_id(id: CompanyId, fields: CompanyFields) -> Result<Self, ValidationError> {
        let name = fields.name.trim();
        let location = fields.location.trim();
        let error = ValidationError {
            name_missing: name.is_empty(),
            location_missing: location.is_empty(),
        };
        if error.has_errors() {
            return Err(error);
        }
        Ok(Self {
            id,
            name: name.to_string(),
            website: fields.website.trim().to_string(),
            location: location.to_string(),
        })
    }

    pub fn id(&self) -> &CompanyId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Website, empty when not provided.
    pub fn website(&self) -> &str {
        &self.website
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// Operational status reported by the model.
///
/// Values outside the known set are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    Active,
    Inactive,
    #[default]
    Unknown,
    Other(String),
}

impl Status {
    /// Interprets a table cell. A blank cell means `Unknown`.
    pub fn from_cell(cell: &str) -> Self {
        match cell {
            "" | "Unknown" => Status::Unknown,
            "Active" => Status::Active,
            "Inactive" => Status::Inactive,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
            Status::Unknown => "Unknown",
            Status::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence the model attached to its status assessment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    #[default]
    Unknown,
    Other(String),
}

impl ConfidenceLevel {
    /// Interprets a table cell. A blank cell means `Unknown`.
    pub fn from_cell(cell: &str) -> Self {
        match cell {
            "" | "Unknown" => ConfidenceLevel::Unknown,
            "High" => ConfidenceLevel::High,
            "Medium" => ConfidenceLevel::Medium,
            "Low" => ConfidenceLevel::Low,
            other => ConfidenceLevel::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::Unknown => "Unknown",
            ConfidenceLevel::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed row of model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub company_name: String,
    pub status: Status,
    pub confidence_level: ConfidenceLevel,
    pub summary: String,
    /// Comma-joined raw URLs as the model wrote them.
    pub links: String,
}

impl AnalysisResult {
    /// Individual links: split on commas, trimmed, empties dropped.
    pub fn link_list(&self) -> Vec<&str> {
        self.links
            .split(',')
            .map(str::trim)
            .filter(|link| !link.is_empty())
            .collect()
    }
}

/// A source the service grounded its answer in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub uri: String,
    /// May be empty.
    pub title: String,
}
