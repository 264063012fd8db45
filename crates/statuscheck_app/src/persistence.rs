//! Pending-queue file kept between invocations.
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use serde::{Deserialize, Serialize};
use statuscheck_core::{CompanyFields, CompanyId, CompanyRecord};
use statuscheck_engine::{read_if_exists, AtomicFileWriter};

pub(crate) const QUEUE_FILENAME: &str = ".statuscheck_queue.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedCompany {
    id: String,
    name: String,
    #[serde(default)]
    website: String,
    location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedQueue {
    #[serde(default)]
    saved_utc: String,
    companies: Vec<PersistedCompany>,
}

pub(crate) fn load_queue(state_dir: &Path) -> Result<Vec<CompanyRecord>> {
    let path = state_dir.join(QUEUE_FILENAME);
    let Some(content) =
        read_if_exists(&path).with_context(|| format!("reading queue file {path:?}"))?
    else {
        return Ok(Vec::new());
    };

    let state: PersistedQueue =
        ron::from_str(&content).with_context(|| format!("parsing queue file {path:?}"))?;

    let mut queue = Vec::with_capacity(state.companies.len());
    for company in state.companies {
        let fields = CompanyFields::new(company.name, company.website, company.location);
        match CompanyRecord::with_id(CompanyId::from(company.id), fields) {
            Ok(record) => queue.push(record),
            Err(err) => engine_warn!("Skipping invalid saved company: {}", err),
        }
    }

    engine_info!("Loaded {} queued companies from {:?}", queue.len(), path);
    Ok(queue)
}

pub(crate) fn save_queue(state_dir: &Path, companies: &[CompanyRecord]) -> Result<()> {
    let state = PersistedQueue {
        saved_utc: Utc::now().to_rfc3339(),
        companies: companies
            .iter()
            .map(|record| PersistedCompany {
                id: record.id().to_string(),
                name: record.name().to_string(),
                website: record.website().to_string(),
                location: record.location().to_string(),
            })
            .collect(),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(&state, pretty).context("serializing queue")?;

    let writer = AtomicFileWriter::new(state_dir.to_path_buf());
    let path = writer
        .write(QUEUE_FILENAME, content)
        .with_context(|| format!("writing queue file into {state_dir:?}"))?;
    engine_info!("Saved {} queued companies to {:?}", companies.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(name: &str, website: &str, location: &str) -> CompanyRecord {
        CompanyRecord::new(CompanyFields::new(name, website, location)).unwrap()
    }

    #[test]
    fn missing_file_is_an_empty_queue() {
        let temp = TempDir::new().unwrap();
        assert!(load_queue(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn saved_queue_loads_back_with_ids() {
        let temp = TempDir::new().unwrap();
        let queue = vec![
            record("Acme", "https://acme.example", "Ohio, USA"),
            record("Globex", "", "Springfield"),
        ];

        save_queue(temp.path(), &queue).unwrap();
        let loaded = load_queue(temp.path()).unwrap();

        assert_eq!(loaded, queue);
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(QUEUE_FILENAME),
            r#"(companies: [
                (id: "a", name: "Acme", location: "Ohio"),
                (id: "b", name: "  ", location: "Nowhere"),
            ])"#,
        )
        .unwrap();

        let loaded = load_queue(temp.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id().as_str(), "a");
        assert_eq!(loaded[0].website(), "");
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(QUEUE_FILENAME), "not ron at all {").unwrap();
        assert!(load_queue(temp.path()).is_err());
    }
}
