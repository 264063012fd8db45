#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use statuscheck_core::{CompanyFields, CompanyRecord, Citation};
use statuscheck_engine::{AnalysisClient, BatchError, BatchResponse, EngineEvent, ProgressSink};

pub fn companies(count: usize) -> Vec<CompanyRecord> {
    (0..count)
        .map(|i| {
            CompanyRecord::new(CompanyFields::new(format!("Company {i}"), "", "Somewhere"))
                .expect("valid company")
        })
        .collect()
}

pub fn table_for(batch: &[CompanyRecord]) -> String {
    let mut out = String::from(
        "| Company Name | Status | Confidence Level | Brief Summary | Supporting Links |\n|---|---|---|---|---|\n",
    );
    for company in batch {
        out.push_str(&format!(
            "| {} | Active | High | Still operating. | https://{}.example |\n",
            company.name(),
            company.name().replace(' ', "-").to_lowercase()
        ));
    }
    out
}

/// Echoes each batch back as a well-formed table, one citation per batch.
/// Calls listed in `failures` (1-based) return the given error instead.
#[derive(Default)]
pub struct EchoClient {
    pub calls: Mutex<Vec<Vec<String>>>,
    pub failures: HashMap<usize, BatchError>,
    pub raw_overrides: HashMap<usize, String>,
    pub latency: Option<Duration>,
}

impl EchoClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, call: usize, error: BatchError) -> Self {
        self.failures.insert(call, error);
        self
    }

    pub fn replying_on(mut self, call: usize, raw: &str) -> Self {
        self.raw_overrides.insert(call, raw.to_string());
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn call_sizes(&self) -> Vec<usize> {
        self.calls.lock().unwrap().iter().map(Vec::len).collect()
    }
}

#[async_trait::async_trait]
impl AnalysisClient for EchoClient {
    async fn analyze(&self, batch: &[CompanyRecord]) -> Result<BatchResponse, BatchError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(batch.iter().map(|c| c.name().to_string()).collect());
            calls.len()
        };
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(error) = self.failures.get(&call) {
            return Err(error.clone());
        }
        let raw_text = self
            .raw_overrides
            .get(&call)
            .cloned()
            .unwrap_or_else(|| table_for(batch));
        Ok(BatchResponse {
            raw_text,
            citations: vec![Citation {
                uri: format!("https://source.example/{call}"),
                title: format!("Source {call}"),
            }],
        })
    }
}

#[derive(Default, Clone)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
