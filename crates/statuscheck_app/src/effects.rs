use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use engine_logging::{engine_info, engine_warn};
use statuscheck_core::{Effect, Msg};
use statuscheck_engine::{export_results, EngineEvent, EngineHandle, ExportSummary, RunError};

use crate::persistence;

/// Carries out effects returned by `update` and feeds engine events back as
/// messages.
pub struct EffectRunner {
    state_dir: PathBuf,
    export_path: PathBuf,
    engine: Option<EngineHandle>,
    last_export: Option<ExportSummary>,
}

impl EffectRunner {
    pub fn new(state_dir: PathBuf, export_path: PathBuf) -> Self {
        Self {
            state_dir,
            export_path,
            engine: None,
            last_export: None,
        }
    }

    /// Runner for queue edits only: no engine, no export target.
    pub fn for_queue(state_dir: &Path) -> Self {
        Self::new(state_dir.to_path_buf(), PathBuf::new())
    }

    pub fn with_engine(mut self, engine: EngineHandle) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn last_export(&self) -> Option<&ExportSummary> {
        self.last_export.as_ref()
    }

    pub fn run(&mut self, effects: Vec<Effect>) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::StartRun { companies } => {
                    let Some(engine) = &self.engine else {
                        bail!("no analysis engine configured");
                    };
                    engine_info!("StartRun companies={}", companies.len());
                    engine.start_run(companies);
                }
                Effect::PersistQueue { companies } => {
                    persistence::save_queue(&self.state_dir, &companies)?;
                }
                Effect::ExportResults { results } => {
                    let (dir, filename) = split_export_path(&self.export_path)?;
                    let summary = export_results(&dir, &filename, &results)
                        .with_context(|| format!("exporting to {:?}", self.export_path))?;
                    self.last_export = Some(summary);
                }
            }
        }
        Ok(())
    }

    /// Blocks for the next engine event. `None` when there is no engine or
    /// it has stopped.
    pub fn next_message(&self) -> Option<Msg> {
        let event = self.engine.as_ref()?.recv()?;
        Some(map_event(event))
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::BatchStarted(span) => Msg::BatchStarted(span),
        EngineEvent::BatchCompleted {
            batch,
            results,
            citations,
        } => Msg::BatchCompleted {
            batch,
            results,
            citations,
        },
        EngineEvent::Waiting { batch, delay } => Msg::BatchWaiting { batch, delay },
        EngineEvent::RunFinished(Ok(_)) => Msg::RunSucceeded,
        EngineEvent::RunFinished(Err(err)) => match err {
            RunError::BatchFailed { batch, source, .. } => {
                engine_warn!("Batch {} failed: {}", batch, source);
                Msg::RunFailed {
                    batch,
                    message: source.to_string(),
                }
            }
            RunError::Cancelled { .. } => Msg::RunCancelled,
            other @ (RunError::EmptyInput | RunError::AlreadyRunning) => Msg::RunRejected {
                message: other.to_string(),
            },
        },
    }
}

fn split_export_path(path: &Path) -> Result<(PathBuf, String)> {
    let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
        bail!("export path {path:?} has no file name");
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, filename.to_string()))
}
