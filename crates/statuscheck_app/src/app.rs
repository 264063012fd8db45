use anyhow::Result;
use statuscheck_core::{update, AppState, AppViewModel, Msg, RunStatus};

use crate::effects::EffectRunner;
use crate::render;

/// Owns the state machine and routes its effects.
pub struct App {
    state: AppState,
    effects: EffectRunner,
}

impl App {
    pub fn new(effects: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            effects,
        }
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn effects(&self) -> &EffectRunner {
        &self.effects
    }

    /// Applies `msg`, runs the resulting effects, and returns the view when
    /// something changed.
    pub fn dispatch(&mut self, msg: Msg) -> Result<Option<AppViewModel>> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let view = state.consume_dirty().then(|| state.view());
        self.state = state;
        self.effects.run(effects)?;
        Ok(view)
    }

    /// Starts a run over the queue and pumps engine events until it ends,
    /// printing progress as it changes.
    pub fn run_analysis(&mut self) -> Result<RunStatus> {
        self.dispatch(Msg::AnalyzeClicked)?;
        if self.state.run_status() != RunStatus::Running {
            return Ok(self.state.run_status());
        }

        let mut last_progress = None;
        while self.state.run_status() == RunStatus::Running {
            let Some(msg) = self.effects.next_message() else {
                anyhow::bail!("analysis engine stopped unexpectedly");
            };
            if let Some(view) = self.dispatch(msg)? {
                let progress = render::progress_line(&view);
                if progress.is_some() && progress != last_progress {
                    if let Some(line) = &progress {
                        eprintln!("{line}");
                    }
                    last_progress = progress;
                }
            }
        }
        Ok(self.state.run_status())
    }
}
