use crate::batch::failure_message;
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::CompanySubmitted(fields) => match state.add_single(fields) {
            Ok(_) => vec![persist(&state)],
            Err(_) => Vec::new(),
        },
        Msg::BulkUploaded(raw) => match state.add_bulk(&raw) {
            Ok(added) if added > 0 => vec![persist(&state)],
            _ => Vec::new(),
        },
        Msg::CompanyRemoved(id) => {
            if state.remove(&id) {
                vec![persist(&state)]
            } else {
                Vec::new()
            }
        }
        Msg::RestoreQueue(records) => {
            state.restore_queue(records);
            Vec::new()
        }
        Msg::AnalyzeClicked => match state.begin_run() {
            Some(companies) => vec![Effect::StartRun { companies }],
            None => Vec::new(),
        },
        Msg::BatchStarted(span) => {
            state.apply_batch_started(span);
            Vec::new()
        }
        Msg::BatchCompleted {
            results, citations, ..
        } => {
            state.apply_snapshot(results, citations);
            Vec::new()
        }
        Msg::BatchWaiting { batch, delay } => {
            state.apply_waiting(batch, delay);
            Vec::new()
        }
        Msg::RunSucceeded => {
            if state.finish_success() {
                vec![persist(&state)]
            } else {
                Vec::new()
            }
        }
        Msg::RunFailed { batch, message } => {
            state.finish_failure(failure_message(batch, &message));
            Vec::new()
        }
        Msg::RunCancelled => {
            state.finish_cancelled();
            Vec::new()
        }
        Msg::RunRejected { message } => {
            state.finish_failure(message);
            Vec::new()
        }
        Msg::ExportClicked => {
            if state.results().is_empty() {
                Vec::new()
            } else {
                vec![Effect::ExportResults {
                    results: state.results().to_vec(),
                }]
            }
        }
        Msg::ResultsCleared => {
            state.clear_results();
            Vec::new()
        }
    };

    (state, effects)
}

fn persist(state: &AppState) -> Effect {
    Effect::PersistQueue {
        companies: state.queue().to_vec(),
    }
}
