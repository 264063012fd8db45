use std::time::Duration;

use pretty_assertions::assert_eq;
use statuscheck_core::{
    parse_response, partition, update, AnalysisResult, AppState, Citation, CompanyFields,
    ConfidenceLevel, Effect, Msg, RunStatus, Status, BATCH_SIZE, EMPTY_QUEUE_MESSAGE,
    INTER_BATCH_DELAY, PREPARING_LABEL,
};

fn queued(count: usize) -> AppState {
    let mut state = AppState::new();
    for i in 0..count {
        let (next, _) = update(
            state,
            Msg::CompanySubmitted(CompanyFields::new(format!("Company {i}"), "", "Somewhere")),
        );
        state = next;
    }
    state
}

fn result(name: &str) -> AnalysisResult {
    AnalysisResult {
        company_name: name.to_string(),
        status: Status::Active,
        confidence_level: ConfidenceLevel::High,
        summary: "Operating.".to_string(),
        links: String::new(),
    }
}

fn citation(uri: &str) -> Citation {
    Citation {
        uri: uri.to_string(),
        title: String::new(),
    }
}

fn start(state: AppState) -> AppState {
    let (state, effects) = update(state, Msg::AnalyzeClicked);
    assert!(matches!(effects.as_slice(), [Effect::StartRun { .. }]));
    state
}

#[test]
fn analyze_with_empty_queue_reports_error_without_effects() {
    let (state, effects) = update(AppState::new(), Msg::AnalyzeClicked);

    assert!(effects.is_empty());
    assert_eq!(state.run_status(), RunStatus::Idle);
    assert_eq!(state.view().error.as_deref(), Some(EMPTY_QUEUE_MESSAGE));
}

#[test]
fn analyze_snapshots_queue_and_resets_previous_output() {
    let state = queued(3);
    let expected = state.queue().to_vec();

    let (state, effects) = update(state, Msg::AnalyzeClicked);
    let view = state.view();

    assert_eq!(effects, vec![Effect::StartRun { companies: expected }]);
    assert_eq!(view.run, RunStatus::Running);
    assert_eq!(view.progress, PREPARING_LABEL);
    assert_eq!(view.analyze_label.as_deref(), Some("Analyzing..."));
    assert!(view.results.is_empty());
    assert!(!view.show_results);
}

#[test]
fn analyze_while_running_is_ignored() {
    let state = start(queued(2));
    let (state, effects) = update(state, Msg::AnalyzeClicked);

    assert!(effects.is_empty());
    assert_eq!(state.run_status(), RunStatus::Running);
}

#[test]
fn eleven_companies_complete_in_two_batches_and_drain_queue() {
    let state = queued(11);
    let batches = partition(state.queue(), BATCH_SIZE);
    assert_eq!(
        batches.iter().map(|(_, b)| b.len()).collect::<Vec<_>>(),
        vec![10, 1]
    );
    let spans: Vec<_> = batches.iter().map(|(span, _)| *span).collect();

    let state = start(state);
    let (state, _) = update(state, Msg::BatchStarted(spans[0]));
    assert_eq!(state.view().progress, "Analyzing batch 1 of 2 (1-10 of 11)");

    let first: Vec<AnalysisResult> = (0..10).map(|i| result(&format!("Company {i}"))).collect();
    let (state, _) = update(
        state,
        Msg::BatchCompleted {
            batch: 1,
            results: first.clone(),
            citations: vec![citation("https://a.example")],
        },
    );
    assert_eq!(state.view().results.len(), 10);

    let (state, _) = update(
        state,
        Msg::BatchWaiting {
            batch: 1,
            delay: INTER_BATCH_DELAY,
        },
    );
    assert_eq!(
        state.view().progress,
        "Batch 1 complete. Waiting 5 seconds to avoid rate limits..."
    );

    let (state, _) = update(state, Msg::BatchStarted(spans[1]));
    let mut all = first;
    all.push(result("Company 10"));
    let (state, _) = update(
        state,
        Msg::BatchCompleted {
            batch: 2,
            results: all.clone(),
            citations: vec![citation("https://a.example"), citation("https://a.example")],
        },
    );
    let (state, effects) = update(state, Msg::RunSucceeded);
    let view = state.view();

    assert_eq!(view.run, RunStatus::Completed);
    assert_eq!(view.results, all);
    assert_eq!(view.citations.len(), 2);
    assert!(view.queue.is_empty());
    assert!(view.progress.is_empty());
    assert!(view.show_results);
    assert_eq!(view.analyze_label, None);
    assert_eq!(effects, vec![Effect::PersistQueue { companies: Vec::new() }]);
}

#[test]
fn failure_keeps_partial_results_and_queue() {
    let state = start(queued(25));
    let (state, _) = update(
        state,
        Msg::BatchCompleted {
            batch: 1,
            results: vec![result("Company 0")],
            citations: Vec::new(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::RunFailed {
            batch: 2,
            message: "rate limited".to_string(),
        },
    );
    let view = state.view();

    assert!(effects.is_empty());
    assert_eq!(view.run, RunStatus::Failed);
    assert_eq!(
        view.error.as_deref(),
        Some("Analysis failed on batch 2. Error: rate limited")
    );
    assert_eq!(view.results, vec![result("Company 0")]);
    assert_eq!(view.queue.len(), 25);
    assert!(view.show_results);
}

#[test]
fn whitespace_reply_keeps_companies_queued() {
    let state = start(queued(3));
    let err = parse_response(" \n\t").unwrap_err();
    let (state, effects) = update(
        state,
        Msg::RunFailed {
            batch: 1,
            message: err.to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.queue().len(), 3);
    assert_eq!(
        state.view().error.as_deref(),
        Some("Analysis failed on batch 1. Error: could not extract any result rows from a non-empty response")
    );
}

#[test]
fn retry_after_failure_clears_error_and_results() {
    let state = start(queued(2));
    let (state, _) = update(
        state,
        Msg::RunFailed {
            batch: 1,
            message: "boom".into(),
        },
    );
    let state = start(state);
    let view = state.view();

    assert_eq!(view.error, None);
    assert!(view.results.is_empty());
    assert_eq!(view.run, RunStatus::Running);
}

#[test]
fn companies_added_mid_run_survive_success() {
    let state = start(queued(2));
    let (state, _) = update(
        state,
        Msg::CompanySubmitted(CompanyFields::new("Late", "", "Nowhere")),
    );
    let (state, _) = update(state, Msg::RunSucceeded);

    let names: Vec<&str> = state.queue().iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Late"]);
}

#[test]
fn cancelled_run_keeps_queue() {
    let state = start(queued(4));
    let (state, _) = update(state, Msg::RunCancelled);

    assert_eq!(state.run_status(), RunStatus::Cancelled);
    assert_eq!(state.queue().len(), 4);
    assert_eq!(state.view().error, None);
}

#[test]
fn rejected_run_surfaces_engine_message() {
    let state = start(queued(1));
    let (state, _) = update(
        state,
        Msg::RunRejected {
            message: "an analysis run is already in progress".into(),
        },
    );
    assert_eq!(state.run_status(), RunStatus::Failed);
    assert_eq!(
        state.view().error.as_deref(),
        Some("an analysis run is already in progress")
    );
    assert_eq!(state.queue().len(), 1);
}

#[test]
fn engine_events_outside_a_run_are_ignored() {
    let state = queued(1);
    let (state, effects) = update(state, Msg::RunSucceeded);
    assert!(effects.is_empty());
    assert_eq!(state.queue().len(), 1);

    let (state, _) = update(
        state,
        Msg::BatchWaiting {
            batch: 1,
            delay: Duration::from_secs(5),
        },
    );
    assert!(state.view().progress.is_empty());
}

#[test]
fn export_and_clear_results() {
    let state = start(queued(1));
    let (state, effects) = update(state, Msg::ExportClicked);
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::BatchCompleted {
            batch: 1,
            results: vec![result("Company 0")],
            citations: vec![citation("https://a.example")],
        },
    );
    let (state, _) = update(state, Msg::RunSucceeded);
    let (state, effects) = update(state, Msg::ExportClicked);
    assert_eq!(
        effects,
        vec![Effect::ExportResults {
            results: vec![result("Company 0")]
        }]
    );

    let (state, _) = update(state, Msg::ResultsCleared);
    let view = state.view();
    assert!(view.results.is_empty());
    assert!(view.citations.is_empty());
    assert_eq!(view.run, RunStatus::Idle);
    assert!(!view.show_results);
}

#[test]
fn restore_queue_replaces_pending_records() {
    let saved = queued(3).queue().to_vec();
    let (state, effects) = update(AppState::new(), Msg::RestoreQueue(saved.clone()));

    assert!(effects.is_empty());
    assert_eq!(state.queue(), saved.as_slice());
    assert_eq!(state.view().analyze_label.as_deref(), Some("Analyze 3 Companies"));
}
