mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{companies, EchoClient, RecordingSink};
use pretty_assertions::assert_eq;
use statuscheck_core::ParseError;
use statuscheck_engine::{
    BatchError, BatchScheduler, EngineEvent, FailureKind, RunError, SchedulerSettings,
};
use tokio_util::sync::CancellationToken;

fn scheduler(client: Arc<EchoClient>) -> BatchScheduler {
    engine_logging::initialize_for_tests();
    BatchScheduler::new(client, SchedulerSettings::default())
}

#[tokio::test(start_paused = true)]
async fn eleven_companies_run_as_two_batches() {
    let client = Arc::new(EchoClient::new());
    let scheduler = scheduler(client.clone());
    let sink = RecordingSink::default();
    let queue = companies(11);

    let report = scheduler
        .run(&queue, &sink, &CancellationToken::new())
        .await
        .expect("run ok");

    assert_eq!(client.call_sizes(), vec![10, 1]);
    assert_eq!(report.batches, 2);
    assert_eq!(report.results.len(), 11);
    let names: Vec<String> = report.results.iter().map(|r| r.company_name.clone()).collect();
    let expected: Vec<String> = queue.iter().map(|c| c.name().to_string()).collect();
    assert_eq!(names, expected);
    assert_eq!(report.citations.len(), 2);
    assert!(!scheduler.is_running());
}

#[tokio::test(start_paused = true)]
async fn events_follow_batch_wait_batch_order() {
    let client = Arc::new(EchoClient::new());
    let scheduler = scheduler(client);
    let sink = RecordingSink::default();

    scheduler
        .run(&companies(11), &sink, &CancellationToken::new())
        .await
        .expect("run ok");

    let events = sink.take();
    assert_eq!(events.len(), 5);
    match &events[0] {
        EngineEvent::BatchStarted(span) => {
            assert_eq!(span.label(), "Analyzing batch 1 of 2 (1-10 of 11)")
        }
        other => panic!("unexpected event {other:?}"),
    }
    match &events[1] {
        EngineEvent::BatchCompleted { batch, results, .. } => {
            assert_eq!(*batch, 1);
            assert_eq!(results.len(), 10);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(
        events[2],
        EngineEvent::Waiting {
            batch: 1,
            delay: Duration::from_secs(5)
        }
    );
    match &events[3] {
        EngineEvent::BatchStarted(span) => {
            assert_eq!(span.label(), "Analyzing batch 2 of 2 (11-11 of 11)")
        }
        other => panic!("unexpected event {other:?}"),
    }
    match &events[4] {
        EngineEvent::BatchCompleted {
            batch,
            results,
            citations,
        } => {
            assert_eq!(*batch, 2);
            assert_eq!(results.len(), 11);
            assert_eq!(citations.len(), 2);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn pauses_between_batches_but_not_after_the_last() {
    let client = Arc::new(EchoClient::new());
    let scheduler = scheduler(client);
    let sink = RecordingSink::default();

    let started = tokio::time::Instant::now();
    scheduler
        .run(&companies(25), &sink, &CancellationToken::new())
        .await
        .expect("run ok");

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(10), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(11), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn single_batch_run_never_waits() {
    let client = Arc::new(EchoClient::new());
    let scheduler = scheduler(client);
    let sink = RecordingSink::default();

    let started = tokio::time::Instant::now();
    scheduler
        .run(&companies(10), &sink, &CancellationToken::new())
        .await
        .expect("run ok");

    assert_eq!(started.elapsed(), Duration::ZERO);
    assert!(!sink
        .take()
        .iter()
        .any(|e| matches!(e, EngineEvent::Waiting { .. })));
}

#[tokio::test]
async fn empty_queue_fails_without_calling_client() {
    let client = Arc::new(EchoClient::new());
    let scheduler = scheduler(client.clone());
    let sink = RecordingSink::default();

    let err = scheduler
        .run(&[], &sink, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err, RunError::EmptyInput);
    assert!(client.call_sizes().is_empty());
    assert!(sink.take().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failure_on_batch_two_stops_the_run() {
    let client = Arc::new(EchoClient::new().failing_on(
        2,
        BatchError::service(FailureKind::HttpStatus(429), "rate limited"),
    ));
    let scheduler = scheduler(client.clone());
    let sink = RecordingSink::default();

    let err = scheduler
        .run(&companies(25), &sink, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Analysis failed on batch 2. Error: rate limited"
    );
    assert_eq!(client.call_sizes(), vec![10, 10]);
    let partial = err.partial().expect("partial report");
    assert_eq!(partial.batches, 1);
    assert_eq!(partial.results.len(), 10);
    assert_eq!(partial.results[0].company_name, "Company 0");
    assert!(!scheduler.is_running());
}

#[tokio::test(start_paused = true)]
async fn unparsable_response_is_a_batch_failure() {
    let client = Arc::new(EchoClient::new().replying_on(1, "I'm sorry, I can't do that."));
    let scheduler = scheduler(client.clone());
    let sink = RecordingSink::default();

    let err = scheduler
        .run(&companies(15), &sink, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        RunError::BatchFailed {
            batch,
            source,
            partial,
        } => {
            assert_eq!(batch, 1);
            assert_eq!(source, BatchError::Parse(ParseError));
            assert!(partial.results.is_empty());
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(client.call_sizes(), vec![10]);
}

#[tokio::test(start_paused = true)]
async fn whitespace_only_response_fails_the_batch() {
    let client = Arc::new(EchoClient::new().replying_on(2, "  \n "));
    let scheduler = scheduler(client.clone());
    let sink = RecordingSink::default();
    let queue = companies(15);

    let err = scheduler
        .run(&queue, &sink, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        RunError::BatchFailed {
            batch,
            source,
            partial,
        } => {
            assert_eq!(batch, 2);
            assert_eq!(source, BatchError::Parse(ParseError));
            assert_eq!(partial.results.len(), 10);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(queue.len(), 15);
}

#[tokio::test(start_paused = true)]
async fn empty_response_text_yields_no_rows_without_failing() {
    let client = Arc::new(EchoClient::new().replying_on(1, ""));
    let scheduler = scheduler(client);
    let sink = RecordingSink::default();

    let report = scheduler
        .run(&companies(3), &sink, &CancellationToken::new())
        .await
        .expect("run ok");

    assert!(report.results.is_empty());
    assert_eq!(report.batches, 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_run_is_rejected() {
    let client = Arc::new(EchoClient::new().with_latency(Duration::from_secs(1)));
    let scheduler = scheduler(client.clone());
    let sink = RecordingSink::default();
    let token = CancellationToken::new();
    let queue = companies(3);

    let (first, second) = tokio::join!(
        scheduler.run(&queue, &sink, &token),
        scheduler.run(&queue, &sink, &token)
    );

    assert!(first.is_ok());
    assert_eq!(second.unwrap_err(), RunError::AlreadyRunning);
    assert_eq!(client.call_sizes(), vec![3]);

    // The guard is released, so a follow-up run is accepted.
    assert!(scheduler.run(&queue, &sink, &token).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn cancel_during_wait_stops_before_next_batch() {
    let client = Arc::new(EchoClient::new());
    let scheduler = scheduler(client.clone());
    let sink = RecordingSink::default();
    let token = CancellationToken::new();
    let canceller = token.clone();

    let queue = companies(25);
    let (outcome, _) = tokio::join!(scheduler.run(&queue, &sink, &token), async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        canceller.cancel();
    });

    match outcome.unwrap_err() {
        RunError::Cancelled { total, partial } => {
            assert_eq!(total, 3);
            assert_eq!(partial.batches, 1);
            assert_eq!(partial.results.len(), 10);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(client.call_sizes(), vec![10]);
}

#[tokio::test]
async fn cancelled_token_prevents_any_call() {
    let client = Arc::new(EchoClient::new());
    let scheduler = scheduler(client.clone());
    let sink = RecordingSink::default();
    let token = CancellationToken::new();
    token.cancel();

    let err = scheduler.run(&companies(2), &sink, &token).await.unwrap_err();

    assert!(matches!(err, RunError::Cancelled { total: 1, .. }));
    assert!(client.call_sizes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn custom_batch_size_is_honoured() {
    let client = Arc::new(EchoClient::new());
    let scheduler = BatchScheduler::new(
        client.clone(),
        SchedulerSettings {
            batch_size: 4,
            inter_batch_delay: Duration::from_millis(10),
        },
    );
    let sink = RecordingSink::default();

    scheduler
        .run(&companies(9), &sink, &CancellationToken::new())
        .await
        .expect("run ok");

    assert_eq!(client.call_sizes(), vec![4, 4, 1]);
}
