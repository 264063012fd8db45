use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_error, engine_info, engine_warn};
use statuscheck_core::CompanyRecord;
use tokio_util::sync::CancellationToken;

use crate::client::AnalysisClient;
use crate::scheduler::{BatchScheduler, ChannelProgressSink, SchedulerSettings};
use crate::EngineEvent;

enum EngineCommand {
    StartRun {
        companies: Vec<CompanyRecord>,
        cancel: CancellationToken,
    },
    CancelOnInterrupt,
}

/// Runs analyses on a background tokio runtime and reports back over a channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    /// Token of the most recently queued run.
    current: Arc<Mutex<CancellationToken>>,
}

impl EngineHandle {
    pub fn new(client: Arc<dyn AnalysisClient>, settings: SchedulerSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let scheduler = Arc::new(BatchScheduler::new(client, settings));
        let current = Arc::new(Mutex::new(CancellationToken::new()));
        let worker_current = current.clone();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::StartRun { companies, cancel } => {
                        let scheduler = scheduler.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            run(scheduler.as_ref(), companies, cancel, event_tx).await;
                        });
                    }
                    EngineCommand::CancelOnInterrupt => {
                        runtime.spawn(watch_interrupt(worker_current.clone()));
                    }
                }
            }
        });

        Self {
            cmd_tx,
            event_rx,
            current,
        }
    }

    /// Queues a run. Its token is registered before this returns, so a
    /// following [`cancel`](Self::cancel) always reaches it.
    pub fn start_run(&self, companies: Vec<CompanyRecord>) {
        engine_info!("Queueing analysis run for {} companies", companies.len());
        let cancel = CancellationToken::new();
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = cancel.clone();
        let _ = self
            .cmd_tx
            .send(EngineCommand::StartRun { companies, cancel });
    }

    /// Cancels the latest run before its next batch. The request in flight
    /// is not aborted.
    pub fn cancel(&self) {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    /// Routes Ctrl-C to [`cancel`](Self::cancel) for as long as the engine lives.
    pub fn cancel_on_interrupt(&self) {
        let _ = self.cmd_tx.send(EngineCommand::CancelOnInterrupt);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event, or `None` once the engine has stopped.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn run(
    scheduler: &BatchScheduler,
    companies: Vec<CompanyRecord>,
    cancel: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let sink = ChannelProgressSink::new(event_tx.clone());
    let outcome = scheduler.run(&companies, &sink, &cancel).await;
    let _ = event_tx.send(EngineEvent::RunFinished(outcome));
}

async fn watch_interrupt(current: Arc<Mutex<CancellationToken>>) {
    loop {
        if let Err(err) = tokio::signal::ctrl_c().await {
            engine_error!("Cannot listen for Ctrl-C: {}", err);
            return;
        }
        engine_warn!("Interrupt received, cancelling before the next batch");
        current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}
