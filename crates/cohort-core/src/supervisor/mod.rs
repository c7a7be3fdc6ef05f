mod report;
pub use report::{CohortOutcome, CohortReport, WorkerReport, WorkerResolution};

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use cohort_exec::{ExecResult, launch};
use cohort_model::{CohortEvent, DEFAULT_MAX_ATTEMPTS, EventKind, ExitOutcome, REBOOT, WorkerSpec};
use cohort_signal::{SignalError, SignalStore};

use crate::{error::CoreError, subscriber::Subscribe};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Attempts per worker, the first one included. Values below 1 act as 1.
    pub max_attempts: u32,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Result of driving the supervisor by one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Workers are still outstanding.
    Pending,
    /// Nothing is outstanding any more.
    Drained,
    /// The reboot signal was observed.
    Reboot,
}

struct Slot {
    spec: WorkerSpec,
    attempt: u32,
}

struct Exit {
    id: usize,
    result: ExecResult<ExitOutcome>,
}

/// Runs a cohort of worker processes to completion.
///
/// Exit notifications of all workers arrive on one channel and are consumed only by the
/// supervising task, which owns the outstanding counter. Simultaneous exits are therefore
/// each counted exactly once.
pub struct CohortSupervisor {
    cfg: SupervisorConfig,
    store: SignalStore,
    subscribers: Vec<Arc<dyn Subscribe>>,

    slots: HashMap<usize, Slot>,
    next_id: usize,
    outstanding: usize,
    drained: bool,
    report: CohortReport,

    exits_tx: mpsc::UnboundedSender<Exit>,
    exits_rx: mpsc::UnboundedReceiver<Exit>,
}

impl CohortSupervisor {
    pub fn new(store: SignalStore, cfg: SupervisorConfig) -> Self {
        let (exits_tx, exits_rx) = mpsc::unbounded_channel();
        Self {
            cfg,
            store,
            subscribers: Vec::new(),
            slots: HashMap::new(),
            next_id: 0,
            outstanding: 0,
            drained: false,
            report: CohortReport::default(),
            exits_tx,
            exits_rx,
        }
    }

    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    pub fn store(&self) -> &SignalStore {
        &self.store
    }

    /// Workers launched but not resolved yet. A worker being retried counts once.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Workers resolved so far.
    pub fn report(&self) -> &CohortReport {
        &self.report
    }

    fn max_attempts(&self) -> u32 {
        self.cfg.max_attempts.max(1)
    }

    /// Launch the first attempt of a new worker and return its id.
    ///
    /// A worker the OS refuses to start is not counted and not retried.
    #[instrument(level = "debug", skip(self, spec), fields(program = %spec.program))]
    pub async fn spawn(&mut self, spec: WorkerSpec) -> Result<usize, CoreError> {
        let id = self.next_id;

        self.outstanding += 1;
        if let Err(e) = self.launch_attempt(id, &spec) {
            self.outstanding -= 1;
            error!(target: "cohort.core", worker = %spec.label(), error = %e, "worker could not be spawned");
            return Err(e.into());
        }
        self.next_id += 1;
        self.drained = false;

        let label = spec.label();
        self.slots.insert(id, Slot { spec, attempt: 1 });
        self.emit(
            CohortEvent::new(EventKind::WorkerSpawned, self.outstanding).with_worker(label, 1),
        )
        .await;
        Ok(id)
    }

    /// Supervise until every worker is resolved or the reboot signal is raised.
    ///
    /// The reboot signal is subscribed to once for the whole run. There is no timeout:
    /// a worker that never exits keeps the supervisor waiting.
    pub async fn run(mut self) -> Result<CohortOutcome, CoreError> {
        let store = self.store.clone();
        let reboot_name = REBOOT;
        let reboot = store.wait(&reboot_name);
        tokio::pin!(reboot);

        loop {
            match self.advance(reboot.as_mut()).await? {
                Step::Pending => continue,
                Step::Drained => return Ok(CohortOutcome::Drained(self.report)),
                Step::Reboot => {
                    return Ok(CohortOutcome::Reboot {
                        outstanding: self.outstanding,
                        report: self.report,
                    });
                }
            }
        }
    }

    /// Handle the next exit notification or the reboot signal, whichever comes first.
    pub async fn step(&mut self) -> Result<Step, CoreError> {
        let store = self.store.clone();
        let reboot_name = REBOOT;
        let reboot = store.wait(&reboot_name);
        tokio::pin!(reboot);

        self.advance(reboot.as_mut()).await
    }

    async fn advance<F>(&mut self, reboot: Pin<&mut F>) -> Result<Step, CoreError>
    where
        F: Future<Output = Result<(), SignalError>>,
    {
        if self.outstanding == 0 {
            self.on_drained().await;
            return Ok(Step::Drained);
        }

        tokio::select! {
            biased;
            res = reboot => {
                res?;
                info!(target: "cohort.core", outstanding = self.outstanding, "reboot signal observed; abandoning supervision");
                self.emit(CohortEvent::new(EventKind::RebootObserved, self.outstanding)).await;
                return Ok(Step::Reboot);
            }
            exit = self.exits_rx.recv() => {
                if let Some(exit) = exit {
                    self.on_exit(exit).await;
                }
            }
        }

        if self.outstanding == 0 {
            self.on_drained().await;
            return Ok(Step::Drained);
        }
        Ok(Step::Pending)
    }

    async fn on_drained(&mut self) {
        if self.drained {
            return;
        }
        self.drained = true;
        info!(
            target: "cohort.core",
            workers = self.report.workers.len(),
            failed = self.report.failed().count(),
            "cohort drained"
        );
        self.emit(CohortEvent::new(EventKind::CohortDrained, 0)).await;
    }

    async fn on_exit(&mut self, Exit { id, result }: Exit) {
        let Some(mut slot) = self.slots.remove(&id) else {
            warn!(target: "cohort.core", id, "exit of unknown worker ignored");
            return;
        };
        let label = slot.spec.label();
        let attempt = slot.attempt;

        let last_exit = match result {
            Ok(outcome) if outcome.is_success() => {
                debug!(target: "cohort.core", worker = %label, attempt, "worker succeeded");
                self.resolve(id, slot.spec, WorkerResolution::Succeeded { attempts: attempt });
                self.emit(
                    CohortEvent::new(EventKind::WorkerSucceeded, self.outstanding)
                        .with_worker(label, attempt),
                )
                .await;
                return;
            }
            Ok(outcome) => outcome,
            Err(e) => {
                // The child may still be running; relaunching could leave two copies alive.
                error!(target: "cohort.core", worker = %label, attempt, error = %e, "exit status unavailable; giving up on worker");
                self.resolve(
                    id,
                    slot.spec,
                    WorkerResolution::Lost {
                        attempts: attempt,
                        reason: e.to_string(),
                    },
                );
                self.emit(
                    CohortEvent::new(EventKind::WorkerLost, self.outstanding)
                        .with_worker(label, attempt)
                        .with_reason(e.to_string()),
                )
                .await;
                return;
            }
        };
        let reason = last_exit.to_string();
        self.emit(
            CohortEvent::new(EventKind::WorkerFailed, self.outstanding)
                .with_worker(&label, attempt)
                .with_reason(&reason),
        )
        .await;

        if attempt >= self.max_attempts() {
            warn!(
                target: "cohort.core",
                worker = %label,
                attempts = attempt,
                %reason,
                "worker exhausted its attempts; giving up"
            );
            self.resolve(
                id,
                slot.spec,
                WorkerResolution::Exhausted {
                    attempts: attempt,
                    last_exit,
                },
            );
            self.emit(
                CohortEvent::new(EventKind::WorkerExhausted, self.outstanding)
                    .with_worker(label, attempt)
                    .with_reason(reason),
            )
            .await;
            return;
        }

        slot.attempt += 1;
        match self.launch_attempt(id, &slot.spec) {
            Ok(()) => {
                info!(target: "cohort.core", worker = %label, attempt = slot.attempt, %reason, "retrying worker");
                let next = slot.attempt;
                self.slots.insert(id, slot);
                self.emit(
                    CohortEvent::new(EventKind::RetryScheduled, self.outstanding)
                        .with_worker(label, next)
                        .with_reason(reason),
                )
                .await;
            }
            Err(e) => {
                error!(target: "cohort.core", worker = %label, attempt = slot.attempt, error = %e, "retry could not be spawned; giving up");
                self.resolve(
                    id,
                    slot.spec,
                    WorkerResolution::Lost {
                        attempts: attempt,
                        reason: e.to_string(),
                    },
                );
                self.emit(
                    CohortEvent::new(EventKind::WorkerLost, self.outstanding)
                        .with_worker(label, attempt)
                        .with_reason(e.to_string()),
                )
                .await;
            }
        }
    }

    fn resolve(&mut self, id: usize, spec: WorkerSpec, resolution: WorkerResolution) {
        self.outstanding -= 1;
        self.report.workers.push(WorkerReport {
            id,
            spec,
            resolution,
        });
    }

    fn launch_attempt(&self, id: usize, spec: &WorkerSpec) -> ExecResult<()> {
        let worker = launch(spec)?;
        let tx = self.exits_tx.clone();
        tokio::spawn(async move {
            let result = worker.wait().await;
            let _ = tx.send(Exit { id, result });
        });
        Ok(())
    }

    async fn emit(&self, event: CohortEvent) {
        for sub in &self.subscribers {
            sub.on_event(&event).await;
        }
    }
}
