use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use cohort_core::{CohortOutcome, CohortSupervisor, Subscribe, SupervisorConfig};
use cohort_model::Manifest;
use cohort_observe::Journal;
use cohort_signal::SignalStore;

use crate::cli::SuperviseArgs;

/// Launch every worker of the manifest and supervise the cohort.
///
/// Returns the exit status for this process: `0` when all workers succeeded or a reboot
/// cut supervision short, `1` when at least one worker gave up.
pub async fn run(store: SignalStore, args: SuperviseArgs) -> anyhow::Result<i32> {
    let raw = tokio::fs::read_to_string(&args.manifest)
        .await
        .with_context(|| format!("reading manifest {}", args.manifest.display()))?;
    let manifest = Manifest::from_json(&raw)?;

    if args.clear {
        let removed = store.clear_all()?;
        info!(removed, root = %store.root().display(), "signals cleared");
    }

    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Journal::new())];
    let mut sup = CohortSupervisor::new(
        store,
        SupervisorConfig {
            max_attempts: args.max_attempts,
        },
    )
    .with_subscribers(subscribers);

    for worker in manifest.workers {
        let label = worker.label();
        sup.spawn(worker)
            .await
            .with_context(|| format!("starting worker {label}"))?;
    }
    info!(workers = sup.outstanding(), "cohort started");

    let outcome = sup.run().await?;
    match &outcome {
        CohortOutcome::Drained(report) => {
            for failed in report.failed() {
                error!(
                    worker = %failed.spec.label(),
                    attempts = failed.resolution.attempts(),
                    resolution = ?failed.resolution,
                    "worker failed after exhausting retries"
                );
            }
        }
        CohortOutcome::Reboot { outstanding, .. } => {
            info!(outstanding, "reboot pending; leaving remaining workers to the next boot");
        }
    }
    Ok(outcome.exit_code())
}
