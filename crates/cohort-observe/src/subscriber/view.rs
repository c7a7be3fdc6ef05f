use std::borrow::Borrow;

use cohort_model::{CohortEvent, EventKind};
use tracing::{debug, error, info, warn};

pub trait View {
    fn as_worker(&self) -> &str;
    fn as_reason(&self) -> &str;
    fn attempt(&self) -> u32;
    fn outstanding(&self) -> usize;
    fn kind(&self) -> EventKind;
}

impl<T> View for T
where
    T: Borrow<CohortEvent>,
{
    #[inline]
    fn as_worker(&self) -> &str {
        self.borrow().worker.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn as_reason(&self) -> &str {
        self.borrow().reason.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn attempt(&self) -> u32 {
        self.borrow().attempt.unwrap_or(0)
    }
    #[inline]
    fn outstanding(&self) -> usize {
        self.borrow().outstanding
    }
    #[inline]
    fn kind(&self) -> EventKind {
        self.borrow().kind
    }
}

#[inline]
pub fn message_for(kind: EventKind) -> &'static str {
    match kind {
        // worker
        EventKind::WorkerSpawned => "worker spawned",
        EventKind::WorkerSucceeded => "worker exited successfully",
        EventKind::WorkerFailed => "worker attempt failed",
        EventKind::RetryScheduled => "worker relaunched after failure",

        // terminal
        EventKind::WorkerExhausted => "worker exhausted its attempts (no further retries)",
        EventKind::WorkerLost => "worker retry could not be spawned (no further retries)",

        // cohort
        EventKind::CohortDrained => "all workers resolved",
        EventKind::RebootObserved => "reboot signal observed; supervision abandoned",
    }
}

#[inline]
pub fn log_event<E: View>(e: E) {
    let msg = message_for(e.kind());

    match e.kind() {
        EventKind::WorkerSpawned => debug!(
            target: "cohort.event",
            worker = e.as_worker(),
            attempt = e.attempt(),
            outstanding = e.outstanding(),
            "{msg}"
        ),
        EventKind::WorkerSucceeded => info!(
            target: "cohort.event",
            worker = e.as_worker(),
            attempt = e.attempt(),
            outstanding = e.outstanding(),
            "{msg}"
        ),
        EventKind::WorkerFailed => warn!(
            target: "cohort.event",
            worker = e.as_worker(),
            attempt = e.attempt(),
            reason = e.as_reason(),
            "{msg}"
        ),
        EventKind::RetryScheduled => info!(
            target: "cohort.event",
            worker = e.as_worker(),
            attempt = e.attempt(),
            reason = e.as_reason(),
            "{msg}"
        ),
        EventKind::WorkerExhausted | EventKind::WorkerLost => error!(
            target: "cohort.event",
            worker = e.as_worker(),
            attempt = e.attempt(),
            reason = e.as_reason(),
            outstanding = e.outstanding(),
            "{msg}"
        ),
        EventKind::CohortDrained => info!(target: "cohort.event", "{msg}"),
        EventKind::RebootObserved => {
            info!(target: "cohort.event", outstanding = e.outstanding(), "{msg}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_falls_back_for_cohort_events() {
        let event = CohortEvent::new(EventKind::CohortDrained, 0);
        assert_eq!(event.as_worker(), "unknown");
        assert_eq!(event.as_reason(), "unknown");
        assert_eq!(View::attempt(&event), 0);
    }

    #[test]
    fn view_reads_worker_fields() {
        let event = CohortEvent::new(EventKind::RetryScheduled, 2)
            .with_worker("/opt/onboard.sh", 2)
            .with_reason("exit code 1");
        assert_eq!(event.as_worker(), "/opt/onboard.sh");
        assert_eq!(event.as_reason(), "exit code 1");
        assert_eq!(View::attempt(&event), 2);
        assert_eq!(View::outstanding(&event), 2);
    }

    #[test]
    fn every_kind_has_a_message() {
        for kind in [
            EventKind::WorkerSpawned,
            EventKind::WorkerSucceeded,
            EventKind::WorkerFailed,
            EventKind::RetryScheduled,
            EventKind::WorkerExhausted,
            EventKind::WorkerLost,
            EventKind::CohortDrained,
            EventKind::RebootObserved,
        ] {
            assert!(!message_for(kind).is_empty());
            log_event(CohortEvent::new(kind, 0));
        }
    }
}
