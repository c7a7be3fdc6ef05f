use async_trait::async_trait;
use cohort_core::Subscribe;
use cohort_model::CohortEvent;

use crate::subscriber::view::log_event;

/// Writes every supervisor event to the `tracing` pipeline.
#[derive(Debug, Default)]
pub struct Journal;

impl Journal {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for Journal {
    async fn on_event(&self, event: &CohortEvent) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "journal"
    }
}
