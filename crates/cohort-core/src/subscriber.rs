use async_trait::async_trait;

use cohort_model::CohortEvent;

/// Receives supervisor lifecycle events, in order, from the supervising task.
#[async_trait]
pub trait Subscribe: Send + Sync {
    async fn on_event(&self, event: &CohortEvent);

    fn name(&self) -> &'static str;
}
