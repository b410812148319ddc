use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Bounded wait for an asynchronous job to reach a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

/// What a single probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState<T> {
    Pending,
    Done(T),
}

impl PollPolicy {
    /// Sleeps `interval`, then probes, up to `max_attempts` times. The probe
    /// decides which states are terminal; a probe error ends the wait at once.
    /// When the budget runs out `exhausted` builds the error.
    pub async fn run<T, E, F, Fut>(&self, mut probe: F, exhausted: impl FnOnce(u32) -> E) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<PollState<T>, E>>,
    {
        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.interval).await;
            match probe(attempt).await? {
                PollState::Done(value) => {
                    debug!(attempt, "poll reached terminal state");
                    return Ok(value);
                }
                PollState::Pending => debug!(attempt, max = self.max_attempts, "still pending"),
            }
        }
        Err(exhausted(self.max_attempts))
    }
}
