use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::ledger::{MirrorReader, RetrievedState};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5_000);

/// Suspension used between poll attempts. Injectable so the full retry
/// budget can run without real elapsed time.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// What the poll loop should do after one read.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    Confirmed(RetrievedState),
    Retry { delay: Duration },
    Exhausted,
}

/// Per-wait retry bookkeeping. Created for one confirmation wait and dropped
/// once it resolves or runs out of attempts.
#[derive(Debug, Clone)]
pub struct PollState {
    transaction_id: String,
    attempts_remaining: u32,
    max_attempts: u32,
    interval: Duration,
    last_error: Option<String>,
    last_state: Option<RetrievedState>,
}

impl PollState {
    /// `max_attempts` of zero is treated as one.
    pub fn new(transaction_id: impl Into<String>, max_attempts: u32, interval: Duration) -> Self {
        let max_attempts = max_attempts.max(1);
        Self {
            transaction_id: transaction_id.into(),
            attempts_remaining: max_attempts,
            max_attempts,
            interval,
            last_error: None,
            last_state: None,
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    pub fn attempts_made(&self) -> u32 {
        self.max_attempts - self.attempts_remaining
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Feed the result of one read-side retrieval. Retrieval errors are
    /// treated as transient; the latest one is kept for reporting.
    pub fn observe(&mut self, retrieved: Result<Option<RetrievedState>, LedgerError>) -> PollStep {
        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);

        match retrieved {
            Ok(Some(state)) if state.is_terminal() => return PollStep::Confirmed(state),
            Ok(Some(state)) => self.last_state = Some(state),
            Ok(None) => {}
            Err(err) => self.last_error = Some(err.to_string()),
        }

        if self.attempts_remaining == 0 {
            PollStep::Exhausted
        } else {
            PollStep::Retry {
                delay: self.interval,
            }
        }
    }

    fn into_pending(self) -> PollOutcome {
        PollOutcome::Pending {
            attempts: self.attempts_made(),
            last_error: self.last_error,
            last_state: self.last_state,
        }
    }
}

/// Result of waiting for confirmation. Exhaustion is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PollOutcome {
    Confirmed(RetrievedState),
    Pending {
        attempts: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_state: Option<RetrievedState>,
    },
}

pub struct ConfirmationPoller {
    reader: Arc<dyn MirrorReader>,
    sleeper: Arc<dyn Sleeper>,
}

impl ConfirmationPoller {
    pub fn new(reader: Arc<dyn MirrorReader>) -> Self {
        Self {
            reader,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Poll the read side until the transaction reaches a terminal state or
    /// `max_attempts` reads have been made. Never fails.
    pub async fn await_confirmation(
        &self,
        transaction_id: &str,
        max_attempts: u32,
        interval: Duration,
    ) -> PollOutcome {
        let mut state = PollState::new(transaction_id, max_attempts, interval);

        loop {
            let retrieved = self.reader.retrieve_state(state.transaction_id()).await;
            if let Err(err) = &retrieved {
                debug!(
                    transaction_id = %state.transaction_id(),
                    attempt = state.attempts_made() + 1,
                    error = %err,
                    "read side retrieval failed; retrying"
                );
            }

            match state.observe(retrieved) {
                PollStep::Confirmed(confirmed) => {
                    debug!(
                        transaction_id = %state.transaction_id(),
                        attempts = state.attempts_made(),
                        "transaction confirmed"
                    );
                    return PollOutcome::Confirmed(confirmed);
                }
                PollStep::Retry { delay } => self.sleeper.sleep(delay).await,
                PollStep::Exhausted => {
                    warn!(
                        transaction_id = %state.transaction_id(),
                        attempts = state.attempts_made(),
                        "confirmation still pending after retry budget"
                    );
                    return state.into_pending();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::StateStatus;

    #[test]
    fn state_machine_exhausts_after_budget() {
        let mut state = PollState::new("0.0.1-1-1", 3, Duration::from_millis(10));
        assert_eq!(state.observe(Ok(None)), PollStep::Retry { delay: Duration::from_millis(10) });
        assert_eq!(
            state.observe(Err(LedgerError::Network("timeout".into()))),
            PollStep::Retry { delay: Duration::from_millis(10) }
        );
        assert_eq!(state.observe(Ok(None)), PollStep::Exhausted);
        assert_eq!(state.attempts_made(), 3);
        assert_eq!(state.attempts_remaining(), 0);

        match state.into_pending() {
            PollOutcome::Pending {
                attempts,
                last_error,
                last_state,
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.unwrap().contains("timeout"));
                assert!(last_state.is_none());
            }
            other => panic!("expected pending outcome, got {other:?}"),
        }
    }

    #[test]
    fn terminal_state_confirms_immediately() {
        let mut state = PollState::new("tx", 5, Duration::from_secs(1));
        let step = state.observe(Ok(Some(RetrievedState::new(StateStatus::Completed))));
        assert!(matches!(step, PollStep::Confirmed(_)));
        assert_eq!(state.attempts_made(), 1);
    }

    #[test]
    fn zero_attempts_still_reads_once() {
        let mut state = PollState::new("tx", 0, Duration::ZERO);
        assert_eq!(state.max_attempts(), 1);
        assert_eq!(state.observe(Ok(None)), PollStep::Exhausted);
    }

    #[test]
    fn non_terminal_state_is_remembered() {
        let mut state = PollState::new("tx", 1, Duration::ZERO);
        let processing = RetrievedState::new(StateStatus::Pending);
        assert_eq!(state.observe(Ok(Some(processing.clone()))), PollStep::Exhausted);
        match state.into_pending() {
            PollOutcome::Pending { last_state, .. } => assert_eq!(last_state, Some(processing)),
            other => panic!("expected pending outcome, got {other:?}"),
        }
    }
}
