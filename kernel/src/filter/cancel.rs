// Cancellation Discipline
//
// Starting a new filter computation must logically cancel any in-flight
// one, and a superseded result must never reach visible state even if
// it completes later: last-requested-wins, not last-completed-wins.
// The token is an abort flag shared between the computation and its
// caller; the coordinator stamps each computation with a generation so
// commit eligibility is checkable from either side.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort flag for one filter computation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Handle for one in-flight filter computation.
#[derive(Debug, Clone)]
pub struct FilterTicket {
    generation: u64,
    token: CancelToken,
}

impl FilterTicket {
    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

/// Issues tickets and decides which computation's result may commit.
#[derive(Debug, Default)]
pub struct FilterCoordinator {
    generation: u64,
    active: Option<CancelToken>,
}

impl FilterCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new computation, cancelling the previous in-flight one.
    pub fn begin(&mut self) -> FilterTicket {
        if let Some(previous) = self.active.take() {
            previous.cancel();
        }
        self.generation += 1;
        let token = CancelToken::new();
        self.active = Some(token.clone());
        FilterTicket {
            generation: self.generation,
            token,
        }
    }

    /// True iff `ticket` is still the newest computation and was not
    /// cancelled. The caller commits the result only on `true`.
    pub fn may_commit(&self, ticket: &FilterTicket) -> bool {
        ticket.generation == self.generation && !ticket.token.is_cancelled()
    }

    /// Mark the active computation finished (after a commit or a failure).
    pub fn finish(&mut self, ticket: &FilterTicket) {
        if ticket.generation == self.generation {
            self.active = None;
        }
    }

    /// Abort whatever is in flight (teardown).
    pub fn shutdown(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_request_cancels_the_older() {
        let mut coordinator = FilterCoordinator::new();

        let first = coordinator.begin();
        let second = coordinator.begin();

        assert!(first.token().is_cancelled());
        assert!(!second.token().is_cancelled());
        assert!(!coordinator.may_commit(&first));
        assert!(coordinator.may_commit(&second));
    }

    #[test]
    fn stale_result_cannot_commit_even_after_newer_finishes() {
        let mut coordinator = FilterCoordinator::new();

        let slow = coordinator.begin();
        let fast = coordinator.begin();

        // Fast computation resolves first and commits.
        assert!(coordinator.may_commit(&fast));
        coordinator.finish(&fast);

        // Slow computation resolves afterwards; still refused.
        assert!(!coordinator.may_commit(&slow));
    }

    #[test]
    fn shutdown_aborts_the_active_computation() {
        let mut coordinator = FilterCoordinator::new();
        let ticket = coordinator.begin();

        coordinator.shutdown();

        assert!(ticket.token().is_cancelled());
        assert!(!coordinator.may_commit(&ticket));
    }
}
