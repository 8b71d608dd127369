// Query Debouncing
//
// The query text may change every keystroke, but filtering only reacts
// to a value that has stayed stable for the configured delay. A new
// edit before the deadline supersedes the pending value and restarts
// the delay. Deadline-based and driven by an explicit `now`, so tests
// never sleep and teardown leaves nothing armed.

use std::time::{Duration, Instant};

/// Default delay before a query edit becomes effective.
pub const DEFAULT_QUERY_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug)]
struct PendingEdit {
    value: String,
    deadline: Instant,
}

/// One-value debouncer for the filter query.
#[derive(Debug)]
pub struct QueryDebouncer {
    delay: Duration,
    pending: Option<PendingEdit>,
}

impl QueryDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record an edit. Supersedes any pending value and restarts the delay.
    pub fn submit(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some(PendingEdit {
            value: value.into(),
            deadline: now + self.delay,
        });
    }

    /// Yield the stable value if its deadline has passed, at most once.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        if self.pending.as_ref()?.deadline > now {
            return None;
        }
        self.pending.take().map(|edit| edit.value)
    }

    /// Drop any pending edit (teardown, or an explicit clear).
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending edit, for schedulers that want to sleep
    /// until the next interesting instant.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|edit| edit.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn rapid_edits_commit_only_the_final_value_once() {
        let start = Instant::now();
        let mut debouncer = QueryDebouncer::new(200 * MS);

        debouncer.submit("a", start);
        assert_eq!(debouncer.poll(start + 50 * MS), None);

        debouncer.submit("ab", start + 50 * MS);
        assert_eq!(debouncer.poll(start + 100 * MS), None);

        debouncer.submit("abc", start + 100 * MS);
        assert_eq!(debouncer.poll(start + 250 * MS), None);

        assert_eq!(debouncer.poll(start + 300 * MS), Some("abc".to_string()));
        assert_eq!(debouncer.poll(start + 400 * MS), None);
    }

    #[test]
    fn value_commits_exactly_at_deadline() {
        let start = Instant::now();
        let mut debouncer = QueryDebouncer::new(200 * MS);

        debouncer.submit("x", start);
        assert_eq!(debouncer.poll(start + 199 * MS), None);
        assert_eq!(debouncer.poll(start + 200 * MS), Some("x".to_string()));
    }

    #[test]
    fn cancel_discards_the_pending_edit() {
        let start = Instant::now();
        let mut debouncer = QueryDebouncer::new(200 * MS);

        debouncer.submit("doomed", start);
        debouncer.cancel();

        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + 500 * MS), None);
    }

    #[test]
    fn next_deadline_tracks_the_latest_edit() {
        let start = Instant::now();
        let mut debouncer = QueryDebouncer::new(200 * MS);

        debouncer.submit("a", start);
        debouncer.submit("ab", start + 150 * MS);

        assert_eq!(debouncer.next_deadline(), Some(start + 350 * MS));
    }
}
