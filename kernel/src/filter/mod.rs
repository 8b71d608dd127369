// Filter/Search Engine
//
// Derives, from the buffer and the current filter state, the ordered
// set of buffer positions that should be visible. Pure and
// deterministic: one linear pass, no per-record allocation.

use crate::buffer::RecordBuffer;
use crate::record::{Level, Record};

pub mod cancel;
pub mod debounce;

/// Dense set of enabled levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSet([bool; Level::ALL.len()]);

impl LevelSet {
    /// Set with every level enabled.
    pub fn all() -> Self {
        Self([true; Level::ALL.len()])
    }

    /// Set with no level enabled.
    pub fn none() -> Self {
        Self([false; Level::ALL.len()])
    }

    /// Set containing exactly the given levels.
    pub fn of(levels: &[Level]) -> Self {
        let mut set = Self::none();
        for level in levels {
            set.set(*level, true);
        }
        set
    }

    pub fn set(&mut self, level: Level, enabled: bool) {
        self.0[level.index()] = enabled;
    }

    pub fn contains(&self, level: Level) -> bool {
        self.0[level.index()]
    }
}

impl Default for LevelSet {
    fn default() -> Self {
        Self::all()
    }
}

/// Current filter inputs.
///
/// `query` mutates synchronously with user input; the debounce layer
/// decides when an edit becomes effective. Level toggles always apply
/// immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub levels: LevelSet,
    query: String,
    query_lower: String,
    pub case_sensitive: bool,
}

impl FilterState {
    pub fn new() -> Self {
        Self {
            levels: LevelSet::all(),
            query: String::new(),
            query_lower: String::new(),
            case_sensitive: false,
        }
    }

    /// Replace the effective query, caching its lowercase projection.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.query_lower = self.query.to_lowercase();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// True iff `record` passes both predicates. Level membership is
    /// checked first; the substring test only runs for enabled levels.
    pub fn matches(&self, record: &Record) -> bool {
        if !self.levels.contains(record.level) {
            return false;
        }
        if self.query.is_empty() {
            return true;
        }
        if self.case_sensitive {
            record.message.contains(&self.query)
        } else {
            record.message_lower.contains(&self.query_lower)
        }
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from a filter computation.
///
/// Cancellation is a normal, silent outcome and must never be surfaced
/// as a failure; `Failed` is the only variant that becomes observable
/// error state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("filter computation superseded")]
    Cancelled,

    #[error("filter computation failed: {0}")]
    Failed(String),
}

/// Compute the visible index set: buffer positions whose record passes
/// the filter, in ascending position order.
pub fn visible_indices(buffer: &RecordBuffer, state: &FilterState) -> Vec<usize> {
    let mut visible = Vec::new();
    for (pos, record) in buffer.iter().enumerate() {
        if state.matches(record) {
            visible.push(pos);
        }
    }
    visible
}
