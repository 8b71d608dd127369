// Viewer Pipeline
//
// Wires the full pipeline: ingestion → bounded buffer → filter/search
// → windowed viewport. Every mutation path recomputes the visible
// index set first and only then updates the viewport item count, so the
// re-pin effect always observes the post-recompute state. Recomputation
// is atomic with respect to observers: the visible set is swapped
// whole, never partially.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::buffer::RecordBuffer;
use crate::filter::cancel::{FilterCoordinator, FilterTicket};
use crate::filter::debounce::{QueryDebouncer, DEFAULT_QUERY_DEBOUNCE};
use crate::filter::{visible_indices, FilterError, FilterState};
use crate::record::{Level, Record};
use crate::stream::RecordSink;
use crate::window::Viewport;

/// Construction parameters for a viewer.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Buffer capacity; oldest records are evicted beyond this.
    pub capacity: usize,
    /// Delay before a query edit becomes effective.
    pub query_debounce: Duration,
    /// Row height in pixels.
    pub row_height: u32,
    /// Viewport height in pixels.
    pub viewport_height: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            capacity: 50_000,
            query_debounce: DEFAULT_QUERY_DEBOUNCE,
            row_height: 22,
            viewport_height: 660,
        }
    }
}

/// Observable summary of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewSummary {
    pub filtered_count: usize,
    pub total_count: usize,
}

/// One log-viewer instance: buffer, filter state, debounce, cancellation
/// and viewport, composed behind a single mutation surface.
pub struct LogViewer {
    buffer: RecordBuffer,
    filter: FilterState,
    debouncer: QueryDebouncer,
    coordinator: FilterCoordinator,
    viewport: Viewport,
    visible: Vec<usize>,
    on_record: RecordSink,
    last_error: Option<FilterError>,
    closed: bool,
}

impl LogViewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            buffer: RecordBuffer::new(config.capacity),
            filter: FilterState::new(),
            debouncer: QueryDebouncer::new(config.query_debounce),
            coordinator: FilterCoordinator::new(),
            viewport: Viewport::new(config.row_height, config.viewport_height),
            visible: Vec::new(),
            on_record: RecordSink::new(),
            last_error: None,
            closed: false,
        }
    }

    // ----------------------------
    // Ingestion
    // ----------------------------

    /// Admit one record: append, notify the consumer callback, then
    /// recompute and re-pin.
    pub fn ingest(&mut self, record: Record) {
        if self.closed {
            return;
        }
        self.on_record.emit(&record);
        self.buffer.append(record);
        self.recompute();
    }

    /// Admit a batch with one buffer trim and one recompute.
    pub fn ingest_batch(&mut self, records: Vec<Record>) {
        if self.closed || records.is_empty() {
            return;
        }
        for record in &records {
            self.on_record.emit(record);
        }
        self.buffer.append_batch(records);
        self.recompute();
    }

    /// Parse and admit one raw payload. Malformed payloads are dropped
    /// silently: no buffer mutation, no callback, no error surfaced.
    /// Returns whether the record was admitted.
    pub fn ingest_json(&mut self, payload: &str) -> bool {
        match Record::parse(payload) {
            Ok(record) => {
                self.ingest(record);
                true
            }
            Err(_) => false,
        }
    }

    /// Replace the consumer notification callback. Takes effect on the
    /// next admitted record, regardless of when the stream connected.
    pub fn set_on_record(&self, callback: impl FnMut(&Record) + Send + 'static) {
        self.on_record.set(callback);
    }

    // ----------------------------
    // Filter state
    // ----------------------------

    /// Stage a query edit; it becomes effective once stable for the
    /// debounce delay (see `tick`).
    pub fn set_query(&mut self, query: impl Into<String>, now: Instant) {
        if self.closed {
            return;
        }
        self.debouncer.submit(query, now);
    }

    /// Toggle a level. Applies immediately, bypassing the debounce.
    pub fn set_level_enabled(&mut self, level: Level, enabled: bool) {
        if self.closed {
            return;
        }
        self.filter.levels.set(level, enabled);
        self.recompute();
    }

    /// Switch between case-insensitive and case-sensitive search.
    /// Applies immediately.
    pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
        if self.closed {
            return;
        }
        self.filter.case_sensitive = case_sensitive;
        self.recompute();
    }

    /// Advance time-driven behavior: commits a query edit whose
    /// debounce deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.closed {
            return;
        }
        if let Some(query) = self.debouncer.poll(now) {
            self.filter.set_query(query);
            self.recompute();
        }
    }

    fn recompute(&mut self) {
        let ticket = self.coordinator.begin();
        let result = Ok(visible_indices(&self.buffer, &self.filter));
        self.apply_filter_result(&ticket, result);
    }

    // ----------------------------
    // Async filter seam
    // ----------------------------

    /// Start an externally computed filter pass (for a slow or
    /// asynchronous source). Cancels any in-flight pass. After
    /// `close` the ticket comes back pre-cancelled and can never
    /// commit.
    pub fn begin_filter(&mut self) -> FilterTicket {
        let ticket = self.coordinator.begin();
        if self.closed {
            ticket.token().cancel();
        }
        ticket
    }

    /// Offer a computed result. Commits only if `ticket` is still the
    /// newest uncancelled pass; superseded results are discarded
    /// unconditionally. Cancellation is silent; any other failure is
    /// recorded while the previous visible set stays on screen.
    pub fn apply_filter_result(
        &mut self,
        ticket: &FilterTicket,
        result: Result<Vec<usize>, FilterError>,
    ) {
        if self.closed || !self.coordinator.may_commit(ticket) {
            return;
        }
        match result {
            Ok(visible) => {
                self.visible = visible;
                self.last_error = None;
                self.coordinator.finish(ticket);
                // Re-pin only after the visible set reflects the new
                // buffer state.
                self.viewport.set_item_count(self.visible.len());
            }
            Err(FilterError::Cancelled) => {}
            Err(error) => {
                self.last_error = Some(error);
                self.coordinator.finish(ticket);
            }
        }
    }

    // ----------------------------
    // Viewport
    // ----------------------------

    pub fn handle_user_scroll(&mut self, offset: u32) {
        self.viewport.handle_user_scroll(offset);
    }

    pub fn jump_to_latest(&mut self) {
        self.viewport.jump_to_latest();
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_auto_follow(&mut self, enabled: bool) {
        self.viewport.set_auto_follow(enabled);
    }

    /// Records materialized for the current window, in display order.
    pub fn window_records(&self) -> Vec<&Record> {
        self.viewport
            .visible_range()
            .filter_map(|row| {
                self.visible
                    .get(row)
                    .and_then(|&pos| self.buffer.get(pos))
            })
            .collect()
    }

    // ----------------------------
    // Observation
    // ----------------------------

    pub fn summary(&self) -> ViewSummary {
        ViewSummary {
            filtered_count: self.visible.len(),
            total_count: self.buffer.len(),
        }
    }

    /// Buffer positions currently passing the filter.
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn last_error(&self) -> Option<&FilterError> {
        self.last_error.as_ref()
    }

    // ----------------------------
    // Teardown
    // ----------------------------

    /// Release everything time- or callback-shaped: pending debounce,
    /// in-flight filter pass, consumer callback. Every later mutation
    /// (ingestion, ticks, filter changes) is a no-op.
    pub fn close(&mut self) {
        self.debouncer.cancel();
        self.coordinator.shutdown();
        self.on_record.clear();
        self.closed = true;
    }
}
