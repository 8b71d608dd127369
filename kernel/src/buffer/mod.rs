// Ingestion Buffer
//
// Append-only, capacity-bounded sequence of records. Once the cap is
// exceeded the oldest entries are evicted first (FIFO by position),
// preserving relative order of survivors. Only the ingestion path
// mutates this structure; the filter engine reads it.

use std::collections::VecDeque;

use crate::record::Record;

/// Capacity-bounded record buffer with FIFO eviction.
///
/// Backed by a `VecDeque` so steady-state eviction is amortized O(1);
/// the buffer is never rebuilt on trim.
#[derive(Debug)]
pub struct RecordBuffer {
    records: VecDeque<Record>,
    capacity: usize,
}

impl RecordBuffer {
    /// Create a buffer holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Append one record, evicting the oldest if the cap is exceeded.
    pub fn append(&mut self, record: Record) {
        self.records.push_back(record);
        if self.records.len() > self.capacity {
            self.records.pop_front();
        }
    }

    /// Append many records with at most one trim.
    ///
    /// Equivalent to sequential `append` calls, but the overflow is
    /// drained in a single pass rather than once per evicted record.
    pub fn append_batch(&mut self, records: impl IntoIterator<Item = Record>) {
        self.records.extend(records);
        let overflow = self.records.len().saturating_sub(self.capacity);
        if overflow > 0 {
            self.records.drain(..overflow);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record at buffer position `pos` (0 = oldest surviving).
    pub fn get(&self, pos: usize) -> Option<&Record> {
        self.records.get(pos)
    }

    /// Iterate records in buffer order (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Level;

    fn record(n: u64) -> Record {
        Record::new(Level::Info, n, format!("line {n}"))
    }

    #[test]
    fn append_within_capacity_keeps_everything() {
        let mut buffer = RecordBuffer::new(10);
        for n in 0..10 {
            buffer.append(record(n));
        }
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.get(0).unwrap().timestamp_ms, 0);
        assert_eq!(buffer.get(9).unwrap().timestamp_ms, 9);
    }

    #[test]
    fn eviction_keeps_last_c_records_in_order() {
        let cap = 5;
        let mut buffer = RecordBuffer::new(cap);
        for n in 0..12 {
            buffer.append(record(n));
        }

        assert_eq!(buffer.len(), cap);
        let timestamps: Vec<u64> = buffer.iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(timestamps, vec![7, 8, 9, 10, 11]);
    }

    #[test]
    fn batch_append_trims_once_to_capacity() {
        let mut buffer = RecordBuffer::new(4);
        buffer.append(record(0));
        buffer.append_batch((1..=9).map(record));

        assert_eq!(buffer.len(), 4);
        let timestamps: Vec<u64> = buffer.iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(timestamps, vec![6, 7, 8, 9]);
    }

    #[test]
    fn batch_larger_than_capacity_keeps_its_tail() {
        let mut buffer = RecordBuffer::new(3);
        buffer.append_batch((0..100).map(record));

        let timestamps: Vec<u64> = buffer.iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(timestamps, vec![97, 98, 99]);
    }

    #[test]
    fn out_of_order_timestamps_do_not_reorder_positions() {
        let mut buffer = RecordBuffer::new(10);
        buffer.append(record(50));
        buffer.append(record(10));
        buffer.append(record(30));

        let timestamps: Vec<u64> = buffer.iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(timestamps, vec![50, 10, 30]);
    }
}
