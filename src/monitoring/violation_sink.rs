use std::collections::VecDeque;

use crate::global_variables::VIOLATION_HISTORY_CAPACITY;
use crate::shared_data::ViolationRecord;

/// Bounded, newest-first history of recent violations.
///
/// Recording never fails: once full, the oldest record is evicted. Identical
/// records are not merged.
#[derive(Debug, Clone)]
pub struct ViolationSink {
    records: VecDeque<ViolationRecord>,
    capacity: usize,
}

impl Default for ViolationSink {
    fn default() -> Self {
        Self::with_capacity(VIOLATION_HISTORY_CAPACITY)
    }
}

impl ViolationSink {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, record: ViolationRecord) {
        self.records.push_front(record);
        self.records.truncate(self.capacity);
    }

    /// Newest first.
    pub fn history(&self) -> Vec<ViolationRecord> {
        self.records.iter().cloned().collect()
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation_engine::intersections::IntersectionId;

    fn violation(n: usize) -> ViolationRecord {
        ViolationRecord::new(
            format!("MH12AB{n:04}"),
            IntersectionId(1),
            "North Junction",
            "wrong-way driving",
        )
    }

    #[test]
    fn history_is_newest_first() {
        let mut sink = ViolationSink::default();
        sink.record(violation(1));
        sink.record(violation(2));
        let history = sink.history();
        assert_eq!(history[0].vehicle_number, "MH12AB0002");
        assert_eq!(history[1].vehicle_number, "MH12AB0001");
    }

    #[test]
    fn eleventh_record_evicts_the_oldest() {
        let mut sink = ViolationSink::default();
        for n in 1..=11 {
            sink.record(violation(n));
        }
        assert_eq!(sink.len(), 10);
        let history = sink.history();
        assert!(history.iter().all(|r| r.vehicle_number != "MH12AB0001"));
        assert_eq!(history[0].vehicle_number, "MH12AB0011");
        assert_eq!(history[9].vehicle_number, "MH12AB0002");
    }

    #[test]
    fn duplicates_each_take_a_slot() {
        let mut sink = ViolationSink::default();
        let record = violation(7);
        for _ in 0..3 {
            sink.record(record.clone());
        }
        assert_eq!(sink.len(), 3);
        assert!(sink.history().iter().all(|r| *r == record));
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut sink = ViolationSink::default();
        for n in 0..100 {
            sink.record(violation(n));
            assert!(sink.len() <= sink.capacity());
        }
    }
}
