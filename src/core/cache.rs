// Bounded, deduplicated, time-ordered cache of glucose readings
//
// The backing store can refuse queries while the device is locked, so the
// pipeline keeps its own copy of recent history and refills it on every cycle.

use crate::models::reading::Reading;

#[derive(Debug)]
pub struct GlucoseCache {
    entries: Vec<Reading>,
    capacity: usize,
}

impl GlucoseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Fold new samples in: entries whose timestamp is already present are
    /// skipped, the whole set is re-sorted ascending, and the oldest entries
    /// past capacity are dropped. Never fails.
    pub fn merge<I>(&mut self, readings: I)
    where
        I: IntoIterator<Item = Reading>,
    {
        for reading in readings {
            if !self
                .entries
                .iter()
                .any(|e| e.recorded_at == reading.recorded_at)
            {
                self.entries.push(reading);
            }
        }
        self.entries.sort_by_key(|e| e.recorded_at);
        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
    }

    /// Owned copy of the contents, oldest first. Each cycle formats from its
    /// own snapshot instead of holding the cache lock.
    pub fn snapshot(&self) -> Vec<Reading> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn sample(minutes: i64, value: f64) -> Reading {
        Reading::mgdl(base() + Duration::minutes(minutes), value)
    }

    #[test]
    fn merge_sorts_unordered_input() {
        let mut cache = GlucoseCache::new(10);
        cache.merge(vec![sample(10, 130.0), sample(0, 120.0), sample(5, 125.0)]);

        let times: Vec<_> = cache.snapshot().iter().map(|r| r.recorded_at).collect();
        assert_eq!(
            times,
            vec![
                base(),
                base() + Duration::minutes(5),
                base() + Duration::minutes(10)
            ]
        );
    }

    #[test]
    fn merge_skips_duplicate_timestamps() {
        let mut cache = GlucoseCache::new(10);
        cache.merge(vec![sample(0, 120.0), sample(5, 125.0)]);
        // same timestamps again, different values
        cache.merge(vec![sample(0, 999.0), sample(5, 888.0), sample(10, 130.0)]);

        assert_eq!(cache.len(), 3);
        let snapshot = cache.snapshot();
        // the first value wins; dedup is by timestamp, not by value
        assert_eq!(snapshot[0].value, 120.0);
        assert_eq!(snapshot[1].value, 125.0);
    }

    #[test]
    fn merge_trims_oldest_past_capacity() {
        let mut cache = GlucoseCache::new(3);
        cache.merge((0..5).map(|i| sample(i * 5, 100.0 + i as f64)));

        assert_eq!(cache.len(), 3);
        let snapshot = cache.snapshot();
        // exactly the newest three survive, still ascending
        assert_eq!(snapshot[0].value, 102.0);
        assert_eq!(snapshot[2].value, 104.0);
        assert!(snapshot.windows(2).all(|w| w[0].recorded_at < w[1].recorded_at));
    }

    #[test]
    fn merge_is_idempotent() {
        let mut cache = GlucoseCache::new(84);
        let readings: Vec<_> = (0..4).map(|i| sample(i * 5, 110.0)).collect();
        cache.merge(readings.clone());
        cache.merge(readings);
        assert_eq!(cache.len(), 4);
    }
}
