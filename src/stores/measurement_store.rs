use crate::models::measurement::Measurement;
use dashmap::DashMap;
use std::collections::VecDeque;

/// Per-address measurement history, bounded to the most recent readings
pub struct MeasurementStore {
    series: DashMap<String, VecDeque<Measurement>>,
    history_limit: usize,
}

impl MeasurementStore {
    pub fn new(history_limit: usize) -> Self {
        Self {
            series: DashMap::new(),
            history_limit: history_limit.max(1),
        }
    }

    /// Append a reading, evicting the oldest once the history is full
    pub fn record(&self, address: &str, score: f64, recorded_at: i64) -> Measurement {
        let measurement = Measurement::new(address.to_string(), score, recorded_at);

        let mut history = self.series.entry(address.to_string()).or_default();
        history.push_back(measurement.clone());
        while history.len() > self.history_limit {
            history.pop_front();
        }

        measurement
    }

    /// The latest `limit` readings for `address`, oldest first
    pub fn latest(&self, address: &str, limit: usize) -> Vec<Measurement> {
        match self.series.get(address) {
            Some(history) => {
                let skip = history.len().saturating_sub(limit);
                history.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Number of distinct addresses with at least one reading
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_returns_oldest_first() {
        let store = MeasurementStore::new(100);
        for i in 0..5 {
            store.record("https://example.com", i as f64 * 10.0, 1000 + i);
        }

        let points = store.latest("https://example.com", 3);
        let times: Vec<i64> = points.iter().map(|m| m.recorded_at).collect();
        assert_eq!(times, vec![1002, 1003, 1004]);
    }

    #[test]
    fn test_latest_fewer_than_limit() {
        let store = MeasurementStore::new(100);
        store.record("https://example.com", 55.0, 1);

        assert_eq!(store.latest("https://example.com", 20).len(), 1);
        assert!(store.latest("https://other.example", 20).is_empty());
    }

    #[test]
    fn test_history_limit_evicts_oldest() {
        let store = MeasurementStore::new(3);
        for i in 0..10 {
            store.record("a", 50.0, i);
        }

        let points = store.latest("a", 100);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].recorded_at, 7);
    }

    #[test]
    fn test_addresses_are_separate() {
        let store = MeasurementStore::new(10);
        store.record("a", 1.0, 1);
        store.record("b", 2.0, 2);

        assert_eq!(store.len(), 2);
        assert_eq!(store.latest("a", 10)[0].score, 1.0);
    }
}
