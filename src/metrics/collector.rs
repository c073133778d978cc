use crate::stores::measurement_store::MeasurementStore;
use crate::stores::page_store::PageStore;
use crate::stores::user_store::UserCache;
use crate::utils::time::{current_timestamp, elapsed_seconds};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct Metrics {
    pub registrations: AtomicU64,
    pub successful_logins: AtomicU64,
    pub failed_logins: AtomicU64,
    pub page_renames: AtomicU64,
    pub page_deletes: AtomicU64,
    pub measurements_recorded: AtomicU64,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    pub registrations: u64,
    pub successful_logins: u64,
    pub failed_logins: u64,
    /// Percentage of login attempts that succeeded
    pub login_success_rate: f64,
    pub page_renames: u64,
    pub page_deletes: u64,
    pub measurements_recorded: u64,
    pub users: usize,
    pub pages: usize,
    pub measured_addresses: usize,
    pub user_writes: u64,
    pub uptime_seconds: i64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            registrations: AtomicU64::new(0),
            successful_logins: AtomicU64::new(0),
            failed_logins: AtomicU64::new(0),
            page_renames: AtomicU64::new(0),
            page_deletes: AtomicU64::new(0),
            measurements_recorded: AtomicU64::new(0),
            start_time: current_timestamp(),
        }
    }

    pub fn increment_registrations(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one login attempt by outcome
    pub fn record_login(&self, success: bool) {
        if success {
            self.successful_logins.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_logins.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn increment_page_renames(&self) {
        self.page_renames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_page_deletes(&self) {
        self.page_deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_measurements(&self) {
        self.measurements_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(
        &self,
        users: &UserCache,
        pages: &PageStore,
        measurements: &MeasurementStore,
    ) -> MetricsSnapshot {
        let successful_logins = self.successful_logins.load(Ordering::Relaxed);
        let failed_logins = self.failed_logins.load(Ordering::Relaxed);
        let attempts = successful_logins + failed_logins;

        let login_success_rate = if attempts > 0 {
            (successful_logins as f64 / attempts as f64) * 100.0
        } else {
            0.0
        };

        MetricsSnapshot {
            registrations: self.registrations.load(Ordering::Relaxed),
            successful_logins,
            failed_logins,
            login_success_rate,
            page_renames: self.page_renames.load(Ordering::Relaxed),
            page_deletes: self.page_deletes.load(Ordering::Relaxed),
            measurements_recorded: self.measurements_recorded.load(Ordering::Relaxed),
            users: users.len(),
            pages: pages.len(),
            measured_addresses: measurements.len(),
            user_writes: users.writes(),
            uptime_seconds: elapsed_seconds(self.start_time, current_timestamp()),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = Metrics::new();
        metrics.increment_registrations();
        metrics.record_login(true);
        metrics.record_login(true);
        metrics.record_login(true);
        metrics.record_login(false);
        metrics.increment_page_renames();
        metrics.increment_page_deletes();
        metrics.increment_measurements();

        let snapshot = metrics.get_snapshot(
            &UserCache::new(),
            &PageStore::new(),
            &MeasurementStore::new(10),
        );

        assert_eq!(snapshot.registrations, 1);
        assert_eq!(snapshot.successful_logins, 3);
        assert_eq!(snapshot.failed_logins, 1);
        assert_eq!(snapshot.login_success_rate, 75.0);
        assert_eq!(snapshot.page_renames, 1);
        assert_eq!(snapshot.page_deletes, 1);
        assert_eq!(snapshot.measurements_recorded, 1);
        assert_eq!(snapshot.users, 0);
        assert!(snapshot.uptime_seconds >= 0);
    }

    #[test]
    fn test_success_rate_without_attempts() {
        let snapshot = Metrics::new().get_snapshot(
            &UserCache::new(),
            &PageStore::new(),
            &MeasurementStore::new(10),
        );
        assert_eq!(snapshot.login_success_rate, 0.0);
    }
}
