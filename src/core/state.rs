// Application state (AppState)

use crate::core::config::Config;
use crate::credentials::CredentialStore;
use crate::directory::UserDirectory;
use crate::metrics::collector::Metrics;
use crate::stores::{measurement_store::MeasurementStore, page_store::PageStore, user_store::UserCache};
use crate::validation::email::BasicEmailValidator;
use crate::wal::wal::Wal;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Shared application state
///
/// Contains all shared components that are accessed by request handlers.
/// All fields are wrapped in Arc for efficient cloning across threads.
#[derive(Clone)]
pub struct AppState {
    /// User records, WAL backed
    pub users: Arc<UserCache>,

    /// Registered pages keyed by id
    pub pages: Arc<PageStore>,

    /// Score history per address
    pub measurements: Arc<MeasurementStore>,

    /// Registration, authentication and page id reconciliation
    pub directory: Arc<UserDirectory>,

    /// Metrics collector for tracking statistics
    pub metrics: Arc<Metrics>,

    /// Write-Ahead Log for persistence
    pub wal: Arc<Wal>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, wal: Wal) -> Result<Self> {
        let config = Arc::new(config);
        let wal = Arc::new(wal);

        let users = Arc::new(UserCache::with_capacity(
            config.storage.user_capacity,
            Some(Arc::clone(&wal)),
        ));

        let pages = Arc::new(PageStore::with_capacity(
            config.storage.page_capacity,
            Some(Arc::clone(&wal)),
        ));

        let credentials = CredentialStore::new(
            config.auth.hash_memory_kib,
            config.auth.hash_iterations,
            config.auth.hash_parallelism,
        )
        .context("Failed to build credential store")?;

        let directory = UserDirectory::new(
            users.clone(),
            pages.clone(),
            Arc::new(BasicEmailValidator),
            credentials,
            config.auth.min_password_length,
        )
        .with_delete_policy(config.reconciler.delete_policy);

        Ok(Self {
            users,
            pages,
            measurements: Arc::new(MeasurementStore::new(config.measurements.history_limit)),
            directory: Arc::new(directory),
            metrics: Arc::new(Metrics::new()),
            wal,
            config,
        })
    }
}

/// State over a WAL in a fresh temp dir. Keep the dir alive for the test.
#[cfg(test)]
pub fn test_state() -> (Arc<AppState>, tempfile::TempDir) {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    let wal = Wal::new(wal_path.clone()).unwrap();
    let config = crate::core::config::test_config(wal_path);

    (Arc::new(AppState::new(config, wal).unwrap()), temp_dir)
}
