pub mod core;
pub mod credentials;
pub mod directory;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod stores;
pub mod utils;
pub mod validation;
pub mod wal;
