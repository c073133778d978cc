pub mod fallback;
pub mod health;
pub mod measure;
pub mod metrics;
pub mod pages;
pub mod users;
