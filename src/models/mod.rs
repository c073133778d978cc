pub mod api;
pub mod measurement;
pub mod page;
pub mod user;
