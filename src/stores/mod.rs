pub mod measurement_store;
pub mod page_store;
pub mod user_store;
