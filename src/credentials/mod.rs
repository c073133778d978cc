pub mod password;

pub use password::{CredentialStore, PasswordHash};
