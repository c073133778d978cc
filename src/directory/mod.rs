pub mod reconciler;
pub mod user_directory;

pub use reconciler::DeletePolicy;
pub use user_directory::UserDirectory;

#[cfg(test)]
pub(crate) mod test_support {
    use super::UserDirectory;
    use crate::credentials::CredentialStore;
    use crate::stores::page_store::PageStore;
    use crate::stores::user_store::UserCache;
    use crate::validation::email::BasicEmailValidator;
    use std::sync::Arc;

    /// Directory over fresh in-memory stores with cheap hashing parameters
    pub(crate) fn test_directory() -> (UserDirectory, Arc<UserCache>, Arc<PageStore>) {
        let users = Arc::new(UserCache::new());
        let pages = Arc::new(PageStore::new());
        let directory = UserDirectory::new(
            users.clone(),
            pages.clone(),
            Arc::new(BasicEmailValidator),
            CredentialStore::new(64, 1, 1).unwrap(),
            10,
        );
        (directory, users, pages)
    }
}
