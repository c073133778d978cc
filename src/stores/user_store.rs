use crate::core::error::StorageError;
use crate::credentials::PasswordHash;
use crate::models::user::{PageIdSet, User, UserId};
use crate::utils::time::current_timestamp;
use crate::wal::wal::{Wal, WalOperation};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Field mutation applied to a user record in one indivisible step
#[derive(Debug, Clone, PartialEq)]
pub enum UserUpdate {
    AddPageId(String),
    RenamePageId { current: String, new: String },
    RemovePageId(String),
}

impl UserUpdate {
    /// Returns true when the set changed
    pub fn apply(&self, page_ids: &mut PageIdSet) -> bool {
        match self {
            UserUpdate::AddPageId(id) => page_ids.insert(id.clone()),
            UserUpdate::RenamePageId { current, new } => page_ids.rename(current, new),
            UserUpdate::RemovePageId(id) => page_ids.remove(id),
        }
    }
}

/// Persistence seam for user records.
///
/// Each call is atomic with respect to the record it touches.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new record, rejecting an email that is already taken
    async fn insert(&self, user: User) -> Result<(), StorageError>;

    async fn find_one_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    async fn find_one_by_id(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// Apply `update` to the record keyed by `id`.
    ///
    /// Returns the record after the update, or `None` without writing anything
    /// when no such record exists.
    async fn update_fields(&self, id: UserId, update: UserUpdate) -> Result<Option<User>, StorageError>;
}

/// In-memory user store backed by the WAL
pub struct UserCache {
    users: DashMap<UserId, User>,
    emails: DashMap<String, UserId>,
    wal: Option<Arc<Wal>>,
    writes: AtomicU64,
}

impl UserCache {
    /// Store without durability, used by tests and tooling
    pub fn new() -> Self {
        Self::with_capacity(0, None)
    }

    pub fn with_capacity(capacity: usize, wal: Option<Arc<Wal>>) -> Self {
        Self {
            users: DashMap::with_capacity(capacity),
            emails: DashMap::with_capacity(capacity),
            wal,
            writes: AtomicU64::new(0),
        }
    }

    /// Put back a record read from the WAL, bypassing logging
    pub fn restore(&self, user: User) {
        self.emails.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user);
    }

    /// Overwrite a record's page ids during WAL replay
    pub fn restore_page_ids(&self, id: UserId, page_ids: PageIdSet, updated_at: i64) -> bool {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                user.page_ids = page_ids;
                user.updated_at = updated_at;
                true
            }
            None => false,
        }
    }

    /// Number of committed mutations since startup
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn log(&self, op: &WalOperation) -> Result<(), StorageError> {
        match &self.wal {
            Some(wal) => wal
                .log_operation(op)
                .map_err(|e| StorageError::Wal(format!("{:#}", e))),
            None => Ok(()),
        }
    }
}

impl Default for UserCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for UserCache {
    async fn insert(&self, user: User) -> Result<(), StorageError> {
        // The email entry stays locked until the record is committed
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StorageError::DuplicateEmail(user.email)),
            Entry::Vacant(slot) => {
                self.log(&WalOperation::CreateUser {
                    id: user.id,
                    email: user.email.clone(),
                    password_hash: user.password_hash.as_str().to_string(),
                    created_at: user.created_at,
                })?;

                if !user.page_ids.is_empty() {
                    self.log(&WalOperation::SetPageIds {
                        id: user.id,
                        page_ids: user.page_ids.clone(),
                        updated_at: user.updated_at,
                    })?;
                }

                slot.insert(user.id);
                self.users.insert(user.id, user);
                self.writes.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
        }
    }

    async fn find_one_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let id = match self.emails.get(email) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };

        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_one_by_id(&self, id: UserId) -> Result<Option<User>, StorageError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update_fields(&self, id: UserId, update: UserUpdate) -> Result<Option<User>, StorageError> {
        // The shard write lock serializes concurrent updates to the same user
        let mut entry = match self.users.get_mut(&id) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let mut page_ids = entry.page_ids.clone();
        if !update.apply(&mut page_ids) {
            return Ok(Some(entry.value().clone()));
        }

        let updated_at = current_timestamp();

        // Nothing is committed in memory unless the log write succeeded
        self.log(&WalOperation::SetPageIds {
            id,
            page_ids: page_ids.clone(),
            updated_at,
        })
        .inspect_err(|e| warn!(user_id = %id, error = %e, "Field update not committed"))?;

        entry.page_ids = page_ids;
        entry.updated_at = updated_at;
        self.writes.fetch_add(1, Ordering::Relaxed);

        Ok(Some(entry.value().clone()))
    }
}

/// Rebuild a user from its CREATE_USER record
pub fn user_from_wal(id: UserId, email: String, password_hash: String, created_at: i64) -> User {
    User {
        id,
        email,
        password_hash: PasswordHash::from_phc(password_hash),
        page_ids: PageIdSet::new(),
        created_at,
        updated_at: created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialStore;
    use tempfile::TempDir;

    fn make_user(email: &str, ids: &[&str]) -> User {
        let hash = CredentialStore::new(64, 1, 1).unwrap().hash("irrelevant-here").unwrap();
        User {
            id: UserId::new(),
            email: email.to_string(),
            password_hash: hash,
            page_ids: ids.iter().copied().collect(),
            created_at: 1_000,
            updated_at: 1_000,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = UserCache::new();
        let user = make_user("alice@example.com", &[]);
        let id = user.id;

        store.insert(user).await.unwrap();

        let by_email = store.find_one_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, id);

        let by_id = store.find_one_by_id(id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "alice@example.com");

        assert!(store.find_one_by_email("nobody@example.com").await.unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_duplicate_email() {
        let store = UserCache::new();
        store.insert(make_user("dup@example.com", &[])).await.unwrap();

        let result = store.insert(make_user("dup@example.com", &[])).await;
        assert!(matches!(result, Err(StorageError::DuplicateEmail(_))));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_fields_rename() {
        let store = UserCache::new();
        let user = make_user("a@example.com", &["a", "b"]);
        let id = user.id;
        store.insert(user).await.unwrap();

        let updated = store
            .update_fields(
                id,
                UserUpdate::RenamePageId {
                    current: "b".to_string(),
                    new: "c".to_string(),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.page_ids.to_vec(), vec!["a".to_string(), "c".to_string()]);
        assert!(updated.updated_at >= 1_000);
    }

    #[tokio::test]
    async fn test_update_fields_unknown_user_writes_nothing() {
        let store = UserCache::new();

        let result = store
            .update_fields(UserId::new(), UserUpdate::AddPageId("p".to_string()))
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_update_fields_noop_skips_write() {
        let store = UserCache::new();
        let user = make_user("a@example.com", &["a"]);
        let id = user.id;
        store.insert(user).await.unwrap();
        let writes = store.writes();

        store
            .update_fields(id, UserUpdate::RemovePageId("zzz".to_string()))
            .await
            .unwrap();

        assert_eq!(store.writes(), writes);
    }

    #[tokio::test]
    async fn test_update_fields_logged_to_wal() {
        let temp_dir = TempDir::new().unwrap();
        let wal = Arc::new(Wal::new(temp_dir.path().join("users.wal")).unwrap());
        let store = UserCache::with_capacity(16, Some(Arc::clone(&wal)));

        let user = make_user("a@example.com", &[]);
        let id = user.id;
        store.insert(user).await.unwrap();
        store
            .update_fields(id, UserUpdate::AddPageId("p1".to_string()))
            .await
            .unwrap();

        let ops = wal.replay().unwrap();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], WalOperation::CreateUser { .. }));
        match &ops[1] {
            WalOperation::SetPageIds { id: got, page_ids, .. } => {
                assert_eq!(*got, id);
                assert!(page_ids.contains("p1"));
            }
            _ => panic!("Expected SetPageIds"),
        }
    }

    #[test]
    fn test_rename_to_same_id_is_not_a_change() {
        let mut ids: PageIdSet = ["a"].into_iter().collect();
        let update = UserUpdate::RenamePageId {
            current: "a".to_string(),
            new: "a".to_string(),
        };

        assert!(!update.apply(&mut ids));
        assert!(ids.contains("a"));
    }
}
