use crate::core::error::{PageError, StorageError};
use crate::models::page::Page;
use crate::wal::wal::{Wal, WalOperation};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Read-only view of pages needed by delete reconciliation
#[async_trait]
pub trait PageDirectory: Send + Sync {
    async fn find_page_by_id(&self, id: &str) -> Option<Arc<Page>>;
}

/// Page registry. Mutations are logged to the WAL before they are visible.
pub struct PageStore {
    pages: DashMap<String, Arc<Page>>,
    wal: Option<Arc<Wal>>,
}

impl PageStore {
    /// Store without durability, used by tests and tooling
    pub fn new() -> Self {
        Self::with_capacity(0, None)
    }

    pub fn with_capacity(capacity: usize, wal: Option<Arc<Wal>>) -> Self {
        Self {
            pages: DashMap::with_capacity(capacity),
            wal,
        }
    }

    fn log(&self, op: &WalOperation) -> Result<(), PageError> {
        match &self.wal {
            Some(wal) => wal
                .log_operation(op)
                .map_err(|e| StorageError::Wal(format!("{:#}", e)).into()),
            None => Ok(()),
        }
    }

    /// Add a page, failing if its id is already registered
    pub fn add_page(&self, page: Page) -> Result<Arc<Page>, PageError> {
        match self.pages.entry(page.id.clone()) {
            Entry::Occupied(_) => Err(PageError::IdTaken(page.id)),
            Entry::Vacant(slot) => {
                self.log(&WalOperation::CreatePage {
                    id: page.id.clone(),
                    address: page.address.clone(),
                    owner: page.owner,
                    created_at: page.created_at,
                })?;

                let page = Arc::new(page);
                slot.insert(Arc::clone(&page));
                Ok(page)
            }
        }
    }

    /// Remove a page by id
    /// Returns the removed page if it existed
    pub fn remove_page(&self, id: &str) -> Result<Option<Arc<Page>>, PageError> {
        match self.pages.entry(id.to_string()) {
            Entry::Vacant(_) => Ok(None),
            Entry::Occupied(slot) => {
                self.log(&WalOperation::DeletePage { id: id.to_string() })?;
                Ok(Some(slot.remove()))
            }
        }
    }

    pub fn get_page(&self, id: &str) -> Option<Arc<Page>> {
        self.pages.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Re-key a page from `current` to `new`.
    ///
    /// On conflict or a failed log write the page is put back under its old id.
    pub fn rename_page(&self, current: &str, new: &str) -> Result<Arc<Page>, PageError> {
        if current == new {
            return self
                .get_page(current)
                .ok_or_else(|| PageError::NotFound(current.to_string()));
        }

        // Two keys can share a shard, so never hold one entry while touching the other
        let (_, old) = self
            .pages
            .remove(current)
            .ok_or_else(|| PageError::NotFound(current.to_string()))?;

        let failed = match self.pages.entry(new.to_string()) {
            Entry::Occupied(_) => PageError::IdTaken(new.to_string()),
            Entry::Vacant(slot) => {
                let logged = self.log(&WalOperation::RenamePage {
                    current: current.to_string(),
                    new: new.to_string(),
                });

                match logged {
                    Ok(()) => {
                        let renamed = Arc::new(Page {
                            id: new.to_string(),
                            ..(*old).clone()
                        });
                        slot.insert(Arc::clone(&renamed));
                        return Ok(renamed);
                    }
                    Err(e) => e,
                }
            }
        };

        self.pages.insert(current.to_string(), old);
        Err(failed)
    }

    /// Put back a page read from the WAL, bypassing logging
    pub fn restore_page(&self, page: Page) {
        self.pages.insert(page.id.clone(), Arc::new(page));
    }

    /// Replay a logged rename. Returns false if `current` is unknown.
    pub fn restore_rename(&self, current: &str, new: &str) -> bool {
        match self.pages.remove(current) {
            Some((_, old)) => {
                let renamed = Page {
                    id: new.to_string(),
                    ..(*old).clone()
                };
                self.pages.insert(new.to_string(), Arc::new(renamed));
                true
            }
            None => false,
        }
    }

    /// Replay a logged delete
    pub fn restore_remove(&self, id: &str) -> bool {
        self.pages.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageDirectory for PageStore {
    async fn find_page_by_id(&self, id: &str) -> Option<Arc<Page>> {
        self.get_page(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserId;

    fn page(id: &str) -> Page {
        Page::new(id.to_string(), "https://example.com".to_string(), UserId::new(), 1)
    }

    #[test]
    fn test_add_and_get() {
        let store = PageStore::new();
        store.add_page(page("p1")).unwrap();

        assert!(store.get_page("p1").is_some());
        assert!(store.get_page("p2").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_duplicate_id() {
        let store = PageStore::new();
        store.add_page(page("p1")).unwrap();

        assert!(matches!(store.add_page(page("p1")), Err(PageError::IdTaken(_))));
    }

    #[test]
    fn test_rename_page() {
        let store = PageStore::new();
        store.add_page(page("old")).unwrap();

        let renamed = store.rename_page("old", "new").unwrap();
        assert_eq!(renamed.id, "new");
        assert!(store.get_page("old").is_none());
        assert_eq!(store.get_page("new").unwrap().address, "https://example.com");
    }

    #[test]
    fn test_rename_missing_page() {
        let store = PageStore::new();
        assert!(matches!(
            store.rename_page("ghost", "new"),
            Err(PageError::NotFound(_))
        ));
    }

    #[test]
    fn test_rename_onto_taken_id_restores() {
        let store = PageStore::new();
        store.add_page(page("a")).unwrap();
        store.add_page(page("b")).unwrap();

        assert!(matches!(store.rename_page("a", "b"), Err(PageError::IdTaken(_))));
        assert!(store.get_page("a").is_some());
        assert!(store.get_page("b").is_some());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_page_directory_lookup() {
        let store = PageStore::new();
        store.add_page(page("p1")).unwrap();

        assert!(store.find_page_by_id("p1").await.is_some());
        assert!(store.remove_page("p1").unwrap().is_some());
        assert!(store.find_page_by_id("p1").await.is_none());
        assert!(store.remove_page("p1").unwrap().is_none());
    }

    #[test]
    fn test_mutations_are_logged_and_replayable() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let wal = Arc::new(Wal::new(temp_dir.path().join("pages.wal")).unwrap());
        let store = PageStore::with_capacity(8, Some(Arc::clone(&wal)));

        store.add_page(page("a")).unwrap();
        store.add_page(page("b")).unwrap();
        store.rename_page("a", "c").unwrap();
        store.remove_page("b").unwrap();
        // Rejected mutations leave no trace
        assert!(store.add_page(page("c")).is_err());

        let ops = wal.replay().unwrap();
        assert_eq!(ops.len(), 4);

        let restored = PageStore::new();
        for op in &ops {
            match op {
                WalOperation::CreatePage {
                    id,
                    address,
                    owner,
                    created_at,
                } => restored.restore_page(Page::new(id.clone(), address.clone(), *owner, *created_at)),
                WalOperation::RenamePage { current, new } => {
                    assert!(restored.restore_rename(current, new));
                }
                WalOperation::DeletePage { id } => {
                    assert!(restored.restore_remove(id));
                }
                other => panic!("Unexpected operation {:?}", other),
            }
        }

        assert_eq!(restored.len(), 1);
        assert_eq!(restored.get_page("c").unwrap().id, "c");
    }
}
