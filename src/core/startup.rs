use anyhow::Result;
use tracing::{debug, warn};

use crate::models::page::Page;
use crate::stores::page_store::PageStore;
use crate::stores::user_store::{user_from_wal, UserCache};
use crate::wal::wal::WalOperation;

// this runs at boot time, before any listener is bound
pub fn apply_wal_operations(
    users: &UserCache,
    pages: &PageStore,
    operations: &[WalOperation],
) -> Result<()> {
    for op in operations {
        match op {
            WalOperation::CreateUser {
                id,
                email,
                password_hash,
                created_at,
            } => {
                let user = user_from_wal(*id, email.clone(), password_hash.clone(), *created_at);
                users.restore(user);
            }
            WalOperation::SetPageIds {
                id,
                page_ids,
                updated_at,
            } => {
                if !users.restore_page_ids(*id, page_ids.clone(), *updated_at) {
                    warn!(user_id = %id, "SET_PAGE_IDS for unknown user, skipping");
                }
            }
            WalOperation::CreatePage {
                id,
                address,
                owner,
                created_at,
            } => {
                pages.restore_page(Page::new(id.clone(), address.clone(), *owner, *created_at));
            }
            WalOperation::RenamePage { current, new } => {
                if !pages.restore_rename(current, new) {
                    warn!(page_id = %current, "RENAME_PAGE for unknown page, skipping");
                }
            }
            WalOperation::DeletePage { id } => {
                if !pages.restore_remove(id) {
                    debug!(page_id = %id, "DELETE_PAGE for unknown page");
                }
            }
        }
    }

    debug!(users = users.len(), pages = pages.len(), "WAL operations applied");
    Ok(())
}
