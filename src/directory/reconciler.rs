//! Keeps each user's page id set consistent with page rename and delete events.
//!
//! Page management calls [`UserDirectory::update_page_id`] after it renames a
//! page and [`UserDirectory::delete_page_id`] when it deletes one, passing the
//! authenticated owner in both cases.

use crate::core::error::DirectoryError;
use crate::directory::user_directory::UserDirectory;
use crate::models::user::User;
use crate::stores::user_store::UserUpdate;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info};

/// Which page lookup result allows `delete_page_id` to drop the id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Drop the id only while the page can still be found
    #[default]
    WhenPageExists,
    /// Drop the id only once the page is gone, clearing dangling references
    WhenPageMissing,
}

impl DeletePolicy {
    pub fn should_remove(self, page_exists: bool) -> bool {
        match self {
            DeletePolicy::WhenPageExists => page_exists,
            DeletePolicy::WhenPageMissing => !page_exists,
        }
    }
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletePolicy::WhenPageExists => f.write_str("when_page_exists"),
            DeletePolicy::WhenPageMissing => f.write_str("when_page_missing"),
        }
    }
}

impl UserDirectory {
    /// Substitute `current_id` with `new_id` in the owner's page ids.
    ///
    /// Absent `current_id` leaves the set as is. If `new_id` is already
    /// present the two collapse into one entry.
    pub async fn update_page_id(
        &self,
        user: &User,
        current_id: &str,
        new_id: &str,
    ) -> Result<(), DirectoryError> {
        let update = UserUpdate::RenamePageId {
            current: current_id.to_string(),
            new: new_id.to_string(),
        };

        match self.store.update_fields(user.id, update).await? {
            Some(updated) => {
                info!(
                    user_id = %user.id,
                    current_id,
                    new_id,
                    page_count = updated.page_ids.len(),
                    "Page id renamed"
                );
            }
            None => {
                debug!(user_id = %user.id, "User record gone, rename skipped");
            }
        }

        Ok(())
    }

    /// Drop `current_id` from the owner's page ids when the delete policy allows.
    ///
    /// A missing page is never an error.
    pub async fn delete_page_id(&self, user: &User, current_id: &str) -> Result<(), DirectoryError> {
        let page_exists = self.pages.find_page_by_id(current_id).await.is_some();

        if !self.delete_policy.should_remove(page_exists) {
            debug!(
                user_id = %user.id,
                page_id = current_id,
                page_exists,
                policy = %self.delete_policy,
                "Page id kept"
            );
            return Ok(());
        }

        match self
            .store
            .update_fields(user.id, UserUpdate::RemovePageId(current_id.to_string()))
            .await?
        {
            Some(updated) => {
                info!(
                    user_id = %user.id,
                    page_id = current_id,
                    page_count = updated.page_ids.len(),
                    "Page id removed"
                );
            }
            None => {
                debug!(user_id = %user.id, "User record gone, delete skipped");
            }
        }

        Ok(())
    }
}
