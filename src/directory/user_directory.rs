use crate::core::error::{CredentialError, DirectoryError};
use crate::credentials::CredentialStore;
use crate::directory::reconciler::DeletePolicy;
use crate::models::user::{NewUser, User, UserId};
use crate::stores::page_store::PageDirectory;
use crate::stores::user_store::{UserStore, UserUpdate};
use crate::utils::time::current_timestamp;
use crate::validation::email::{normalize_email, EmailValidator};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owns user records and the credential check that gates them
pub struct UserDirectory {
    pub(super) store: Arc<dyn UserStore>,
    pub(super) pages: Arc<dyn PageDirectory>,
    validator: Arc<dyn EmailValidator>,
    credentials: CredentialStore,
    min_password_length: usize,
    pub(super) delete_policy: DeletePolicy,
}

impl UserDirectory {
    pub fn new(
        store: Arc<dyn UserStore>,
        pages: Arc<dyn PageDirectory>,
        validator: Arc<dyn EmailValidator>,
        credentials: CredentialStore,
        min_password_length: usize,
    ) -> Self {
        Self {
            store,
            pages,
            validator,
            credentials,
            min_password_length,
            delete_policy: DeletePolicy::default(),
        }
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    /// Validate, hash and persist a new user
    pub async fn register(&self, email: &str, password: &str) -> Result<User, DirectoryError> {
        let validator = Arc::clone(&self.validator);
        let credentials = self.credentials.clone();
        let min_length = self.min_password_length;
        let email = email.to_string();
        let password = password.to_string();

        // Argon2 is CPU bound, keep it off the async workers
        let new_user = tokio::task::spawn_blocking(move || {
            NewUser::new(&email, &password, min_length, validator.as_ref(), &credentials)
        })
        .await
        .map_err(|e| CredentialError::Hash(format!("hashing task failed: {}", e)))??;

        let user = new_user.into_user(current_timestamp());
        self.store.insert(user.clone()).await?;

        info!(user_id = %user.id, email = %user.email, "User registered");
        Ok(user)
    }

    /// Look up a user by email and check the password.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, DirectoryError> {
        let email = normalize_email(email);

        let user = match self.store.find_one_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("Authentication failed");
                return Err(DirectoryError::InvalidCredentials);
            }
        };

        let credentials = self.credentials.clone();
        let password = password.to_string();
        let hash = user.password_hash.clone();

        let verified = tokio::task::spawn_blocking(move || credentials.verify(&password, &hash))
            .await
            .unwrap_or(false);

        if !verified {
            warn!("Authentication failed");
            return Err(DirectoryError::InvalidCredentials);
        }

        debug!(user_id = %user.id, "User authenticated");
        Ok(user)
    }

    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DirectoryError> {
        Ok(self.store.find_one_by_id(id).await?)
    }

    /// Associate a freshly created page with its owner
    pub async fn add_page_id(&self, user: &User, page_id: &str) -> Result<Option<User>, DirectoryError> {
        let updated = self
            .store
            .update_fields(user.id, UserUpdate::AddPageId(page_id.to_string()))
            .await?;

        if updated.is_none() {
            debug!(user_id = %user.id, "User record gone, page id not added");
        }

        Ok(updated)
    }
}
