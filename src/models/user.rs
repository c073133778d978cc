use crate::core::error::{DirectoryError, ValidationError};
use crate::credentials::{CredentialStore, PasswordHash};
use crate::validation::email::{normalize_email, EmailValidator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque user identifier, assigned once at creation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Set of page identifiers owned by a user.
///
/// Each id appears at most once and is never empty. Iteration order is
/// lexicographic and carries no meaning.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageIdSet(BTreeSet<String>);

impl PageIdSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Returns false if the id was already present or is empty
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if id.is_empty() {
            return false;
        }
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.0.remove(id)
    }

    /// Substitute `current` with `new`.
    ///
    /// When `new` is already a member the two collapse into one entry.
    /// Returns false, leaving the set untouched, when `current` is not a
    /// member, when `new` equals `current` or when `new` is empty.
    pub fn rename(&mut self, current: &str, new: &str) -> bool {
        if current == new || new.is_empty() || !self.0.remove(current) {
            return false;
        }
        self.0.insert(new.to_string());
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for PageIdSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|id| !id.is_empty()).collect())
    }
}

impl<'a> FromIterator<&'a str> for PageIdSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    /// Trimmed, lowercased address
    pub email: String,
    pub password_hash: PasswordHash,
    pub page_ids: PageIdSet,
    /// Unix timestamp (seconds)
    pub created_at: i64,
    /// Unix timestamp (seconds), refreshed on every field update
    pub updated_at: i64,
}

/// A validated registration with its password already hashed.
///
/// Building one is the only path to a new [`User`].
#[derive(Debug)]
pub struct NewUser {
    email: String,
    password_hash: PasswordHash,
}

impl NewUser {
    pub fn new(
        email: &str,
        password: &str,
        min_password_length: usize,
        validator: &dyn EmailValidator,
        credentials: &CredentialStore,
    ) -> Result<Self, DirectoryError> {
        let email = normalize_email(email);
        if !validator.is_email(&email) {
            return Err(ValidationError::InvalidEmail(email).into());
        }

        let length = password.chars().count();
        if length < min_password_length {
            return Err(ValidationError::PasswordTooShort {
                min: min_password_length,
                actual: length,
            }
            .into());
        }

        let password_hash = credentials.hash(password)?;

        Ok(Self {
            email,
            password_hash,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn into_user(self, now: i64) -> User {
        User {
            id: UserId::new(),
            email: self.email,
            password_hash: self.password_hash,
            page_ids: PageIdSet::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
