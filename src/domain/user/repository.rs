//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId};
use crate::domain::DomainError;

/// Which rows a read may return
///
/// Every read on the user store takes this explicitly, so soft-deleted
/// users can only be seen by asking for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only users that have not been soft-deleted
    ActiveOnly,
    /// All rows, including soft-deleted users
    IncludeDeleted,
}

impl Visibility {
    /// Whether a user with the given deleted flag is visible
    pub fn admits(&self, deleted: bool) -> bool {
        match self {
            Self::ActiveOnly => !deleted,
            Self::IncludeDeleted => true,
        }
    }
}

/// Repository trait for user storage
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by ID
    async fn get(&self, id: &UserId, visibility: Visibility) -> Result<Option<User>, DomainError>;

    /// Get several users by ID; unknown or invisible ids are skipped
    async fn get_many(
        &self,
        ids: &[UserId],
        visibility: Visibility,
    ) -> Result<Vec<User>, DomainError>;

    /// Get a user by username
    async fn get_by_username(
        &self,
        username: &str,
        visibility: Visibility,
    ) -> Result<Option<User>, DomainError>;

    /// Insert a new user; fails with `LoginBusy` if an active user holds the username
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Persist changes to an existing user
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Set the deleted flag; returns false if no active user had this id
    async fn soft_delete(&self, id: &UserId) -> Result<bool, DomainError>;

    /// List users ordered by creation time
    async fn list(&self, visibility: Visibility) -> Result<Vec<User>, DomainError>;

    /// Check if a username is taken
    async fn username_exists(
        &self,
        username: &str,
        visibility: Visibility,
    ) -> Result<bool, DomainError> {
        Ok(self.get_by_username(username, visibility).await?.is_some())
    }
}
