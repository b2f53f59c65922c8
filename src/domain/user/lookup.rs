//! Read access to active users for other services

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId};
use crate::domain::DomainError;

/// Resolves user ids to active (non-deleted) users
#[async_trait]
pub trait UserLookup: Send + Sync + Debug {
    /// Get an active user or fail with `UserNotFound`
    async fn require_active(&self, id: &UserId) -> Result<User, DomainError>;

    /// Get the active users among `ids`, silently skipping the rest
    async fn find_active(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError>;
}
