//! Relationship repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Edge, EdgeState};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository trait for follow edges
///
/// The pair `(follower, followee)` is unique; implementations must reject a
/// second insert for the same pair with `DomainError::Conflict` even when two
/// inserts race.
#[async_trait]
pub trait RelationshipRepository: Send + Sync + Debug {
    /// Get the edge `follower -> followee`
    async fn get(&self, follower: &UserId, followee: &UserId)
    -> Result<Option<Edge>, DomainError>;

    /// Insert a new edge
    async fn insert(&self, edge: Edge) -> Result<Edge, DomainError>;

    /// Flip a pending edge to confirmed; returns false if there was no pending edge
    async fn confirm_pending(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, DomainError>;

    /// Delete the edge `follower -> followee`; returns false if it did not exist
    async fn delete(&self, follower: &UserId, followee: &UserId) -> Result<bool, DomainError>;

    /// Edges pointing at `user` in the given state
    async fn incoming(&self, user: &UserId, state: EdgeState) -> Result<Vec<Edge>, DomainError>;

    /// Edges originating from `user` in the given state
    async fn outgoing(&self, user: &UserId, state: EdgeState) -> Result<Vec<Edge>, DomainError>;

    /// Delete every edge that touches `user`; returns how many were removed
    async fn purge_user(&self, user: &UserId) -> Result<u64, DomainError>;
}
