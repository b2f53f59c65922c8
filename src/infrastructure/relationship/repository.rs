//! In-memory relationship repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::relationship::{Edge, EdgeState, RelationshipRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

type EdgeKey = (UserId, UserId);

/// In-memory implementation of RelationshipRepository, keyed by `(follower, followee)`
#[derive(Debug, Default)]
pub struct InMemoryRelationshipRepository {
    edges: Arc<RwLock<HashMap<EdgeKey, Edge>>>,
}

impl InMemoryRelationshipRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_age(mut edges: Vec<Edge>) -> Vec<Edge> {
    edges.sort_by_key(|e| e.created_at());
    edges
}

#[async_trait]
impl RelationshipRepository for InMemoryRelationshipRepository {
    async fn get(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<Option<Edge>, DomainError> {
        let edges = self.edges.read().await;
        Ok(edges.get(&(*follower, *followee)).cloned())
    }

    async fn insert(&self, edge: Edge) -> Result<Edge, DomainError> {
        let mut edges = self.edges.write().await;
        let key = (*edge.follower(), *edge.followee());

        if edges.contains_key(&key) {
            return Err(DomainError::conflict("already following"));
        }

        edges.insert(key, edge.clone());
        Ok(edge)
    }

    async fn confirm_pending(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, DomainError> {
        let mut edges = self.edges.write().await;

        match edges.get_mut(&(*follower, *followee)) {
            Some(edge) if !edge.is_confirmed() => {
                edge.confirm();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, follower: &UserId, followee: &UserId) -> Result<bool, DomainError> {
        let mut edges = self.edges.write().await;
        Ok(edges.remove(&(*follower, *followee)).is_some())
    }

    async fn incoming(&self, user: &UserId, state: EdgeState) -> Result<Vec<Edge>, DomainError> {
        let edges = self.edges.read().await;
        let result = edges
            .values()
            .filter(|e| e.followee() == user && e.state() == state)
            .cloned()
            .collect();

        Ok(sorted_by_age(result))
    }

    async fn outgoing(&self, user: &UserId, state: EdgeState) -> Result<Vec<Edge>, DomainError> {
        let edges = self.edges.read().await;
        let result = edges
            .values()
            .filter(|e| e.follower() == user && e.state() == state)
            .cloned()
            .collect();

        Ok(sorted_by_age(result))
    }

    async fn purge_user(&self, user: &UserId) -> Result<u64, DomainError> {
        let mut edges = self.edges.write().await;
        let before = edges.len();

        edges.retain(|_, edge| !edge.involves(user));

        Ok((before - edges.len()) as u64)
    }
}
