//! PostgreSQL relationship repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::relationship::{Edge, EdgeState, RelationshipRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::storage::is_unique_violation;

/// PostgreSQL implementation of RelationshipRepository
#[derive(Debug, Clone)]
pub struct PostgresRelationshipRepository {
    pool: PgPool,
}

impl PostgresRelationshipRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn edges_where(
        &self,
        column: &str,
        user: &UserId,
        state: EdgeState,
    ) -> Result<Vec<Edge>, DomainError> {
        let sql = format!(
            "SELECT follower_id, followee_id, state, created_at FROM relationships \
             WHERE {} = $1 AND state = $2 ORDER BY created_at",
            column
        );

        let rows = sqlx::query(&sql)
            .bind(user.as_uuid())
            .bind(state.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list relationships: {}", e)))?;

        rows.iter().map(row_to_edge).collect()
    }
}

#[async_trait]
impl RelationshipRepository for PostgresRelationshipRepository {
    async fn get(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<Option<Edge>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT follower_id, followee_id, state, created_at
            FROM relationships
            WHERE follower_id = $1 AND followee_id = $2
            "#,
        )
        .bind(follower.as_uuid())
        .bind(followee.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get relationship: {}", e)))?;

        row.as_ref().map(row_to_edge).transpose()
    }

    async fn insert(&self, edge: Edge) -> Result<Edge, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO relationships (follower_id, followee_id, state, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(edge.follower().as_uuid())
        .bind(edge.followee().as_uuid())
        .bind(edge.state().as_str())
        .bind(edge.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict("already following")
            } else {
                DomainError::storage(format!("Failed to create relationship: {}", e))
            }
        })?;

        Ok(edge)
    }

    async fn confirm_pending(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE relationships SET state = $3
            WHERE follower_id = $1 AND followee_id = $2 AND state = $4
            "#,
        )
        .bind(follower.as_uuid())
        .bind(followee.as_uuid())
        .bind(EdgeState::Confirmed.as_str())
        .bind(EdgeState::Pending.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to confirm relationship: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, follower: &UserId, followee: &UserId) -> Result<bool, DomainError> {
        let result =
            sqlx::query("DELETE FROM relationships WHERE follower_id = $1 AND followee_id = $2")
                .bind(follower.as_uuid())
                .bind(followee.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to delete relationship: {}", e))
                })?;

        Ok(result.rows_affected() > 0)
    }

    async fn incoming(&self, user: &UserId, state: EdgeState) -> Result<Vec<Edge>, DomainError> {
        self.edges_where("followee_id", user, state).await
    }

    async fn outgoing(&self, user: &UserId, state: EdgeState) -> Result<Vec<Edge>, DomainError> {
        self.edges_where("follower_id", user, state).await
    }

    async fn purge_user(&self, user: &UserId) -> Result<u64, DomainError> {
        let result =
            sqlx::query("DELETE FROM relationships WHERE follower_id = $1 OR followee_id = $1")
                .bind(user.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to purge relationships: {}", e))
                })?;

        Ok(result.rows_affected())
    }
}

fn row_to_edge(row: &sqlx::postgres::PgRow) -> Result<Edge, DomainError> {
    let follower: Uuid = row.get("follower_id");
    let followee: Uuid = row.get("followee_id");
    let state: String = row.get("state");

    let state = EdgeState::parse(&state).ok_or_else(|| {
        DomainError::storage(format!("Invalid relationship state '{}' in database", state))
    })?;

    Ok(Edge::restore(
        UserId::from(follower),
        UserId::from(followee),
        state,
        row.get("created_at"),
    ))
}
