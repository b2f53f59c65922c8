//! PostgreSQL skill repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::skill::{normalize_title, Skill, SkillId, SkillRepository, SkillType};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// PostgreSQL implementation of SkillRepository
#[derive(Debug, Clone)]
pub struct PostgresSkillRepository {
    pool: PgPool,
}

impl PostgresSkillRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SkillRepository for PostgresSkillRepository {
    async fn get(&self, id: &SkillId) -> Result<Option<Skill>, DomainError> {
        let row = sqlx::query("SELECT id, title, skill_type FROM skills WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get skill: {}", e)))?;

        row.as_ref().map(row_to_skill).transpose()
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Skill>, DomainError> {
        let row = sqlx::query(
            "SELECT id, title, skill_type FROM skills WHERE LOWER(title) = $1",
        )
        .bind(normalize_title(title))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to find skill: {}", e)))?;

        row.as_ref().map(row_to_skill).transpose()
    }

    async fn find_or_create(
        &self,
        title: &str,
        skill_type: SkillType,
    ) -> Result<Skill, DomainError> {
        let candidate = Skill::new(title, skill_type);

        // A concurrent insert of the same title makes this a no-op
        sqlx::query(
            r#"
            INSERT INTO skills (id, title, skill_type)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(candidate.id().as_uuid())
        .bind(candidate.title())
        .bind(candidate.skill_type().as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create skill: {}", e)))?;

        self.find_by_title(candidate.title())
            .await?
            .ok_or_else(|| {
                DomainError::storage(format!("Skill '{}' missing after insert", candidate.title()))
            })
    }

    async fn link(&self, user_id: &UserId, skill_id: &SkillId) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO user_skills (user_id, skill_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, skill_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(skill_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                DomainError::skill_not_found(skill_id)
            }
            _ => DomainError::storage(format!("Failed to link skill: {}", e)),
        })?;

        Ok(())
    }

    async fn unlink(&self, user_id: &UserId, skill_id: &SkillId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM user_skills WHERE user_id = $1 AND skill_id = $2")
            .bind(user_id.as_uuid())
            .bind(skill_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to unlink skill: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Skill>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.title, s.skill_type
            FROM skills s
            JOIN user_skills us ON us.skill_id = s.id
            WHERE us.user_id = $1
            ORDER BY s.title
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list user skills: {}", e)))?;

        rows.iter().map(row_to_skill).collect()
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM skills")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count skills: {}", e)))?;

        Ok(count as usize)
    }
}

fn row_to_skill(row: &sqlx::postgres::PgRow) -> Result<Skill, DomainError> {
    let id: Uuid = row.get("id");
    let title: String = row.get("title");
    let skill_type: String = row.get("skill_type");

    let skill_type = SkillType::parse(&skill_type).ok_or_else(|| {
        DomainError::storage(format!("Invalid skill type '{}' in database", skill_type))
    })?;

    Ok(Skill::restore(SkillId::from(id), title, skill_type))
}
