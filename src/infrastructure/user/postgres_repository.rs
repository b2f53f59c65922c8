//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::user::{Gender, Profile, User, UserId, UserRepository, Visibility};
use crate::domain::DomainError;
use crate::infrastructure::storage::is_unique_violation;

const USER_COLUMNS: &str = "id, username, email, password_hash, last_name, first_name, \
     middle_name, gender, birth_date, city, profile_image, bio, phone, deleted, \
     created_at, updated_at";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn include_deleted(visibility: Visibility) -> bool {
    visibility == Visibility::IncludeDeleted
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: &UserId, visibility: Visibility) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "SELECT {} FROM users WHERE id = $1 AND ($2 OR deleted = FALSE)",
            USER_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(include_deleted(visibility))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_many(
        &self,
        ids: &[UserId],
        visibility: Visibility,
    ) -> Result<Vec<User>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let sql = format!(
            "SELECT {} FROM users WHERE id = ANY($1) AND ($2 OR deleted = FALSE) \
             ORDER BY created_at, username",
            USER_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(&uuids)
            .bind(include_deleted(visibility))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn get_by_username(
        &self,
        username: &str,
        visibility: Visibility,
    ) -> Result<Option<User>, DomainError> {
        // Deleted rows may share a username, prefer the active one
        let sql = format!(
            "SELECT {} FROM users WHERE username = $1 AND ($2 OR deleted = FALSE) \
             ORDER BY deleted, created_at DESC LIMIT 1",
            USER_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(username)
            .bind(include_deleted(visibility))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user by username: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let profile = user.profile();

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, last_name, first_name,
                               middle_name, gender, birth_date, city, profile_image, bio,
                               phone, deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.username())
        .bind(user.email())
        .bind(user.password_hash())
        .bind(profile.last_name.as_deref())
        .bind(profile.first_name.as_deref())
        .bind(profile.middle_name.as_deref())
        .bind(profile.gender.map(|g| g.as_str()))
        .bind(profile.birth_date)
        .bind(profile.city.as_deref())
        .bind(profile.profile_image.as_deref())
        .bind(profile.bio.as_deref())
        .bind(profile.phone.as_deref())
        .bind(user.is_deleted())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::login_busy(user.username())
            } else {
                DomainError::storage(format!("Failed to create user: {}", e))
            }
        })?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let profile = user.profile();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, last_name = $4, first_name = $5,
                middle_name = $6, gender = $7, birth_date = $8, city = $9,
                profile_image = $10, bio = $11, phone = $12, updated_at = $13
            WHERE id = $1 AND deleted = FALSE
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email())
        .bind(user.password_hash())
        .bind(profile.last_name.as_deref())
        .bind(profile.first_name.as_deref())
        .bind(profile.middle_name.as_deref())
        .bind(profile.gender.map(|g| g.as_str()))
        .bind(profile.birth_date)
        .bind(profile.city.as_deref())
        .bind(profile.profile_image.as_deref())
        .bind(profile.bio.as_deref())
        .bind(profile.phone.as_deref())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update user: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::user_not_found(user.id()));
        }

        Ok(user.clone())
    }

    async fn soft_delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE users SET deleted = TRUE, updated_at = NOW() WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, visibility: Visibility) -> Result<Vec<User>, DomainError> {
        let sql = format!(
            "SELECT {} FROM users WHERE ($1 OR deleted = FALSE) ORDER BY created_at, username",
            USER_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(include_deleted(visibility))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: Uuid = row.get("id");
    let gender: Option<String> = row.get("gender");

    let gender = match gender {
        Some(value) => Some(Gender::parse(&value).ok_or_else(|| {
            DomainError::storage(format!("Invalid gender '{}' in database", value))
        })?),
        None => None,
    };

    let profile = Profile {
        last_name: row.get("last_name"),
        first_name: row.get("first_name"),
        middle_name: row.get("middle_name"),
        gender,
        birth_date: row.get("birth_date"),
        city: row.get("city"),
        profile_image: row.get("profile_image"),
        bio: row.get("bio"),
        phone: row.get("phone"),
    };

    Ok(User::restore(
        UserId::from(id),
        row.get("username"),
        row.get("email"),
        row.get("password_hash"),
        profile,
        row.get("deleted"),
        row.get("created_at"),
        row.get("updated_at"),
    ))
}
