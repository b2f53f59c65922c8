//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository, Visibility};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
///
/// Soft-deleted users stay in the map with their flag set.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_creation(mut users: Vec<User>) -> Vec<User> {
    users.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.username().cmp(b.username()))
    });
    users
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId, visibility: Visibility) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users
            .get(id)
            .filter(|u| visibility.admits(u.is_deleted()))
            .cloned())
    }

    async fn get_many(
        &self,
        ids: &[UserId],
        visibility: Visibility,
    ) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().await;
        let found = ids
            .iter()
            .filter_map(|id| users.get(id))
            .filter(|u| visibility.admits(u.is_deleted()))
            .cloned()
            .collect();

        Ok(sorted_by_creation(found))
    }

    async fn get_by_username(
        &self,
        username: &str,
        visibility: Visibility,
    ) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| visibility.admits(u.is_deleted()))
            .find(|u| u.username() == username)
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        if users.contains_key(user.id()) {
            return Err(DomainError::conflict(format!(
                "User with id={} already exists",
                user.id()
            )));
        }

        let username_taken = users
            .values()
            .any(|u| !u.is_deleted() && u.username() == user.username());

        if username_taken {
            return Err(DomainError::login_busy(user.username()));
        }

        users.insert(*user.id(), user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        match users.get(user.id()) {
            Some(existing) if !existing.is_deleted() => {}
            _ => return Err(DomainError::user_not_found(user.id())),
        }

        let username_taken = users.values().any(|u| {
            !u.is_deleted() && u.username() == user.username() && u.id() != user.id()
        });

        if username_taken {
            return Err(DomainError::login_busy(user.username()));
        }

        users.insert(*user.id(), user.clone());
        Ok(user.clone())
    }

    async fn soft_delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut users = self.users.write().await;

        match users.get_mut(id) {
            Some(user) if !user.is_deleted() => {
                user.mark_deleted();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(&self, visibility: Visibility) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().await;
        let result = users
            .values()
            .filter(|u| visibility.admits(u.is_deleted()))
            .cloned()
            .collect();

        Ok(sorted_by_creation(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user(username: &str) -> User {
        User::new(
            UserId::generate(),
            username,
            format!("{}@example.com", username),
            "hashed_password",
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("testuser");

        repo.create(user.clone()).await.unwrap();

        let retrieved = repo.get(user.id(), Visibility::ActiveOnly).await.unwrap();
        assert_eq!(retrieved.unwrap().username(), "testuser");
    }

    #[tokio::test]
    async fn test_get_by_username() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("testuser");

        repo.create(user.clone()).await.unwrap();

        let retrieved = repo
            .get_by_username("testuser", Visibility::ActiveOnly)
            .await
            .unwrap();
        assert_eq!(retrieved.unwrap().id(), user.id());

        let not_found = repo
            .get_by_username("nonexistent", Visibility::ActiveOnly)
            .await
            .unwrap();
        assert!(not_found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_login_busy() {
        let repo = InMemoryUserRepository::new();

        repo.create(create_test_user("sameusername")).await.unwrap();

        let result = repo.create(create_test_user("sameusername")).await;
        assert!(matches!(result, Err(DomainError::LoginBusy { .. })));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_user_but_keeps_row() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("testuser");

        repo.create(user.clone()).await.unwrap();
        assert!(repo.soft_delete(user.id()).await.unwrap());

        assert!(repo.get(user.id(), Visibility::ActiveOnly).await.unwrap().is_none());
        assert!(!repo
            .username_exists("testuser", Visibility::ActiveOnly)
            .await
            .unwrap());

        let stored = repo
            .get(user.id(), Visibility::IncludeDeleted)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_deleted());
    }

    #[tokio::test]
    async fn test_soft_delete_twice_reports_missing() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("testuser");

        repo.create(user.clone()).await.unwrap();

        assert!(repo.soft_delete(user.id()).await.unwrap());
        assert!(!repo.soft_delete(user.id()).await.unwrap());
        assert!(!repo.soft_delete(&UserId::generate()).await.unwrap());
    }

    #[tokio::test]
    async fn test_username_reusable_after_delete() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("testuser");

        repo.create(user.clone()).await.unwrap();
        repo.soft_delete(user.id()).await.unwrap();

        assert!(repo.create(create_test_user("testuser")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_deleted_user_fails() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("testuser");

        repo.create(user.clone()).await.unwrap();
        repo.soft_delete(user.id()).await.unwrap();

        let result = repo.update(&user).await;
        assert!(matches!(result, Err(DomainError::UserNotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_and_get_many_filter_deleted() {
        let repo = InMemoryUserRepository::new();
        let alice = create_test_user("alice");
        let bob = create_test_user("bob");

        repo.create(alice.clone()).await.unwrap();
        repo.create(bob.clone()).await.unwrap();
        repo.soft_delete(bob.id()).await.unwrap();

        let active = repo.list(Visibility::ActiveOnly).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].username(), "alice");

        let all = repo.list(Visibility::IncludeDeleted).await.unwrap();
        assert_eq!(all.len(), 2);

        let many = repo
            .get_many(&[*alice.id(), *bob.id(), UserId::generate()], Visibility::ActiveOnly)
            .await
            .unwrap();
        assert_eq!(many.len(), 1);
    }
}
