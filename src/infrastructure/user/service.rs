//! User directory service: registration, profile edits and soft deletion

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::domain::relationship::RelationshipRepository;
use crate::domain::user::{
    validate_birth_date, validate_username_chars, Gender, Profile, User, UserId, UserLookup,
    UserRepository, Visibility, MAX_BIO_LENGTH, MAX_NAME_LENGTH, MAX_PASSWORD_LENGTH,
    MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH, PHONE_REGEX,
};
use crate::domain::{validate_request, DomainError};

use super::password::PasswordHasher;

/// Request for registering a new user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(
        length(
            min = MIN_USERNAME_LENGTH,
            max = MAX_USERNAME_LENGTH,
            message = "must be between 3 and 50 characters"
        ),
        custom(function = validate_username_chars)
    )]
    pub username: String,

    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(
        min = MIN_PASSWORD_LENGTH,
        max = MAX_PASSWORD_LENGTH,
        message = "must be between 8 and 128 characters"
    ))]
    pub password: String,
}

/// Full replacement of a user's profile fields
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = MAX_NAME_LENGTH, message = "must be at most 100 characters"))]
    pub last_name: Option<String>,

    #[validate(length(max = MAX_NAME_LENGTH, message = "must be at most 100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = MAX_NAME_LENGTH, message = "must be at most 100 characters"))]
    pub middle_name: Option<String>,

    pub gender: Option<Gender>,

    #[validate(custom(function = validate_birth_date))]
    pub birth_date: Option<NaiveDate>,

    #[validate(length(max = MAX_NAME_LENGTH, message = "must be at most 100 characters"))]
    pub city: Option<String>,

    #[validate(url(message = "must be a valid URL"))]
    pub profile_image: Option<String>,

    #[validate(length(max = MAX_BIO_LENGTH, message = "must be at most 1000 characters"))]
    pub bio: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "must be a valid phone number"))]
    pub phone: Option<String>,
}

impl UpdateProfileRequest {
    fn into_profile(self) -> Profile {
        Profile {
            last_name: self.last_name,
            first_name: self.first_name,
            middle_name: self.middle_name,
            gender: self.gender,
            birth_date: self.birth_date,
            city: self.city,
            profile_image: self.profile_image,
            bio: self.bio,
            phone: self.phone,
        }
    }
}

/// User directory service
///
/// Deleting a user also drops the follow edges that reference it, so the
/// service holds the relationship store next to the user store.
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
    relationships: Arc<dyn RelationshipRepository>,
}

impl<R: UserRepository, H: PasswordHasher> UserService<R, H> {
    /// Create a new user service
    pub fn new(
        repository: Arc<R>,
        hasher: Arc<H>,
        relationships: Arc<dyn RelationshipRepository>,
    ) -> Self {
        Self {
            repository,
            hasher,
            relationships,
        }
    }

    /// Register a new user
    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError> {
        validate_request(&request)?;

        if self
            .repository
            .username_exists(&request.username, Visibility::ActiveOnly)
            .await?
        {
            return Err(DomainError::login_busy(request.username));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = User::new(
            UserId::generate(),
            request.username,
            request.email,
            password_hash,
        );

        let user = self.repository.create(user).await?;
        info!(user_id = %user.id(), username = %user.username(), "User registered");

        Ok(user)
    }

    /// Replace the profile of an active user
    ///
    /// Submitting a profile equal to the stored one leaves the user untouched.
    pub async fn update_profile(
        &self,
        id: &UserId,
        request: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        let mut user = self.get(id).await?;

        validate_request(&request)?;

        let profile = request.into_profile();

        if !user.is_profile_changed(&profile) {
            debug!(user_id = %id, "Profile unchanged, skipping update");
            return Ok(user);
        }

        user.set_profile(profile);
        let user = self.repository.update(&user).await?;
        info!(user_id = %id, "User profile updated");

        Ok(user)
    }

    /// Get an active user by ID
    pub async fn get(&self, id: &UserId) -> Result<User, DomainError> {
        self.repository
            .get(id, Visibility::ActiveOnly)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    /// List active users in registration order
    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        self.repository.list(Visibility::ActiveOnly).await
    }

    /// Whether an active user holds this username
    pub async fn exists_by_username(&self, username: &str) -> Result<bool, DomainError> {
        self.repository
            .username_exists(username, Visibility::ActiveOnly)
            .await
    }

    /// Drop a user's follow edges, then soft-delete the user
    ///
    /// A failed purge aborts before the user row is touched.
    pub async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        self.get(id).await?;

        let removed = self.relationships.purge_user(id).await?;
        debug!(user_id = %id, removed, "Purged follow edges");

        if !self.repository.soft_delete(id).await? {
            return Err(DomainError::user_not_found(id));
        }

        info!(user_id = %id, "User deleted");

        Ok(())
    }
}

#[async_trait]
impl<R: UserRepository, H: PasswordHasher> UserLookup for UserService<R, H> {
    async fn require_active(&self, id: &UserId) -> Result<User, DomainError> {
        self.get(id).await
    }

    async fn find_active(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError> {
        self.repository.get_many(ids, Visibility::ActiveOnly).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::relationship::{Edge, EdgeState};
    use crate::infrastructure::relationship::InMemoryRelationshipRepository;
    use crate::infrastructure::user::password::Argon2Hasher;
    use crate::infrastructure::user::repository::InMemoryUserRepository;

    struct Fixture {
        service: UserService<InMemoryUserRepository, Argon2Hasher>,
        users: Arc<InMemoryUserRepository>,
        edges: Arc<InMemoryRelationshipRepository>,
    }

    fn create_fixture() -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let edges = Arc::new(InMemoryRelationshipRepository::new());
        let service = UserService::new(users.clone(), Arc::new(Argon2Hasher::new()), edges.clone());

        Fixture {
            service,
            users,
            edges,
        }
    }

    fn register_request(username: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "secure_password123".to_string(),
        }
    }

    fn validation_fields(error: DomainError) -> Vec<String> {
        match error {
            DomainError::Validation { errors } => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_user() {
        let fixture = create_fixture();

        let user = fixture.service.register(register_request("alice")).await.unwrap();

        assert_eq!(user.username(), "alice");
        assert_eq!(user.email(), "alice@example.com");
        assert!(!user.is_deleted());
        assert!(user.password_hash().starts_with("$argon2"));
        assert!(fixture.service.exists_by_username("alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_fields() {
        let fixture = create_fixture();

        let request = RegisterUserRequest {
            username: "a!".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };

        let error = fixture.service.register(request).await.unwrap_err();
        let fields = validation_fields(error);

        assert!(fields.contains(&"username".to_string()));
        assert!(fields.contains(&"email".to_string()));
        assert!(fields.contains(&"password".to_string()));
        assert!(fixture.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate_username_is_login_busy() {
        let fixture = create_fixture();

        fixture.service.register(register_request("alice")).await.unwrap();

        let result = fixture.service.register(register_request("alice")).await;
        assert!(matches!(result, Err(DomainError::LoginBusy { username }) if username == "alice"));
    }

    #[tokio::test]
    async fn test_username_free_again_after_delete() {
        let fixture = create_fixture();

        let alice = fixture.service.register(register_request("alice")).await.unwrap();
        fixture.service.delete(alice.id()).await.unwrap();

        assert!(!fixture.service.exists_by_username("alice").await.unwrap());
        assert!(fixture.service.register(register_request("alice")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_profile() {
        let fixture = create_fixture();
        let alice = fixture.service.register(register_request("alice")).await.unwrap();

        let request = UpdateProfileRequest {
            first_name: Some("Alice".to_string()),
            city: Some("Lisbon".to_string()),
            gender: Some(Gender::Female),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1),
            phone: Some("+351 912 345 678".to_string()),
            profile_image: Some("https://cdn.example.com/alice.png".to_string()),
            ..Default::default()
        };

        let updated = fixture.service.update_profile(alice.id(), request).await.unwrap();

        assert_eq!(updated.profile().first_name.as_deref(), Some("Alice"));
        assert_eq!(updated.profile().city.as_deref(), Some("Lisbon"));
        assert_eq!(updated.profile().gender, Some(Gender::Female));
        assert!(updated.updated_at() >= alice.updated_at());
    }

    #[tokio::test]
    async fn test_update_profile_unchanged_is_noop() {
        let fixture = create_fixture();
        let alice = fixture.service.register(register_request("alice")).await.unwrap();

        let request = UpdateProfileRequest {
            phone: Some("89001234567".to_string()),
            ..Default::default()
        };

        let first = fixture
            .service
            .update_profile(alice.id(), request.clone())
            .await
            .unwrap();
        let second = fixture.service.update_profile(alice.id(), request).await.unwrap();

        assert_eq!(first.updated_at(), second.updated_at());
    }

    #[tokio::test]
    async fn test_update_profile_only_phone_changed_is_written() {
        let fixture = create_fixture();
        let alice = fixture.service.register(register_request("alice")).await.unwrap();

        let request = UpdateProfileRequest {
            phone: Some("89001234567".to_string()),
            ..Default::default()
        };

        let updated = fixture.service.update_profile(alice.id(), request).await.unwrap();
        assert_eq!(updated.profile().phone.as_deref(), Some("89001234567"));

        let stored = fixture.service.get(alice.id()).await.unwrap();
        assert_eq!(stored.profile().phone.as_deref(), Some("89001234567"));
    }

    #[tokio::test]
    async fn test_update_profile_validation() {
        let fixture = create_fixture();
        let alice = fixture.service.register(register_request("alice")).await.unwrap();

        let request = UpdateProfileRequest {
            bio: Some("x".repeat(1001)),
            phone: Some("call me".to_string()),
            profile_image: Some("not a url".to_string()),
            birth_date: Some(chrono::Utc::now().date_naive() + chrono::Duration::days(3)),
            ..Default::default()
        };

        let error = fixture.service.update_profile(alice.id(), request).await.unwrap_err();
        let fields = validation_fields(error);

        assert_eq!(fields, vec!["bio", "birth_date", "phone", "profile_image"]);
    }

    #[tokio::test]
    async fn test_update_profile_unknown_user() {
        let fixture = create_fixture();

        let result = fixture
            .service
            .update_profile(&UserId::generate(), UpdateProfileRequest::default())
            .await;

        assert!(matches!(result, Err(DomainError::UserNotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_deleted_user_not_found() {
        let fixture = create_fixture();
        let alice = fixture.service.register(register_request("alice")).await.unwrap();

        fixture.service.delete(alice.id()).await.unwrap();

        let result = fixture.service.get(alice.id()).await;
        assert!(matches!(result, Err(DomainError::UserNotFound { .. })));

        // The row itself is kept
        let stored = fixture
            .users
            .get(alice.id(), Visibility::IncludeDeleted)
            .await
            .unwrap();
        assert!(stored.unwrap().is_deleted());
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let fixture = create_fixture();
        let alice = fixture.service.register(register_request("alice")).await.unwrap();

        fixture.service.delete(alice.id()).await.unwrap();

        let result = fixture.service.delete(alice.id()).await;
        assert!(matches!(result, Err(DomainError::UserNotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_purges_edges() {
        let fixture = create_fixture();
        let alice = fixture.service.register(register_request("alice")).await.unwrap();
        let bob = fixture.service.register(register_request("bob")).await.unwrap();
        let carol = fixture.service.register(register_request("carol")).await.unwrap();

        for (from, to) in [(&alice, &bob), (&bob, &alice), (&carol, &bob)] {
            fixture
                .edges
                .insert(Edge::new(*from.id(), *to.id(), EdgeState::Confirmed))
                .await
                .unwrap();
        }

        fixture.service.delete(alice.id()).await.unwrap();

        assert!(fixture.edges.get(alice.id(), bob.id()).await.unwrap().is_none());
        assert!(fixture.edges.get(bob.id(), alice.id()).await.unwrap().is_none());
        assert!(fixture.edges.get(carol.id(), bob.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_in_registration_order() {
        let fixture = create_fixture();

        for name in ["user1", "user2", "user3"] {
            fixture.service.register(register_request(name)).await.unwrap();
        }

        let names: Vec<String> = fixture
            .service
            .list()
            .await
            .unwrap()
            .iter()
            .map(|u| u.username().to_string())
            .collect();

        assert_eq!(names, vec!["user1", "user2", "user3"]);
    }

    #[tokio::test]
    async fn test_user_lookup() {
        let fixture = create_fixture();
        let alice = fixture.service.register(register_request("alice")).await.unwrap();
        let bob = fixture.service.register(register_request("bob")).await.unwrap();

        fixture.service.delete(bob.id()).await.unwrap();

        assert!(fixture.service.require_active(alice.id()).await.is_ok());
        assert!(fixture.service.require_active(bob.id()).await.is_err());

        let found = fixture
            .service
            .find_active(&[*alice.id(), *bob.id()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), alice.id());
    }

    /// Edge store whose purge always fails
    #[derive(Debug, Default)]
    struct UnreachableEdges;

    #[async_trait]
    impl RelationshipRepository for UnreachableEdges {
        async fn get(&self, _: &UserId, _: &UserId) -> Result<Option<Edge>, DomainError> {
            Ok(None)
        }

        async fn insert(&self, edge: Edge) -> Result<Edge, DomainError> {
            Ok(edge)
        }

        async fn confirm_pending(&self, _: &UserId, _: &UserId) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn delete(&self, _: &UserId, _: &UserId) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn incoming(&self, _: &UserId, _: EdgeState) -> Result<Vec<Edge>, DomainError> {
            Ok(vec![])
        }

        async fn outgoing(&self, _: &UserId, _: EdgeState) -> Result<Vec<Edge>, DomainError> {
            Ok(vec![])
        }

        async fn purge_user(&self, _: &UserId) -> Result<u64, DomainError> {
            Err(DomainError::storage("connection reset"))
        }
    }

    #[tokio::test]
    async fn test_delete_keeps_user_when_purge_fails() {
        let service = UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Argon2Hasher::new()),
            Arc::new(UnreachableEdges),
        );
        let alice = service.register(register_request("alice")).await.unwrap();

        let result = service.delete(alice.id()).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));

        let still_there = service.get(alice.id()).await.unwrap();
        assert!(!still_there.is_deleted());
        assert!(service.exists_by_username("alice").await.unwrap());
    }
}
