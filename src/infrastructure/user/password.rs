//! Password hashing using Argon2

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher as Argon2PasswordHasher, SaltString},
    Argon2,
};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Turns plaintext credentials into storable hashes
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a plaintext password with a fresh salt
    fn hash(&self, password: &str) -> Result<String, DomainError>;
}

#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }
}
