//! User domain
//!
//! Domain types and traits for registered users: the entity with its
//! profile, validation rules, the store contract and the lookup used by
//! other services.

mod entity;
mod lookup;
mod repository;
mod validation;

pub use entity::{Gender, Profile, User, UserId};
pub use lookup::UserLookup;
pub use repository::{UserRepository, Visibility};
pub use validation::{
    validate_birth_date, validate_not_blank, validate_username_chars, MAX_BIO_LENGTH,
    MAX_NAME_LENGTH, MAX_PASSWORD_LENGTH, MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH,
    MIN_USERNAME_LENGTH, PHONE_REGEX,
};
