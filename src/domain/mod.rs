//! Domain layer - Core business logic and entities

pub mod error;
pub mod relationship;
pub mod skill;
pub mod user;
pub mod validation;

pub use error::DomainError;
pub use relationship::{Edge, EdgeState, RelationshipPolicy, RelationshipRepository};
pub use skill::{Skill, SkillId, SkillRepository, SkillType};
pub use user::{Gender, Profile, User, UserId, UserLookup, UserRepository, Visibility};
pub use validation::{field_errors, validate_request, FieldError};
