//! Relationship domain
//!
//! Directed follow edges between users and the policy deciding whether a
//! follow takes effect immediately or waits for confirmation.

mod entity;
mod policy;
mod repository;

pub use entity::{Edge, EdgeState};
pub use policy::RelationshipPolicy;
pub use repository::RelationshipRepository;
