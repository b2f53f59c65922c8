//! Infrastructure layer - storage backends, services and logging

pub mod logging;
pub mod relationship;
pub mod skill;
pub mod storage;
pub mod user;
