//! Wire types shared by all endpoints

pub mod envelope;
pub mod error;
pub mod json;

pub use envelope::{Ack, ApiResponse};
pub use error::{ApiError, ApiErrorResponse, ErrorCode};
pub use json::{Json, Path};
