use thiserror::Error;

use super::validation::FieldError;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {}", join_field_errors(errors))]
    Validation { errors: Vec<FieldError> },

    #[error("User with id={id} does not exist")]
    UserNotFound { id: String },

    #[error("Skill with id={id} does not exist")]
    SkillNotFound { id: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("User with username '{username}' already exists")]
    LoginBusy { username: String },

    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation { errors }
    }

    /// Validation failure that is not tied to a request body field
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldError::new(field, message)],
        }
    }

    pub fn user_not_found(id: impl ToString) -> Self {
        Self::UserNotFound { id: id.to_string() }
    }

    pub fn skill_not_found(id: impl ToString) -> Self {
        Self::SkillNotFound { id: id.to_string() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn login_busy(username: impl Into<String>) -> Self {
        Self::LoginBusy {
            username: username.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
