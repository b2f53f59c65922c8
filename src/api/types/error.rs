//! Error envelope returned by every endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::DomainError;

/// Machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    RequestValidationError,
    UserNotFound,
    SkillNotFound,
    NotFound,
    LoginBusy,
    Conflict,
    AccessDenied,
    InternalServerError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::RequestValidationError => "REQUEST_VALIDATION_ERROR",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::SkillNotFound => "SKILL_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",
            Self::LoginBusy => "LOGIN_BUSY",
            Self::Conflict => "CONFLICT",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        };
        f.write_str(code)
    }
}

/// `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: ErrorCode,
    pub message: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    code,
                    message: message.into(),
                },
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::RequestValidationError,
            message,
        )
    }

    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ErrorCode::Conflict, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, ErrorCode::AccessDenied, message)
    }

    /// Internal failure; the caller only sees a generic message
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            "Internal server error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::Validation { errors } => Self::validation(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            DomainError::UserNotFound { .. } => {
                Self::not_found(ErrorCode::UserNotFound, err.to_string())
            }
            DomainError::SkillNotFound { .. } => {
                Self::not_found(ErrorCode::SkillNotFound, err.to_string())
            }
            DomainError::NotFound { message } => Self::not_found(ErrorCode::NotFound, message),
            DomainError::LoginBusy { .. } => {
                Self::new(StatusCode::BAD_REQUEST, ErrorCode::LoginBusy, err.to_string())
            }
            DomainError::Conflict { reason } => Self::conflict(reason),
            DomainError::AccessDenied { message } => Self::forbidden(message),
            DomainError::Storage { .. } | DomainError::Internal { .. } => {
                error!(error = %err, "Request failed");
                Self::internal()
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.code, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldError;

    #[test]
    fn test_validation_messages_are_joined() {
        let err: ApiError = DomainError::validation(vec![
            FieldError::new("email", "must be a valid email address"),
            FieldError::new("username", "must be between 3 and 50 characters"),
        ])
        .into();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.code, ErrorCode::RequestValidationError);
        assert_eq!(
            err.response.error.message,
            "email: must be a valid email address; username: must be between 3 and 50 characters"
        );
    }

    #[test]
    fn test_domain_error_mapping() {
        let cases = [
            (
                DomainError::user_not_found("42"),
                StatusCode::NOT_FOUND,
                ErrorCode::UserNotFound,
            ),
            (
                DomainError::skill_not_found("7"),
                StatusCode::NOT_FOUND,
                ErrorCode::SkillNotFound,
            ),
            (
                DomainError::not_found("no request"),
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
            ),
            (
                DomainError::login_busy("alice"),
                StatusCode::BAD_REQUEST,
                ErrorCode::LoginBusy,
            ),
            (
                DomainError::conflict("already following"),
                StatusCode::CONFLICT,
                ErrorCode::Conflict,
            ),
            (
                DomainError::access_denied("nope"),
                StatusCode::FORBIDDEN,
                ErrorCode::AccessDenied,
            ),
        ];

        for (domain_err, status, code) in cases {
            let api_err: ApiError = domain_err.into();
            assert_eq!(api_err.status, status);
            assert_eq!(api_err.response.error.code, code);
        }
    }

    #[test]
    fn test_storage_error_details_are_hidden() {
        let err: ApiError = DomainError::storage("connection refused to 10.0.0.5").into();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.response.error.code, ErrorCode::InternalServerError);
        assert!(!err.response.error.message.contains("10.0.0.5"));
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::conflict("not following");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["code"], "CONFLICT");
        assert_eq!(json["error"]["message"], "not following");
    }

    #[test]
    fn test_display_matches_serialized_code() {
        let code = ErrorCode::RequestValidationError;
        let serialized = serde_json::to_value(code).unwrap();

        assert_eq!(serialized, code.to_string());
    }
}
