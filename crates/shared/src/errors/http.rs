use crate::errors::{error::ErrorResponse, repository::RepositoryError, service::ServiceError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    InsufficientStock { message: String, available_stock: i32 },
    Internal(String),
}

impl From<RepositoryError> for HttpError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => HttpError::NotFound("Not found".into()),
            RepositoryError::Conflict(msg) => HttpError::Conflict(msg),
            other => {
                error!("❌ Unhandled repository error: {other}");
                HttpError::Internal("Repository error".into())
            }
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Repo(repo_err) => HttpError::from(repo_err),

            ServiceError::NotFound(msg) => HttpError::NotFound(msg),

            ServiceError::InvalidArgument(msg) => HttpError::BadRequest(msg),

            ServiceError::InsufficientStock { max_allowed } => HttpError::InsufficientStock {
                message: format!("Only {max_allowed} units available"),
                available_stock: max_allowed,
            },

            ServiceError::Forbidden(msg) => HttpError::Forbidden(msg),

            ServiceError::Jwt(err) => HttpError::Unauthorized(format!("JWT error: {err}")),

            ServiceError::TokenExpired => HttpError::Unauthorized("Token expired".into()),

            ServiceError::InvalidTokenType => HttpError::Unauthorized("Invalid token type".into()),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg)),
            HttpError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ErrorResponse::new(msg)),
            HttpError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorResponse::new(msg)),
            HttpError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(msg)),
            HttpError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::new(msg)),
            HttpError::InsufficientStock {
                message,
                available_stock,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    success: false,
                    message,
                    available_stock: Some(available_stock),
                },
            ),
            HttpError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(msg))
            }
        };

        (status, Json(body)).into_response()
    }
}
