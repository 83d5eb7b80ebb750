use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    dto::base::{BaseHttpResponse, ErrorBody, ResultCode, ValidationErrorDetail},
    services::auth_client::AuthServiceError,
};

/// PostgreSQL unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Application-level error type.
///
/// Repositories and collaborators return these unmodified; the HTTP layer is
/// the only place that turns one into a status code and envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<ValidationErrorDetail>,
    },

    /// The `id` path parameter is missing, zero or not a number.
    #[error("id must be a positive integer")]
    InvalidId,

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// No route matches the request path.
    #[error("no route for {0}")]
    RouteNotFound(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    Duplicate(String),

    #[error("invalid OTP")]
    InvalidOtp,

    #[error(transparent)]
    Auth(#[from] AuthServiceError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AppError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        match self {
            AppError::Duplicate(_) => true,
            AppError::Database(err) => is_unique_violation(err),
            _ => false,
        }
    }

    /// Error kind -> HTTP status table.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidId => StatusCode::NOT_FOUND,
            AppError::NotFound { .. } | AppError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::InvalidOtp => StatusCode::BAD_REQUEST,
            AppError::Auth(err) => match err {
                AuthServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
                AuthServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                AuthServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                AuthServiceError::Conflict(_) => StatusCode::CONFLICT,
                AuthServiceError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
                AuthServiceError::Transport(_)
                | AuthServiceError::Unexpected { .. }
                | AuthServiceError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Database(err) if is_unique_violation(err) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Io(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn result_code(&self) -> ResultCode {
        match self {
            AppError::Validation { .. } | AppError::InvalidId | AppError::InvalidOtp => {
                ResultCode::ValidationError
            }
            _ => match self.status_code() {
                StatusCode::BAD_REQUEST => ResultCode::ValidationError,
                StatusCode::NOT_FOUND => ResultCode::NotFoundError,
                StatusCode::CONFLICT => ResultCode::ConflictError,
                StatusCode::TOO_MANY_REQUESTS => ResultCode::TooManyRequests,
                StatusCode::UNAUTHORIZED => ResultCode::AuthError,
                StatusCode::METHOD_NOT_ALLOWED => ResultCode::MethodNotAllowed,
                _ => ResultCode::InternalError,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } | AppError::InvalidId => "VALIDATION_ERROR",
            AppError::InvalidOtp => "INVALID_OTP",
            _ => match self.status_code() {
                StatusCode::BAD_REQUEST => "BAD_REQUEST",
                StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
                StatusCode::NOT_FOUND => "NOT_FOUND",
                StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
                StatusCode::CONFLICT => "CONFLICT",
                StatusCode::TOO_MANY_REQUESTS => "TOO_MANY_REQUESTS",
                _ => "INTERNAL_ERROR",
            },
        }
    }

    /// Envelope body for this error. 5xx details are logged, not returned.
    pub fn to_body(&self) -> ErrorBody {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let validation_errors = match self {
            AppError::Validation { details, .. } if !details.is_empty() => Some(details.clone()),
            _ => None,
        };

        ErrorBody {
            code: self.code().to_string(),
            message,
            validation_errors,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation {
            message: "request validation failed".to_string(),
            details: crate::dto::base::validation_details(&errors),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body: BaseHttpResponse<()> = BaseHttpResponse::failure(self.result_code(), self.to_body());
        (status, Json(body)).into_response()
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}
