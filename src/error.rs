use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr, SqlErr, sqlx};
use thiserror::Error;
use validator::ValidationErrors;

use crate::response::{ErrorResponse, FieldError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Query(#[from] QueryRejection),

    #[error(transparent)]
    Path(#[from] PathRejection),

    #[error(transparent)]
    MultipartRejection(#[from] MultipartRejection),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error("Request timed out")]
    Timeout,

    #[error("Database error")]
    OrmError(#[from] DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

/// How a database failure is reported to the client.
#[derive(Debug, PartialEq)]
enum DbFailure {
    Unavailable,
    Duplicate(&'static str),
    BadSearchPattern,
    Other,
}

/// Postgres `invalid_regular_expression`, raised by `~*` on a malformed search.
const INVALID_REGULAR_EXPRESSION: &str = "2201B";

fn classify(err: &DbErr) -> DbFailure {
    if matches!(err, DbErr::ConnectionAcquire(_) | DbErr::Conn(_)) {
        return DbFailure::Unavailable;
    }
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return DbFailure::Duplicate(duplicate_message(&detail));
    }
    if sqlstate(err).as_deref() == Some(INVALID_REGULAR_EXPRESSION) {
        return DbFailure::BadSearchPattern;
    }
    DbFailure::Other
}

fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db)))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db))) => {
            db.code().map(|code| code.into_owned())
        }
        _ => None,
    }
}

/// `users.email` is the only unique key a client can collide with on purpose.
fn duplicate_message(detail: &str) -> &'static str {
    if detail.contains("users_email_key") {
        "Email is already taken"
    } else {
        "Resource already exists"
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_)
            | AppError::Validation(_)
            | AppError::Json(_)
            | AppError::Query(_)
            | AppError::Path(_)
            | AppError::MultipartRejection(_)
            | AppError::Multipart(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::OrmError(err) => match classify(err) {
                DbFailure::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                DbFailure::Duplicate(_) | DbFailure::BadSearchPattern => StatusCode::BAD_REQUEST,
                DbFailure::Other => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_message(&self) -> String {
        match self {
            AppError::Json(rejection) => rejection.body_text(),
            AppError::Query(rejection) => rejection.body_text(),
            AppError::Path(rejection) => rejection.body_text(),
            AppError::MultipartRejection(rejection) => rejection.body_text(),
            AppError::Multipart(err) => err.body_text(),
            AppError::OrmError(err) => match classify(err) {
                DbFailure::Unavailable => "Database unavailable".to_string(),
                DbFailure::Duplicate(message) => message.to_string(),
                DbFailure::BadSearchPattern => "Invalid search pattern".to_string(),
                DbFailure::Other => self.to_string(),
            },
            _ => self.to_string(),
        }
    }
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| issue.code.to_string()),
            })
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, status = %status, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }

        let message = self.client_message();
        let errors = match &self {
            AppError::Validation(errors) => Some(field_errors(errors)),
            _ => None,
        };

        let body = ErrorResponse { message, errors };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
