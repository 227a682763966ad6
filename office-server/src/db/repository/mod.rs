//! Repository Module
//!
//! Free functions over `&SqlitePool` (or an open transaction) per table.
//! Joins that the API needs are explicit functions (`find_detail`,
//! `list_with_employee`, ...).

// Accounts
pub mod employee;
pub mod leave;
pub mod user;

// Attendance and requests
pub mod attendance;
pub mod request;

// Projects
pub mod comment;
pub mod project;
pub mod ticket;

// Communication
pub mod announcement;
pub mod event;
pub mod notification;
pub mod outbox;

// Appraisals
pub mod appraisal;
pub mod review;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Open transaction handle used by multi-table writes
pub type Tx<'a> = sqlx::Transaction<'a, sqlx::Sqlite>;

pub async fn begin(pool: &sqlx::SqlitePool) -> RepoResult<Tx<'static>> {
    Ok(pool.begin().await?)
}

pub async fn commit(tx: Tx<'_>) -> RepoResult<()> {
    Ok(tx.commit().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_errors_map_to_http_statuses() {
        let not_found: AppError = RepoError::NotFound("Request 1".into()).into();
        assert_eq!(not_found.http_status(), http::StatusCode::NOT_FOUND);

        let duplicate: AppError = RepoError::Duplicate("email".into()).into();
        assert_eq!(duplicate.http_status(), http::StatusCode::CONFLICT);

        let invalid: AppError = RepoError::Validation("bad".into()).into();
        assert_eq!(invalid.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        assert!(matches!(
            RepoError::from(sqlx::Error::RowNotFound),
            RepoError::NotFound(_)
        ));
    }
}
