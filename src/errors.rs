use axum::http::StatusCode;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Failures of habit, task and rule operations, before they are mapped onto HTTP.
#[derive(Debug, Error)]
pub enum HabitError {
    #[error("{0}")]
    Validation(String),
    #[error("habit {0} not found")]
    NotFound(Uuid),
    #[error("task {0} not found")]
    TaskNotFound(Uuid),
    #[error("task {task} has no subtask {index}")]
    SubtaskNotFound { task: Uuid, index: usize },
    #[error("rule '{0}' not found")]
    RuleNotFound(String),
    #[error("a rule named '{0}' already exists")]
    DuplicateRule(String),
    #[error("habit is not scheduled on {date}")]
    NotScheduled { date: NaiveDate },
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl HabitError {
    /// The addressed record does not exist (any more).
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            HabitError::NotFound(_)
                | HabitError::TaskNotFound(_)
                | HabitError::SubtaskNotFound { .. }
                | HabitError::RuleNotFound(_)
        )
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<HabitError> for AppError {
    fn from(err: HabitError) -> Self {
        match err {
            HabitError::Validation(message) => Self::bad_request(message),
            HabitError::NotFound(_)
            | HabitError::TaskNotFound(_)
            | HabitError::SubtaskNotFound { .. }
            | HabitError::RuleNotFound(_) => Self::not_found(err.to_string()),
            HabitError::NotScheduled { .. } | HabitError::DuplicateRule(_) => {
                Self::conflict(err.to_string())
            }
            HabitError::Storage(_) => Self::internal(err),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
