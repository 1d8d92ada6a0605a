use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("goal not found: {0}")]
    GoalNotFound(String),

    #[error("objective not found: {0}")]
    ObjectiveNotFound(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("milestone not found: {0}")]
    MilestoneNotFound(String),

    #[error("plan not found: {0}")]
    PlanNotFound(String),

    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("week offset out of range: {0}")]
    WeekOutOfRange(i64),

    #[error("invalid thresholds: green ({green}) must be at least yellow ({yellow})")]
    InvalidThresholds { green: i64, yellow: i64 },
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

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::GoalNotFound(_)
            | TrackerError::ObjectiveNotFound(_)
            | TrackerError::TaskNotFound(_)
            | TrackerError::MilestoneNotFound(_)
            | TrackerError::PlanNotFound(_) => Self::not_found(err.to_string()),
            _ => Self::bad_request(err.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
