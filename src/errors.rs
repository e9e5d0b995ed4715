use axum::http::StatusCode;

pub const INVALID_GOAL_MESSAGE: &str = "Goal must be greater than 0!";

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("invalid goal input {input:?}")]
    InvalidGoal { input: String },

    #[error("stored snapshot is corrupt: {reason}")]
    PersistenceCorrupt { reason: String },
}

impl TrackerError {
    pub fn corrupt(reason: impl std::fmt::Display) -> Self {
        Self::PersistenceCorrupt {
            reason: reason.to_string(),
        }
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

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err)
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::InvalidGoal { .. } => Self::bad_request(INVALID_GOAL_MESSAGE),
            TrackerError::PersistenceCorrupt { .. } => Self::internal(err),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
