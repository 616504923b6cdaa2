use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidInput,
    UnrecognizedSignal,
    Internal,
}

/// Rejections surfaced by screen commands. None of them changes state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreenError {
    #[error("invalid interval {raw:?}: expected whole milliseconds >= 1")]
    InvalidInterval { raw: String },
    #[error("unrecognized lifecycle signal {name:?}")]
    UnrecognizedSignal { name: String },
    #[error("no tokio runtime available to drive {task}")]
    NoRuntime { task: &'static str },
}

impl ScreenError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ScreenError::InvalidInterval { .. } => ErrorCode::InvalidInput,
            ScreenError::UnrecognizedSignal { .. } => ErrorCode::UnrecognizedSignal,
            ScreenError::NoRuntime { .. } => ErrorCode::Internal,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&ScreenError> for ErrorReport {
    fn from(value: &ScreenError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}
