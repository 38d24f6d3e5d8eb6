use crate::domain::model::{ErrorPayload, FieldError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("Request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Service reported failure: {}", message.as_deref().unwrap_or("no message"))]
    ServiceError { message: Option<String> },

    #[error("Service rejected {} field(s)", errors.len())]
    ValidationError { errors: Vec<FieldError> },

    #[error("Collaborator unavailable: {name}")]
    CollaboratorUnavailable { name: String },

    #[error("Invalid {field} input: {value:?}")]
    InputParseError { field: String, value: String },

    #[error("A submission is already in progress")]
    SubmitInProgress,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: {value:?} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 錯誤分類，對應各種 UI 呈現方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    TransportFailure,
    ServiceFailure,
    ValidationFailure,
    CollaboratorUnavailable,
    InputParseFailure,
    Busy,
    Configuration,
}

impl WidgetError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WidgetError::TransportError(_)
            | WidgetError::SerializationError(_)
            | WidgetError::IoError(_) => ErrorCategory::TransportFailure,
            WidgetError::ServiceError { .. } => ErrorCategory::ServiceFailure,
            WidgetError::ValidationError { .. } => ErrorCategory::ValidationFailure,
            WidgetError::CollaboratorUnavailable { .. } => ErrorCategory::CollaboratorUnavailable,
            WidgetError::InputParseError { .. } => ErrorCategory::InputParseFailure,
            WidgetError::SubmitInProgress => ErrorCategory::Busy,
            WidgetError::ConfigError { .. }
            | WidgetError::MissingConfigError { .. }
            | WidgetError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    /// 服務端回傳的錯誤內容（單一訊息或欄位錯誤）
    pub fn payload(&self) -> Option<ErrorPayload> {
        match self {
            WidgetError::ServiceError {
                message: Some(message),
            } => Some(ErrorPayload::SingleMessage(message.clone())),
            WidgetError::ValidationError { errors } => {
                Some(ErrorPayload::FieldErrors(errors.clone()))
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WidgetError>;
