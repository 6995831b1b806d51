// Error handling framework

use thiserror::Error;
use uuid::Uuid;

/// Duration parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("Invalid duration format '{0}'. Use e.g. '1d2h30m', '90m', '3h' or '90'")]
    InvalidFormat(String),

    #[error("Duration '{0}' is too large")]
    OutOfRange(String),

    #[error("Duration '{0}' must be greater than zero")]
    NotPositive(String),
}

/// Validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field value for {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },

    #[error(transparent)]
    Duration(#[from] DurationError),
}

/// Database-specific errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Database health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Timer store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Timer not found: {0}")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// OCR provider errors
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR provider is not configured")]
    NotConfigured,

    #[error("OCR request failed: {0}")]
    Request(String),

    #[error("OCR provider returned an error: {0}")]
    Provider(String),

    #[error("Failed to decode OCR response: {0}")]
    Decode(String),

    #[error("No text recognized in image")]
    EmptyRecognition,
}

/// Notification channel errors
///
/// Channels log these and report a plain delivery failure to the scheduler.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("Channel rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Errors surfaced by timer service entry points
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ocr(#[from] OcrError),
}

impl From<DurationError> for ServiceError {
    fn from(err: DurationError) -> Self {
        ServiceError::Validation(ValidationError::Duration(err))
    }
}

/// API response error type for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let code = match &err {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::Store(StoreError::NotFound(_)) => "not_found",
            ServiceError::Store(_) => "database_error",
            ServiceError::Ocr(OcrError::NotConfigured) => "ocr_not_configured",
            ServiceError::Ocr(_) => "ocr_error",
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DatabaseError::QueryFailed(db_err.message().to_string()),
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<reqwest::Error> for ChannelError {
    fn from(err: reqwest::Error) -> Self {
        ChannelError::Request(err.to_string())
    }
}

impl From<reqwest::Error> for OcrError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            OcrError::Decode(err.to_string())
        } else {
            OcrError::Request(err.to_string())
        }
    }
}
