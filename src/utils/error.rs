// src/utils/error.rs

use crate::services::core::infrastructure::cache::CacheBackendError;
use crate::services::core::infrastructure::data_store::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Custom error details for additional context
pub type ErrorDetails = HashMap<String, serde_json::Value>;

/// Main error type for the analytics engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsError {
    pub message: String,
    pub details: Option<Box<ErrorDetails>>, // Boxed to reduce struct size
    pub status: Option<u16>,
    pub error_code: Option<String>,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    #[default]
    Internal,
    InvalidRange,
    InsufficientData,
    UpstreamStore,
    CacheError,
    SerializationError,
    ValidationError,
}

impl fmt::Display for AnalyticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AnalyticsError {}

impl AnalyticsError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
            status: None,
            error_code: None,
            kind,
        }
    }

    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = Some(Box::new(details));
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    // Convenience constructors for common error types
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRange, message)
            .with_status(400)
            .with_code("INVALID_RANGE")
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
            .with_status(400)
            .with_code("VALIDATION_ERROR")
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientData, message)
            .with_status(422)
            .with_code("INSUFFICIENT_DATA")
    }

    pub fn storage_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamStore, message)
            .with_status(502)
            .with_code("UPSTREAM_STORE_ERROR")
    }

    pub fn cache_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CacheError, message)
            .with_status(500)
            .with_code("CACHE_ERROR")
    }

    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SerializationError, message)
            .with_status(500)
            .with_code("SERIALIZATION_ERROR")
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SerializationError, message)
            .with_status(400)
            .with_code("PARSE_ERROR")
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
            .with_status(500)
            .with_code("INTERNAL_ERROR")
    }
}

// From conversions for collaborator error types

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        AnalyticsError::parse_error(format!("JSON parsing error: {}", err))
    }
}

impl From<String> for AnalyticsError {
    fn from(err: String) -> Self {
        Self::validation_error(err)
    }
}

impl From<&str> for AnalyticsError {
    fn from(err: &str) -> Self {
        Self::validation_error(err.to_string())
    }
}

impl From<StoreError> for AnalyticsError {
    fn from(err: StoreError) -> Self {
        // Upstream store errors propagate unchanged in meaning; retry policy
        // belongs to the store collaborator, not the engine.
        let mut details = ErrorDetails::new();
        details.insert(
            "source".to_string(),
            serde_json::Value::String("data_store".to_string()),
        );
        AnalyticsError::storage_error(err.to_string()).with_details(details)
    }
}

impl From<CacheBackendError> for AnalyticsError {
    fn from(err: CacheBackendError) -> Self {
        match err {
            CacheBackendError::Serialization(e) => {
                AnalyticsError::serialization_error(format!("Cache serialization error: {}", e))
            }
            other => AnalyticsError::cache_error(other.to_string()),
        }
    }
}
