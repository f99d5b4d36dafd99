// src/types.rs
// Caller-facing response envelope shared by every analytics operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::core::analytics::period::PeriodType;
use crate::utils::AnalyticsError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub request_id: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_type: Option<PeriodType>,
}

impl ResponseMetadata {
    pub fn new() -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            period_type: None,
        }
    }

    pub fn with_period_type(mut self, period_type: PeriodType) -> Self {
        self.period_type = Some(period_type);
        self
    }
}

impl Default for ResponseMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform result shape for analytics queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> AnalyticsResponse<T> {
    pub fn ok(data: T, cached: bool, metadata: ResponseMetadata) -> Self {
        Self {
            success: true,
            data: Some(data),
            cached,
            metadata: Some(metadata),
            error: None,
        }
    }

    pub fn failure(err: &AnalyticsError) -> Self {
        Self {
            success: false,
            data: None,
            cached: false,
            metadata: Some(ResponseMetadata::new()),
            error: Some(err.to_string()),
        }
    }
}

impl<T> From<AnalyticsError> for AnalyticsResponse<T> {
    fn from(err: AnalyticsError) -> Self {
        Self::failure(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_shape() {
        let err = AnalyticsError::invalid_range("bad window");
        let resp: AnalyticsResponse<u32> = AnalyticsResponse::failure(&err);
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(resp.error.as_deref(), Some("bad window"));
    }

    #[test]
    fn test_ok_carries_metadata() {
        let resp = AnalyticsResponse::ok(42u32, true, ResponseMetadata::new());
        assert!(resp.success);
        assert!(resp.cached);
        assert!(resp.metadata.unwrap().request_id.len() > 10);
    }
}
