use serde::Serialize;

use crate::error_handling::types::SessionError;
use crate::protocol::SampleField;

/// API error payload
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of a 422: a value outside its physical range.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFault {
    pub message: String,
    pub field_name: SampleField,
    pub invalid_value: f64,
    pub expected_range: String,
}

/// Body of a 400: a structurally broken sample.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFormatFault {
    pub message: String,
    pub details: String,
    pub field_name: SampleField,
}

impl ValidationFault {
    pub fn from_error(err: &SessionError) -> Option<Self> {
        match err {
            SessionError::ValidationFailed {
                field,
                invalid_value,
                expected_range,
            } => Some(Self {
                message: err.to_string(),
                field_name: *field,
                invalid_value: *invalid_value,
                expected_range: expected_range.to_string(),
            }),
            _ => None,
        }
    }
}

impl DataFormatFault {
    pub fn from_error(err: &SessionError) -> Option<Self> {
        match err {
            SessionError::MalformedSample { field, details } => Some(Self {
                message: err.to_string(),
                details: details.clone(),
                field_name: *field,
            }),
            _ => None,
        }
    }
}
