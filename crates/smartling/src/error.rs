//! Client error types.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of a vendor error list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub key: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl fmt::Display for ApiErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// Error type for vendor API operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network-level failure, including timeouts.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response was not JSON or did not match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The vendor returned a well-formed error envelope.
    #[error("Request failed ({status}): {code}{}", format_errors(.errors))]
    FailedResponse {
        status: u16,
        code: String,
        errors: Vec<ApiErrorDetail>,
    },

    /// A job lookup returned `NOT_FOUND_ERROR`.
    #[error("Job {0} not found")]
    JobNotFound(String),

    /// The request could not be built from the given arguments.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The translations archive could not be read.
    #[error("Archive error: {0}")]
    Archive(String),
}

impl ClientError {
    /// Vendor error code, when the vendor returned one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::FailedResponse { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<zip::result::ZipError> for ClientError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

fn format_errors(errors: &[ApiErrorDetail]) -> String {
    errors.iter().fold(String::new(), |mut out, e| {
        out.push_str("\n  ");
        out.push_str(&e.to_string());
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_response_display() {
        let err = ClientError::FailedResponse {
            status: 400,
            code: "VALIDATION_ERROR".to_string(),
            errors: vec![ApiErrorDetail {
                key: "jobName".to_string(),
                message: "Job name is already taken".to_string(),
                details: None,
            }],
        };

        assert_eq!(err.code(), Some("VALIDATION_ERROR"));
        assert_eq!(
            err.to_string(),
            "Request failed (400): VALIDATION_ERROR\n  jobName: Job name is already taken"
        );
    }

    #[test]
    fn test_code_absent_for_other_errors() {
        assert_eq!(ClientError::InvalidResponse("x".to_string()).code(), None);
    }
}
