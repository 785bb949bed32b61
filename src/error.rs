//! Error types for lead lifecycle operations
//!
//! Errors are classified by recoverability:
//! - Retryable: gateway unreachable, malformed gateway reply
//! - NonRetryable: precondition violations, unknown leads
//! - RequiresUserAction: missing or rejected API credential, unwritable lead store

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::storage::StorageError;
use crate::types::LeadStatus;

/// Error types for qualification and approval
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Lead not found: {0}")]
    LeadNotFound(String),

    #[error("Lead {id} is {actual}, expected {expected}")]
    PreconditionViolation {
        id: String,
        expected: LeadStatus,
        actual: LeadStatus,
    },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Leads were not saved: {0}")]
    Persistence(#[from] StorageError),
}

impl PipelineError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Gateway(e) => !e.requires_user_action(),
            _ => false,
        }
    }

    /// Returns true if this error requires user action to resolve
    pub fn requires_user_action(&self) -> bool {
        match self {
            PipelineError::Gateway(e) => e.requires_user_action(),
            PipelineError::Persistence(_) => true,
            _ => false,
        }
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PipelineError::LeadNotFound(_) => "The lead was removed. Refresh the lead list.",
            PipelineError::PreconditionViolation { .. } => {
                "The lead is not in a state that allows this action."
            }
            PipelineError::Gateway(GatewayError::MissingApiKey) => {
                "Set API_KEY or gateway.apiKey in ~/.linkpulse/config.json."
            }
            PipelineError::Gateway(GatewayError::Unauthorized(_)) => {
                "The AI service rejected the API key. Check it and try again."
            }
            PipelineError::Gateway(GatewayError::Network(_))
            | PipelineError::Gateway(GatewayError::Unavailable { .. }) => {
                "Check your internet connection and try again."
            }
            PipelineError::Gateway(GatewayError::EmptyReply)
            | PipelineError::Gateway(GatewayError::Malformed(_)) => {
                "The AI returned an unusable answer. Try qualifying again."
            }
            PipelineError::Persistence(_) => {
                "Check that the data directory exists and is writable."
            }
        }
    }
}

/// Serializable error representation for UI collaborators
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub message: String,
    pub error_type: ErrorType,
    pub can_retry: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorType {
    Retryable,
    NonRetryable,
    RequiresUserAction,
}

impl From<&PipelineError> for ErrorReport {
    fn from(err: &PipelineError) -> Self {
        let error_type = if err.requires_user_action() {
            ErrorType::RequiresUserAction
        } else if err.is_retryable() {
            ErrorType::Retryable
        } else {
            ErrorType::NonRetryable
        };

        ErrorReport {
            message: err.to_string(),
            error_type,
            can_retry: err.is_retryable(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_network_error_is_retryable() {
        let err = PipelineError::from(GatewayError::Network("connection reset".into()));
        assert!(err.is_retryable());
        assert!(!err.requires_user_action());

        let report = ErrorReport::from(&err);
        assert_eq!(report.error_type, ErrorType::Retryable);
        assert!(report.can_retry);
    }

    #[test]
    fn test_missing_key_requires_user_action() {
        let err = PipelineError::from(GatewayError::MissingApiKey);
        assert!(!err.is_retryable());
        assert_eq!(ErrorReport::from(&err).error_type, ErrorType::RequiresUserAction);
    }

    #[test]
    fn test_precondition_is_not_retryable() {
        let err = PipelineError::PreconditionViolation {
            id: "lead-1".into(),
            expected: LeadStatus::WaitingApproval,
            actual: LeadStatus::New,
        };
        let report = ErrorReport::from(&err);
        assert_eq!(report.error_type, ErrorType::NonRetryable);
        assert!(!report.can_retry);
        assert_eq!(report.message, "Lead lead-1 is NEW, expected WAITING_APPROVAL");
    }

    #[test]
    fn test_persistence_failure_requires_user_action() {
        let err = PipelineError::from(StorageError::Io {
            path: "/readonly/linkpulse_leads.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert!(!err.is_retryable());
        let report = ErrorReport::from(&err);
        assert_eq!(report.error_type, ErrorType::RequiresUserAction);
        assert!(report.message.starts_with("Leads were not saved"));
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let err = PipelineError::from(GatewayError::Malformed("score missing".into()));
        let json = serde_json::to_value(ErrorReport::from(&err)).unwrap();
        assert_eq!(json["errorType"], "retryable");
        assert_eq!(json["canRetry"], true);
        assert!(json["recoverySuggestion"].is_string());
    }
}
