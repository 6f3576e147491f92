//! Error types for ScholarFlow services
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for workflow, payment, and request failures
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    MissingField,
    InvalidFormat,

    // Authorization errors (3xxx)
    Forbidden,
    RoleMismatch,

    // Resource errors (4xxx)
    NotFound,
    ManuscriptNotFound,
    RoundNotFound,
    ReviewerNotFound,

    // Workflow conflicts (5xxx)
    IllegalTransition,
    IncompleteReviews,
    DuplicateReview,
    RoundClosed,
    RoundOpen,

    // Rate limiting (6xxx)
    RateLimited,

    // Payment errors (7xxx)
    AlreadyPaid,
    VerificationFailed,
    GatewayError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingField => 1002,
            ErrorCode::InvalidFormat => 1003,

            // Authz (3xxx)
            ErrorCode::Forbidden => 3001,
            ErrorCode::RoleMismatch => 3002,

            // Resources (4xxx)
            ErrorCode::NotFound => 4001,
            ErrorCode::ManuscriptNotFound => 4002,
            ErrorCode::RoundNotFound => 4003,
            ErrorCode::ReviewerNotFound => 4004,

            // Workflow conflicts (5xxx)
            ErrorCode::IllegalTransition => 5001,
            ErrorCode::IncompleteReviews => 5002,
            ErrorCode::DuplicateReview => 5003,
            ErrorCode::RoundClosed => 5004,
            ErrorCode::RoundOpen => 5005,

            // Rate limits (6xxx)
            ErrorCode::RateLimited => 6001,

            // Payments (7xxx)
            ErrorCode::AlreadyPaid => 7001,
            ErrorCode::VerificationFailed => 7002,
            ErrorCode::GatewayError => 7003,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    // Authorization errors
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Requires role: {required}")]
    RoleMismatch { required: String },

    // Resource errors
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    #[error("Manuscript not found: {id}")]
    ManuscriptNotFound { id: String },

    #[error("Round {round} not found")]
    RoundNotFound { round: u32 },

    #[error("Reviewer {id} is not assigned to this round")]
    ReviewerNotFound { id: String },

    // Workflow conflicts
    #[error("Illegal transition: cannot move from '{from}' to '{attempted}'")]
    IllegalTransition { from: String, attempted: String },

    #[error("Round {round} cannot close: {pending} review(s) still incomplete")]
    IncompleteReviews { round: u32, pending: usize },

    #[error("Reviewer {reviewer_id} already submitted a review for round {round}")]
    DuplicateReview { reviewer_id: String, round: u32 },

    #[error("Round {round} already has an aggregate decision")]
    RoundClosed { round: u32 },

    #[error("Round {round} is still open")]
    RoundOpen { round: u32 },

    // Rate limiting
    #[error("Rate limit exceeded: {limit} requests per second")]
    RateLimited { limit: u32 },

    // Payment errors
    #[error("Manuscript {manuscript_id} already has a verified payment")]
    AlreadyPaid { manuscript_id: String },

    #[error("Payment verification failed: {message}")]
    VerificationFailed { message: String },

    #[error("Payment gateway error: {message}")]
    GatewayError { message: String },

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::Forbidden { .. } => ErrorCode::Forbidden,
            AppError::RoleMismatch { .. } => ErrorCode::RoleMismatch,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::ManuscriptNotFound { .. } => ErrorCode::ManuscriptNotFound,
            AppError::RoundNotFound { .. } => ErrorCode::RoundNotFound,
            AppError::ReviewerNotFound { .. } => ErrorCode::ReviewerNotFound,
            AppError::IllegalTransition { .. } => ErrorCode::IllegalTransition,
            AppError::IncompleteReviews { .. } => ErrorCode::IncompleteReviews,
            AppError::DuplicateReview { .. } => ErrorCode::DuplicateReview,
            AppError::RoundClosed { .. } => ErrorCode::RoundClosed,
            AppError::RoundOpen { .. } => ErrorCode::RoundOpen,
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
            AppError::AlreadyPaid { .. } => ErrorCode::AlreadyPaid,
            AppError::VerificationFailed { .. } => ErrorCode::VerificationFailed,
            AppError::GatewayError { .. } => ErrorCode::GatewayError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. }
            | AppError::MissingField { .. }
            | AppError::InvalidFormat { .. } => StatusCode::BAD_REQUEST,

            // 402 Payment Required
            AppError::VerificationFailed { .. } => StatusCode::PAYMENT_REQUIRED,

            // 403 Forbidden
            AppError::Forbidden { .. } | AppError::RoleMismatch { .. } => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::NotFound { .. }
            | AppError::ManuscriptNotFound { .. }
            | AppError::RoundNotFound { .. }
            | AppError::ReviewerNotFound { .. } => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::IllegalTransition { .. }
            | AppError::IncompleteReviews { .. }
            | AppError::DuplicateReview { .. }
            | AppError::RoundClosed { .. }
            | AppError::RoundOpen { .. }
            | AppError::AlreadyPaid { .. } => StatusCode::CONFLICT,

            // 429 Too Many Requests
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::GatewayError { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Whether the caller may usefully retry the same request later
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::IncompleteReviews { .. }
                | AppError::VerificationFailed { .. }
                | AppError::RateLimited { .. }
                | AppError::GatewayError { .. }
        )
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let recoverable = self.is_recoverable();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                recoverable,
                details: None,
                request_id: None, // Should be filled by middleware
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}
