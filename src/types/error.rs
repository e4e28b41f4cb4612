//! Unified Error Type System
//!
//! Centralized error types for the whole crate.
//!
//! ## Session-scoped Error Kinds
//!
//! - **Validation**: malformed input or customization, recovered locally
//! - **GenerationFailure**: the content service failed or returned malformed data
//! - **EntitlementLookupFailure**: subscription lookup failed, gate stays blocked
//! - **StaleSelection**: a selection no longer matches the pipeline state
//!
//! No error is fatal to the process; every failure is scoped to one session.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::pipeline::StageKind;

// =============================================================================
// Error Categories
// =============================================================================

/// Provider error categories, derived from transport status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited by the provider
    RateLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Provider unavailable or model missing
    Unavailable,
    /// Invalid request
    BadRequest,
    /// Reply could not be parsed into the expected shape
    ParseError,
    /// Temporary server issues
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Whether a user-triggered retry of the same stage is likely to succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit | Self::Network | Self::Transient | Self::ParseError
        )
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Categorised error raised by an LLM provider
#[derive(Debug, Clone)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    /// Create error with provider context
    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }

}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps transport-level failures onto [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code returned by a provider
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => ErrorCategory::BadRequest,
            404 => ErrorCategory::Unavailable,
            500 | 502 | 503 | 504 => ErrorCategory::Transient,
            _ => ErrorCategory::Unknown,
        };
        LlmError::with_provider(category, message, provider)
    }

    /// Classify a `reqwest` transport error
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        let category = if err.is_timeout() || err.is_connect() {
            ErrorCategory::Network
        } else if err.is_decode() {
            ErrorCategory::ParseError
        } else if let Some(status) = err.status() {
            return Self::classify_http_status(status.as_u16(), &err.to_string(), provider);
        } else {
            ErrorCategory::Unknown
        };
        LlmError::with_provider(category, err.to_string(), provider)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level validation failure
///
/// `field` holds the wire (camelCase) name so UI clients can attach the
/// message to the right form control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation failed for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn new(
        kind: ValidationErrorKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Required value is blank
    pub fn missing(field: &str) -> Self {
        Self::new(
            ValidationErrorKind::MissingField,
            field,
            "value is required",
        )
    }

    /// Value present but malformed
    pub fn format(field: &str, message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::Format, field, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationErrorKind {
    /// Required field missing or blank
    MissingField,
    /// Invalid format
    Format,
}

// =============================================================================
// Application Error
// =============================================================================

/// Coarse error kinds surfaced to the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    GenerationFailure,
    EntitlementLookupFailure,
    StaleSelection,
    /// Transition attempted from a stage that does not allow it
    InvalidTransition,
    /// Another transition is still in flight
    Busy,
    /// Configuration, filesystem or serialization problems outside a session
    Environment,
}

#[derive(Debug, Error)]
pub enum LeadError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Collaborator Errors
    // -------------------------------------------------------------------------
    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("Generation failed during {stage}: {message}")]
    Generation {
        stage: StageKind,
        message: String,
        /// Provider category of the underlying failure, when one is known
        category: Option<ErrorCategory>,
    },

    #[error("Entitlement lookup failed: {0}")]
    EntitlementLookup(String),

    #[error("Operation timed out after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    Validation(ValidationError),

    #[error("Stale selection: {0}")]
    StaleSelection(String),

    #[error("Cannot {action} while in {stage}")]
    InvalidTransition { stage: StageKind, action: &'static str },

    #[error("Another pipeline transition is still in progress")]
    Busy,

    // -------------------------------------------------------------------------
    // Environment Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),
}

impl From<LlmError> for LeadError {
    fn from(err: LlmError) -> Self {
        LeadError::Llm(err)
    }
}

impl From<ValidationError> for LeadError {
    fn from(err: ValidationError) -> Self {
        LeadError::Validation(err)
    }
}

pub type Result<T> = std::result::Result<T, LeadError>;

impl LeadError {
    /// Create a generation failure for the given stage
    pub fn generation(stage: StageKind, message: impl Into<String>) -> Self {
        Self::Generation {
            stage,
            message: message.into(),
            category: None,
        }
    }

    /// Wrap a collaborator failure as a generation failure, keeping its provider category
    pub fn generation_from(stage: StageKind, message: impl Into<String>, source: &LeadError) -> Self {
        Self::Generation {
            stage,
            message: message.into(),
            category: source.source_category(),
        }
    }

    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Generation { .. } | Self::Llm(_) | Self::Timeout { .. } => {
                ErrorKind::GenerationFailure
            }
            Self::EntitlementLookup(_) => ErrorKind::EntitlementLookupFailure,
            Self::StaleSelection(_) => ErrorKind::StaleSelection,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::Busy => ErrorKind::Busy,
            Self::Io(_) | Self::Json(_) | Self::Config(_) => ErrorKind::Environment,
        }
    }

    /// Provider category behind a generation failure
    pub fn source_category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Generation { category, .. } => *category,
            Self::Llm(e) => Some(e.category),
            Self::Timeout { .. } => Some(ErrorCategory::Network),
            _ => None,
        }
    }

    /// Whether repeating the failed step unchanged can succeed
    ///
    /// Uncategorised generation failures count as retryable; auth and
    /// bad-request failures never do.
    pub fn is_retryable(&self) -> bool {
        match self.kind() {
            ErrorKind::GenerationFailure => self
                .source_category()
                .is_none_or(|category| category.is_retryable()),
            ErrorKind::EntitlementLookupFailure => true,
            _ => false,
        }
    }

    /// Whether the user can recover within the same session
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Environment)
    }

    /// Field name for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation(e) => Some(&e.field),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
