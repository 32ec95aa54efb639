//! Unified error handling for the alcalor crate
//!
//! This module provides a unified error type that consolidates all
//! domain-specific errors into a single `Error` enum, while maintaining the
//! ability to use domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`AlcalorErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use alcalor::error::{AlcalorErrorTrait, Error};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         eprintln!("Retry later: {}", err.localized_desc());
//!     } else {
//!         eprintln!("Fatal error: {}", err);
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::analytics::{InvalidParameterError, TokenizationError};
pub use crate::storage::QueryError;

/// Common trait for all alcalor error types
pub trait AlcalorErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get localized description for user-facing messages
    fn localized_desc(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Archive queries and connections
    Query,
    /// Malformed analysis requests
    Parameter,
    /// Document text that could not be tokenized
    Tokenization,
    /// Report rendering and output files
    Report,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get localized description for the category
    pub fn localized_desc(&self) -> String {
        match self {
            Self::Query => crate::i18n::t!("errors.category.query").to_string(),
            Self::Parameter => crate::i18n::t!("errors.category.parameter").to_string(),
            Self::Tokenization => crate::i18n::t!("errors.category.tokenization").to_string(),
            Self::Report => crate::i18n::t!("errors.category.report").to_string(),
            Self::Config => crate::i18n::t!("errors.category.config").to_string(),
            Self::Other => crate::i18n::t!("errors.category.other").to_string(),
        }
    }
}

impl AlcalorErrorTrait for QueryError {
    fn is_recoverable(&self) -> bool {
        self.is_transient()
    }

    fn localized_desc(&self) -> String {
        let key = match self {
            Self::Postgres(_) | Self::Pool(_) | Self::Sqlite(_) | Self::Connection(_) => {
                crate::i18n::t!("errors.query.backend")
            }
            Self::MissingColumn(_)
            | Self::TypeMismatch { .. }
            | Self::UnsupportedType { .. }
            | Self::InvalidValue { .. } => crate::i18n::t!("errors.query.column"),
        };
        format!("{key}: {self}")
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Query
    }
}

impl AlcalorErrorTrait for InvalidParameterError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn localized_desc(&self) -> String {
        format!("{}: {self}", crate::i18n::t!("errors.parameter.invalid"))
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Parameter
    }
}

impl AlcalorErrorTrait for TokenizationError {
    fn is_recoverable(&self) -> bool {
        // The batch goes on without the document
        true
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::InvalidEncoding { document_id } => crate::i18n::t!(
                "errors.tokenization.invalid_encoding",
                id = document_id
            )
            .to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Tokenization
    }
}

/// Unified error type for the alcalor crate
#[derive(Error, Debug)]
pub enum Error {
    /// Archive query errors, surfaced unmodified
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Rejected analysis parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] InvalidParameterError),

    /// Per-document tokenization failure
    #[error("Tokenization error: {0}")]
    Tokenization(#[from] TokenizationError),

    /// Report template errors
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    /// Report rendering errors
    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AlcalorErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Query(e) => e.is_recoverable(),
            Self::InvalidParameter(e) => e.is_recoverable(),
            Self::Tokenization(e) => e.is_recoverable(),
            Self::Io(_) => true, // I/O errors are often transient
            Self::Template(_) | Self::Render(_) | Self::Json(_) => false,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::Query(e) => e.localized_desc(),
            Self::InvalidParameter(e) => e.localized_desc(),
            Self::Tokenization(e) => e.localized_desc(),
            Self::Template(e) => format!("{}: {e}", crate::i18n::t!("errors.report.template")),
            Self::Render(e) => format!("{}: {e}", crate::i18n::t!("errors.report.render")),
            Self::Io(e) => format!("{}: {e}", crate::i18n::t!("errors.io.error")),
            Self::Json(e) => format!("{}: {e}", crate::i18n::t!("errors.json.error")),
            Self::Config(msg) => format!("{}: {msg}", crate::i18n::t!("errors.config.error")),
            Self::Other { context, .. } => context.clone(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Query(_) => ErrorCategory::Query,
            Self::InvalidParameter(_) => ErrorCategory::Parameter,
            Self::Tokenization(_) => ErrorCategory::Tokenization,
            Self::Template(_) | Self::Render(_) | Self::Io(_) | Self::Json(_) => {
                ErrorCategory::Report
            }
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
