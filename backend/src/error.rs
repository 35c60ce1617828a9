//! Error types for ingestion, aggregation and query operations.
//!
//! Row-level parse failures ([`MalformedRecord`]) are recovered inside the ingestor and
//! never escape it. Everything a caller can observe is an [`AnalyzerError`].

use std::fmt;

/// Result type for analyzer operations
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Structured context for analyzer errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "ingest", "location_totals")
    pub operation: Option<String>,
    /// The entity type involved (e.g., "subject", "month", "source")
    pub entity: Option<String>,
    /// The entity ID if applicable
    pub entity_id: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the entity type.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Set the entity ID.
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref entity) = self.entity {
            parts.push(format!("entity={}", entity));
        }
        if let Some(ref id) = self.entity_id {
            parts.push(format!("id={}", id));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for analyzer operations
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// The attendance source could not be opened or read.
    /// Never retried internally.
    #[error("Source unavailable: {message} {context}")]
    SourceUnavailable {
        message: String,
        context: ErrorContext,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A requested subject or month is not present in the ingested data.
    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },
}

impl AnalyzerError {
    /// Create a source-unavailable error from an I/O failure.
    pub fn source_unavailable(path: impl fmt::Display, err: std::io::Error) -> Self {
        Self::SourceUnavailable {
            message: err.to_string(),
            context: ErrorContext::new("ingest")
                .with_entity("source")
                .with_entity_id(path),
            source: Some(err),
        }
    }

    /// Create a source-unavailable error without an underlying I/O error.
    pub fn source_unavailable_msg(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
            context,
            source: None,
        }
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a not found error with context.
    pub fn not_found_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Whether this error signals an absent subject or month.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::SourceUnavailable { context, .. } => context,
            Self::NotFound { context, .. } => context,
            Self::ConfigurationError { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        match &mut self {
            Self::SourceUnavailable { context, .. }
            | Self::NotFound { context, .. }
            | Self::ConfigurationError { context, .. } => {
                context.operation = Some(operation.into());
            }
        }
        self
    }
}

/// A data-shaped row whose fields could not be parsed.
///
/// Carries the offending field name and a reason, never the raw row contents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {field}: {reason}")]
pub struct MalformedRecord {
    pub field: &'static str,
    pub reason: String,
}

impl MalformedRecord {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
