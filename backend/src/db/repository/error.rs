//! Error types for repository operations.
//!
//! Storage failures carry an [`ErrorContext`] naming the operation, the catalog
//! or collection involved and, where there is one, the offending record name.

use std::fmt;
use std::path::Path;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Where a repository error happened.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Repository operation, e.g. `insert_pulsar`, `add_alias`, `load_snapshot`.
    pub operation: Option<String>,
    /// `pulsar`, `telescope` or `observation`.
    pub entity: Option<String>,
    /// Canonical name, alias or observation id the error is about.
    pub name: Option<String>,
    pub details: Option<String>,
    /// Set when the same call may succeed later (the store was unavailable).
    pub retryable: bool,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_name(mut self, name: impl ToString) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Context for a snapshot file operation.
    pub fn snapshot(operation: impl Into<String>, path: &Path) -> Self {
        Self::new(operation).with_details(format!("path={}", path.display()))
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
        if let Some(ref name) = self.name {
            parts.push(format!("name={}", name));
        }
        if let Some(ref details) = self.details {
            parts.push(details.clone());
        }
        if self.retryable {
            parts.push("retryable".to_string());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
#[allow(clippy::result_large_err)]
pub enum RepositoryError {
    /// The store is not accepting requests; retrying later may succeed.
    #[error("Store unavailable: {message} {context}")]
    Unavailable {
        message: String,
        context: ErrorContext,
    },

    /// No catalog entry under that name or alias.
    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// A record the store refuses to hold (empty name, reversed window, dangling reference).
    #[error("Invalid record: {message} {context}")]
    ValidationError {
        message: String,
        context: ErrorContext,
    },

    /// A name or alias is already taken in its catalog.
    #[error("Conflict: {message} {context}")]
    Conflict {
        message: String,
        context: ErrorContext,
    },

    /// Bad repository type, config file or environment setting.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    /// A snapshot file could not be read, parsed or written.
    #[error("Snapshot error: {message} {context}")]
    SnapshotError {
        message: String,
        context: ErrorContext,
    },

    /// Store state that should be impossible, e.g. an alias pointing nowhere.
    #[error("Internal error: {message} {context}")]
    InternalError {
        message: String,
        context: ErrorContext,
    },
}

impl RepositoryError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            context: ErrorContext {
                retryable: true,
                ..Default::default()
            },
        }
    }

    pub fn not_found_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::validation_with_context(message, ErrorContext::default())
    }

    pub fn validation_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ValidationError {
            message: message.into(),
            context,
        }
    }

    pub fn conflict_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Conflict {
            message: message.into(),
            context,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::configuration_with_context(message, ErrorContext::default())
    }

    pub fn configuration_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// A filesystem failure while reading or writing the snapshot at `path`.
    pub fn snapshot_io(operation: &str, path: &Path, err: std::io::Error) -> Self {
        Self::SnapshotError {
            message: format!("{} ({:?})", err, err.kind()),
            context: ErrorContext::snapshot(operation, path),
        }
    }

    /// Snapshot JSON that does not parse or serialize.
    pub fn snapshot_format(operation: &str, path: &Path, err: serde_json::Error) -> Self {
        let context = ErrorContext::snapshot(operation, path);
        let message = if err.line() > 0 {
            format!("{} at line {}, column {}", err, err.line(), err.column())
        } else {
            err.to_string()
        };
        Self::SnapshotError { message, context }
    }

    /// Whether the same call may succeed later.
    pub fn is_retryable(&self) -> bool {
        self.context().retryable
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Unavailable { context, .. }
            | Self::NotFound { context, .. }
            | Self::ValidationError { context, .. }
            | Self::Conflict { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::SnapshotError { context, .. }
            | Self::InternalError { context, .. } => context,
        }
    }

    /// Record which repository operation failed.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        match &mut self {
            Self::Unavailable { context, .. }
            | Self::NotFound { context, .. }
            | Self::ValidationError { context, .. }
            | Self::Conflict { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::SnapshotError { context, .. }
            | Self::InternalError { context, .. } => {
                context.operation = Some(operation.into());
            }
        }
        self
    }
}
