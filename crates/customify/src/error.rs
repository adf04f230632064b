//! Error types.
//!
//! Only [`BuildError`] aborts a build. Everything else the engine can recover
//! from is reported as a [`Diagnostic`](crate::Diagnostic) instead.

use std::path::PathBuf;

use thiserror::Error;

/// Error returned when a contribution document cannot be turned into a
/// [`SchemaContribution`](crate::SchemaContribution).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// YAML parse error.
    Parse {
        /// Optional source file path.
        path: Option<PathBuf>,
        /// Error message from the YAML parser.
        message: String,
    },

    /// The document does not have the mapping-of-sections shape.
    Shape {
        /// Where in the document the problem is (e.g. `general.options`).
        location: String,
        /// What was expected.
        message: String,
        /// Optional source file path.
        path: Option<PathBuf>,
    },

    /// A value inside an option could not be interpreted.
    InvalidValue {
        /// Section id.
        section: String,
        /// Option id.
        option: String,
        /// The offending key.
        field: String,
        /// Description of what was wrong.
        message: String,
    },

    /// File loading error.
    Load {
        /// Error message from the file system.
        message: String,
    },
}

impl SchemaError {
    pub(crate) fn shape(location: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::Shape {
            location: location.into(),
            message: message.into(),
            path: None,
        }
    }

    /// Attaches the source file path to parse and shape errors.
    pub fn with_path(self, file: impl Into<PathBuf>) -> Self {
        match self {
            SchemaError::Parse { message, .. } => SchemaError::Parse {
                path: Some(file.into()),
                message,
            },
            SchemaError::Shape {
                location, message, ..
            } => SchemaError::Shape {
                location,
                message,
                path: Some(file.into()),
            },
            other => other,
        }
    }
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::Parse { path, message } => {
                if let Some(p) = path {
                    write!(f, "Failed to parse contribution {}: {}", p.display(), message)
                } else {
                    write!(f, "Failed to parse contribution: {}", message)
                }
            }
            SchemaError::Shape {
                location,
                message,
                path,
            } => {
                let file = path
                    .as_ref()
                    .map(|p| format!(" in {}", p.display()))
                    .unwrap_or_default();
                write!(f, "Malformed contribution at '{}'{}: {}", location, file, message)
            }
            SchemaError::InvalidValue {
                section,
                option,
                field,
                message,
            } => write!(
                f,
                "Invalid '{}' for option '{}.{}': {}",
                field, section, option, message
            ),
            SchemaError::Load { message } => {
                write!(f, "Failed to load contribution: {}", message)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Error returned by a contributor or section filter callback.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ContributorError {
    /// Human-readable error message
    pub message: String,
    /// The underlying error source, if any
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ContributorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        self.source = Some(source.into());
        self
    }
}

impl From<SchemaError> for ContributorError {
    fn from(err: SchemaError) -> Self {
        ContributorError::new("contribution document is malformed").with_source(err)
    }
}

/// Fatal build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A contributor or section filter failed. No schema is produced.
    #[error("contributor '{contributor}' failed: {source}")]
    ContributorFailure {
        /// Id of the failing contributor or filter.
        contributor: String,
        #[source]
        source: ContributorError,
    },
}

impl BuildError {
    /// Id of the contributor that aborted the build.
    pub fn contributor(&self) -> &str {
        match self {
            BuildError::ContributorFailure { contributor, .. } => contributor,
        }
    }
}
