use std::error;
use std::fmt;

/// Convenient result type for export operations using [`ExportError`] as the error type.
///
/// This type alias reduces boilerplate when working with fallible export operations.
/// Most export functions return this type.
pub type ExportResult<T> = Result<T, ExportError>;

/// Main error type for export operations.
///
/// [`ExportError`] provides an error system that can represent single errors,
/// errors with additional detail, or multiple aggregated errors. The design allows
/// for rich error information while maintaining ergonomic usage patterns.
#[derive(Debug, Clone)]
pub struct ExportError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
///
/// This enum supports different error patterns while maintaining a unified interface.
/// Users should not interact with this type directly but use [`ExportError`] methods instead.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Error with kind and static description
    WithDescription(ErrorKind, &'static str),
    /// Error with kind, static description, and dynamic detail
    WithDescriptionAndDetail(ErrorKind, &'static str, String),
    /// Multiple aggregated errors
    Many(Vec<ExportError>),
}

/// Specific categories of errors that can occur during export operations.
///
/// This enum provides granular error classification to enable appropriate error
/// handling strategies. The retry policies consult [`ErrorKind::is_transient`] to
/// decide whether an operation is worth repeating.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    // Configuration Errors
    ConfigError,

    // Connection Errors
    SourceConnectionFailed,
    DestinationConnectionFailed,

    // IO & Serialization Errors
    IoError,
    SourceIoError,
    DestinationIoError,
    SerializationError,
    DeserializationError,

    // Data Errors
    RecordFormatFailed,
    InvalidData,

    // Delivery & Notification Errors
    DeliveryFailed,
    NotificationFailed,

    // State & Workflow Errors
    InvalidState,
    Cancelled,

    // General Errors
    SourceError,
    DestinationError,

    // Unknown / Uncategorized
    Unknown,
}

impl ErrorKind {
    /// Returns `true` if errors of this kind are worth retrying.
    ///
    /// Transient kinds cover network, broker and storage blips. Everything else
    /// is treated as fatal and propagated on first occurrence.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::SourceConnectionFailed
                | Self::DestinationConnectionFailed
                | Self::IoError
                | Self::SourceIoError
                | Self::DestinationIoError
        )
    }
}

impl ExportError {
    /// Creates an [`ExportError`] containing multiple aggregated errors.
    ///
    /// This is useful when multiple operations fail and you want to report all
    /// failures rather than just the first one.
    pub fn many(errors: Vec<ExportError>) -> ExportError {
        ExportError {
            repr: ErrorRepr::Many(errors),
        }
    }

    /// Returns the [`ErrorKind`] of this error.
    ///
    /// For multiple errors, returns the kind of the first error or [`ErrorKind::Unknown`]
    /// if the error list is empty.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => kind,
            ErrorRepr::Many(ref errors) => errors
                .first()
                .map(|err| err.kind())
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns all [`ErrorKind`]s present in this error.
    ///
    /// For single errors, returns a vector with one element. For multiple errors,
    /// returns a flattened vector of all error kinds.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => vec![kind],
            ErrorRepr::Many(ref errors) => errors
                .iter()
                .flat_map(|err| err.kinds())
                .collect::<Vec<_>>(),
        }
    }

    /// Returns the detailed error information if available.
    ///
    /// For multiple errors, returns the detail of the first error that has one.
    /// Returns [`None`] if no detailed information is available.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::WithDescriptionAndDetail(_, _, ref detail) => Some(detail.as_str()),
            ErrorRepr::Many(ref errors) => {
                // For multiple errors, return the detail of the first error that has one
                errors.iter().find_map(|e| e.detail())
            }
            _ => None,
        }
    }
}

impl PartialEq for ExportError {
    fn eq(&self, other: &ExportError) -> bool {
        match (&self.repr, &other.repr) {
            (ErrorRepr::WithDescription(kind_a, _), ErrorRepr::WithDescription(kind_b, _)) => {
                kind_a == kind_b
            }
            (
                ErrorRepr::WithDescriptionAndDetail(kind_a, _, _),
                ErrorRepr::WithDescriptionAndDetail(kind_b, _, _),
            ) => kind_a == kind_b,
            (ErrorRepr::Many(errors_a), ErrorRepr::Many(errors_b)) => {
                errors_a.len() == errors_b.len()
                    && errors_a.iter().zip(errors_b.iter()).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.repr {
            ErrorRepr::WithDescription(kind, desc) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;

                Ok(())
            }
            ErrorRepr::WithDescriptionAndDetail(kind, desc, ref detail) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;
                f.write_str(" -> ")?;
                detail.fmt(f)?;

                Ok(())
            }
            ErrorRepr::Many(ref errors) => {
                if errors.is_empty() {
                    write!(f, "Multiple errors occurred (empty)")?;
                } else if errors.len() == 1 {
                    // If there's only one error, just display it directly
                    errors[0].fmt(f)?;
                } else {
                    write!(f, "Multiple errors occurred ({} total):", errors.len())?;
                    for (i, error) in errors.iter().enumerate() {
                        write!(f, "\n  {}: {}", i + 1, error)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl error::Error for ExportError {}

/// Creates an [`ExportError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for ExportError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> ExportError {
        ExportError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

/// Creates an [`ExportError`] from an error kind, static description, and dynamic detail.
impl From<(ErrorKind, &'static str, String)> for ExportError {
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> ExportError {
        ExportError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, desc, detail),
        }
    }
}

/// Creates an [`ExportError`] from a vector of errors for aggregation.
impl<E> From<Vec<E>> for ExportError
where
    E: Into<ExportError>,
{
    fn from(errors: Vec<E>) -> ExportError {
        ExportError {
            repr: ErrorRepr::Many(errors.into_iter().map(Into::into).collect()),
        }
    }
}

// Common standard library error conversions

/// Converts [`std::io::Error`] to [`ExportError`] with [`ErrorKind::IoError`].
impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> ExportError {
        ExportError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::IoError,
                "I/O error occurred",
                err.to_string(),
            ),
        }
    }
}

/// Converts [`serde_json::Error`] to [`ExportError`] with appropriate error kind.
///
/// Maps to [`ErrorKind::SerializationError`] for serialization failures and
/// [`ErrorKind::DeserializationError`] for deserialization failures based on error
/// classification.
impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> ExportError {
        let (kind, description) = match err.classify() {
            serde_json::error::Category::Io => (ErrorKind::IoError, "JSON I/O operation failed"),
            serde_json::error::Category::Syntax | serde_json::error::Category::Data => (
                ErrorKind::DeserializationError,
                "JSON deserialization failed",
            ),
            serde_json::error::Category::Eof => (
                ErrorKind::DeserializationError,
                "JSON deserialization failed",
            ),
        };

        ExportError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, description, err.to_string()),
        }
    }
}

/// Converts [`export_config::shared::ValidationError`] to [`ExportError`] with
/// [`ErrorKind::ConfigError`].
///
/// Malformed or missing configuration is fatal at construction and never retried.
impl From<export_config::shared::ValidationError> for ExportError {
    fn from(err: export_config::shared::ValidationError) -> ExportError {
        ExportError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::ConfigError,
                "Configuration validation failed",
                err.to_string(),
            ),
        }
    }
}
