//! Macros for export error handling.
//!
//! Provides convenience macros for creating and returning [`crate::error::ExportError`]
//! instances with reduced boilerplate for common error handling patterns.

/// Creates an [`crate::error::ExportError`] from error kind and description.
///
/// This macro provides a concise way to create [`crate::error::ExportError`] instances
/// with either static descriptions or additional dynamic detail information.
#[macro_export]
macro_rules! export_error {
    ($kind:expr, $desc:expr) => {
        ExportError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        ExportError::from(($kind, $desc, $detail.to_string()))
    };
}

/// Creates and returns an [`crate::error::ExportError`] from the current function.
///
/// This macro combines error creation with early return, reducing boilerplate
/// when handling error conditions that should immediately terminate execution.
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return Err($crate::export_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return Err($crate::export_error!($kind, $desc, $detail))
    };
}
