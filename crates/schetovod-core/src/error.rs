//! # Error Types
//!
//! Domain-specific error types for schetovod-core.
//!
//! ## Error Flow
//! ```text
//! TemplateError ──► CoreError ──► StoreError (schetovod-store)
//!                                      │
//!                                      ▼
//!                             anyhow context (host binary)
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, id, value)
//! 3. Errors are enum variants, never bare strings
//! 4. Rendering and aggregation never fail on dangling references -
//!    those are recoverable display conditions, not errors. The only
//!    loud failure in the engine is a structurally corrupt template.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A user-authored template failed structural validation.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Input validation failure on reference data.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Template Error
// =============================================================================

/// Structural problems in a user-authored print template.
///
/// Templates are user configuration; rendering a broken layout silently
/// would hide the author's mistake, so these fail loudly.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A required field is missing or empty.
    #[error("template '{template}': {field} is required")]
    MissingField {
        template: String,
        field: &'static str,
    },

    /// A numeric field is outside the printable range.
    #[error("template '{template}': {field} = {value} is out of range ({min}..={max})")]
    OutOfRange {
        template: String,
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A template built for one document kind was applied to another.
    #[error("template '{template}' targets {expected:?}, not {actual:?}")]
    KindMismatch {
        template: String,
        expected: crate::types::DocKind,
        actual: crate::types::DocKind,
    },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for reference data (companies, products).
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Invalid format (e.g. a non-numeric INN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: String,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_error_messages() {
        let err = TemplateError::MissingField {
            template: "Счет (стандартный)".to_string(),
            field: "font",
        };
        assert_eq!(
            err.to_string(),
            "template 'Счет (стандартный)': font is required"
        );
    }

    #[test]
    fn test_template_error_converts_to_core_error() {
        let err = TemplateError::OutOfRange {
            template: "t".to_string(),
            field: "fontSize",
            value: 0,
            min: 6,
            max: 72,
        };
        let core: CoreError = err.into();
        assert!(matches!(core, CoreError::Template(_)));
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required { field: "name" };
        assert_eq!(err.to_string(), "name is required");
    }
}
