//! Error types for fieldexpr

use thiserror::Error;

use crate::expression::CompileError;

/// Errors raised while registering record types or binding instances.
///
/// Evaluation never fails; only registration and binding report errors.
#[derive(Debug, Error)]
pub enum FieldExprError {
    /// Null or non-record argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Annotation text does not follow the annotation grammar
    #[error("syntax incorrect: {annotation:?}")]
    AnnotationSyntax { annotation: String },

    /// Selector registered twice on the same record
    #[error("duplicate expression name: {selector}")]
    DuplicateExpressionName { selector: String },

    /// The expression compiler rejected a source
    #[error("{source}")]
    ExpressionCompile {
        selector: String,
        #[source]
        source: CompileError,
    },

    /// A record reaches itself through nested fields and the registry is
    /// configured to reject that
    #[error("self-referential record type: {type_name}")]
    RecursiveRecord { type_name: String },
}

impl FieldExprError {
    pub(crate) fn syntax(annotation: &str) -> Self {
        FieldExprError::AnnotationSyntax {
            annotation: annotation.to_string(),
        }
    }

    pub(crate) fn duplicate(selector: impl Into<String>) -> Self {
        FieldExprError::DuplicateExpressionName {
            selector: selector.into(),
        }
    }
}

/// Result type alias for fieldexpr operations
pub type Result<T> = std::result::Result<T, FieldExprError>;
