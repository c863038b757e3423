//! Seam to the expression language.
//!
//! The registry never interprets expression text. It hands each source to an
//! [`ExpressionCompiler`] and stores the resulting [`CompiledExpression`]
//! under its selector. At evaluation time the compiled expression receives
//! the selector's field path and the [`EvalContext`], and reads field values
//! back through [`EvalContext::resolve_field`].

use std::sync::Arc;

use crate::context::EvalContext;
use crate::value::Value;

/// Error returned by an expression compiler; surfaced unchanged.
pub type CompileError = Box<dyn std::error::Error + Send + Sync>;

/// An expression ready to run against any instance of its record type.
pub trait CompiledExpression: Send + Sync {
    /// Evaluates the expression.
    ///
    /// `field_path` is the selector text before `@`, i.e. the (flattened)
    /// field the expression is attached to.
    fn evaluate<'a>(&self, field_path: &str, ctx: &EvalContext<'a>) -> Value<'a>;
}

/// Turns expression source text into a [`CompiledExpression`].
pub trait ExpressionCompiler: Send + Sync {
    fn compile(&self, source: &str) -> Result<Arc<dyn CompiledExpression>, CompileError>;
}

impl<F> ExpressionCompiler for F
where
    F: Fn(&str) -> Result<Arc<dyn CompiledExpression>, CompileError> + Send + Sync,
{
    fn compile(&self, source: &str) -> Result<Arc<dyn CompiledExpression>, CompileError> {
        self(source)
    }
}

/// A compiled expression backed by a closure.
pub struct ExpressionFn<F>(F);

impl<F> CompiledExpression for ExpressionFn<F>
where
    F: for<'a> Fn(&str, &EvalContext<'a>) -> Value<'a> + Send + Sync,
{
    fn evaluate<'a>(&self, field_path: &str, ctx: &EvalContext<'a>) -> Value<'a> {
        (self.0)(field_path, ctx)
    }
}

/// Wraps a closure as a shared [`CompiledExpression`].
///
/// ```
/// use fieldexpr_core::{expression_fn, Value};
///
/// let always_true = expression_fn(|_, _| Value::Bool(true));
/// # let _ = always_true;
/// ```
pub fn expression_fn<F>(f: F) -> Arc<dyn CompiledExpression>
where
    F: for<'a> Fn(&str, &EvalContext<'a>) -> Value<'a> + Send + Sync + 'static,
{
    Arc::new(ExpressionFn(f))
}
