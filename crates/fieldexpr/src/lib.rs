//! fieldexpr - Per-field expressions on Rust records
//!
//! Annotate record fields with expression sources, then evaluate them
//! against live instances. The expression language is pluggable: anything
//! implementing [`ExpressionCompiler`] works.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use fieldexpr::prelude::*;
//!
//! #[derive(Record)]
//! struct User {
//!     #[expr("$")]
//!     name: String,
//!     #[expr("{@:$}{adult:18}")]
//!     age: u8,
//! }
//!
//! // A compiler that only knows `$` (the field itself) and numbers.
//! let registry = Registry::new(|source: &str| -> Result<Arc<dyn CompiledExpression>, CompileError> {
//!     if source == "$" {
//!         return Ok(expression_fn(|field, ctx| ctx.resolve_field(field, &[])));
//!     }
//!     let n: f64 = source.parse()?;
//!     Ok(expression_fn(move |_, _| Value::Number(n)))
//! });
//!
//! let user = User { name: "Ada".to_string(), age: 36 };
//! let ctx = registry.bind(&user).unwrap();
//! assert_eq!(ctx.eval_text("name@"), "Ada");
//! assert_eq!(ctx.eval_number("age@"), 36.0);
//! assert_eq!(ctx.eval_number("age@adult"), 18.0);
//! ```

// Derive macro
pub use fieldexpr_macros::Record;

// Registry and evaluation
pub use fieldexpr_core::{
    field_path, sibling_path, EvalContext, FieldDescriptor, FieldExprError, Record, Registry,
    Result, TypeDescriptor, Value,
};

// Expression language seam
pub use fieldexpr_core::{expression_fn, CompileError, CompiledExpression, ExpressionCompiler};

// Reflection surface
pub use fieldexpr_core::{
    FieldKind, FieldSchema, FieldShape, MapKey, NumericKind, RecordSchema, RecordType, Reflect,
    Reflected,
};

// Configuration
pub use fieldexpr_config::{ConfigError, RegistryConfig, SelfReferencePolicy};

pub use fieldexpr_core::annotation;

/// Internal types for macro-generated code. Do not use directly.
#[doc(hidden)]
pub mod __internal {
    pub use fieldexpr_core::reflect::{
        FieldSchema, FieldShape, Record, RecordSchema, Reflect, Reflected,
    };
}

pub mod prelude {
    pub use super::{
        expression_fn, CompileError, CompiledExpression, EvalContext, ExpressionCompiler, Record,
        Reflect, Registry, RegistryConfig, Value,
    };
}
