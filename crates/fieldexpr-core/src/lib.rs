//! fieldexpr Core - Type-metadata compiler and descriptor cache
//!
//! This crate provides the fundamental pieces of fieldexpr:
//! - Reflection traits describing record fields and their kinds
//! - Annotation parsing into named expression sources
//! - Per-field accessors compiled once per type
//! - A thread-safe registry of type descriptors
//! - Evaluation contexts binding instances to descriptors

pub mod accessor;
pub mod annotation;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod expression;
pub mod reflect;
pub mod registry;
pub mod value;

#[cfg(test)]
pub mod test_utils;

pub use accessor::{FieldValue, Getter};
pub use context::{field_path, sibling_path, EvalContext};
pub use descriptor::{FieldDescriptor, TypeDescriptor};
pub use error::{FieldExprError, Result};
pub use expression::{expression_fn, CompileError, CompiledExpression, ExpressionCompiler};
pub use reflect::{
    Associative, FieldKind, FieldSchema, FieldShape, Locator, MapKey, NumericKind, Record,
    RecordSchema, RecordType, Reflect, Reflected, Sequence,
};
pub use registry::Registry;
pub use value::Value;

pub use fieldexpr_config::{ConfigError, RegistryConfig, SelfReferencePolicy};
