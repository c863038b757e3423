//! Runtime shape information for record fields.
//!
//! Rust has no runtime field introspection, so every type that can appear in
//! a record field describes itself through [`Reflect`]:
//! - a static [`FieldShape`] (closed [`FieldKind`] plus pointer depth) used
//!   once, when the registry compiles accessors
//! - a dynamic [`Reflected`] view used while resolving subscripts
//!
//! Records themselves implement [`Record`], usually via `#[derive(Record)]`.

mod impls;
mod schema;

use std::any::Any;

pub use schema::{FieldSchema, Locator, Record, RecordSchema, RecordType};

use crate::value::Value;

/// A type that can be read from a record field.
pub trait Reflect: Any + Send + Sync {
    /// Static classification of this type.
    fn shape() -> FieldShape
    where
        Self: Sized;

    /// Dynamic view of this value.
    fn reflect(&self) -> Reflected<'_>;

    /// Upcast for opaque results and record downcasts.
    fn as_any(&self) -> &dyn Any;
}

/// Classification of a field's underlying type, after stripping indirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric(NumericKind),
    Text,
    Boolean,
    Sequence,
    Associative,
    Record(RecordType),
    Unsupported,
}

impl FieldKind {
    /// Returns the nested record type for record kinds.
    pub fn as_record(&self) -> Option<RecordType> {
        match self {
            FieldKind::Record(record) => Some(*record),
            _ => None,
        }
    }

    /// Returns true for containers that accept subscripts.
    pub fn is_container(&self) -> bool {
        matches!(self, FieldKind::Sequence | FieldKind::Associative)
    }
}

/// Source width of a numeric field. Every width reads as `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
}

/// Kind plus the number of pointer layers (`Option`, `Box`, `Arc`) in front
/// of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldShape {
    pub kind: FieldKind,
    pub depth: usize,
}

impl FieldShape {
    /// A shape with no indirection.
    pub const fn direct(kind: FieldKind) -> Self {
        Self { kind, depth: 0 }
    }

    /// The same shape behind one more pointer layer.
    pub const fn indirect(self) -> Self {
        Self {
            kind: self.kind,
            depth: self.depth + 1,
        }
    }

    /// Shape of a record-valued field.
    pub fn record<T: Record>() -> Self {
        Self::direct(FieldKind::Record(RecordType::of::<T>()))
    }

    /// Shape of a type.
    pub fn of<T: Reflect>() -> Self {
        T::shape()
    }
}

/// Dynamic view of a reflected value.
pub enum Reflected<'a> {
    Number(f64),
    Text(&'a str),
    Bool(bool),
    Sequence(&'a dyn Sequence),
    Associative(&'a dyn Associative),
    Record(&'a dyn Any),
    /// One pointer layer; `None` when the pointer is absent.
    Pointer(Option<&'a dyn Reflect>),
    Opaque(&'a dyn Any),
}

/// Positional container.
pub trait Sequence {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, `None` when out of range.
    fn item(&self, index: usize) -> Option<&dyn Reflect>;
}

/// Keyed container.
pub trait Associative {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts `key` to the container's key type and looks it up.
    ///
    /// Returns `None` when the conversion fails or the key is absent.
    fn lookup(&self, key: &Value<'_>) -> Option<&dyn Reflect>;
}

/// Conversion from a subscript value to a map key type.
pub trait MapKey: Sized {
    fn from_value(value: &Value<'_>) -> Option<Self>;
}

/// Follows `depth` pointer layers. `None` if any layer is absent.
pub fn deref(value: &dyn Reflect, depth: usize) -> Option<&dyn Reflect> {
    let mut value = value;
    for _ in 0..depth {
        match value.reflect() {
            Reflected::Pointer(Some(inner)) => value = inner,
            _ => return None,
        }
    }
    Some(value)
}

/// Follows every pointer layer in front of `value`.
pub fn peel(value: &dyn Reflect) -> Option<&dyn Reflect> {
    let mut value = value;
    loop {
        match value.reflect() {
            Reflected::Pointer(Some(inner)) => value = inner,
            Reflected::Pointer(None) => return None,
            _ => return Some(value),
        }
    }
}
