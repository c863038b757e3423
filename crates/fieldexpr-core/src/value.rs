//! Evaluation results.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;

use crate::reflect::{peel, Reflect, Reflected};

/// A value produced by field resolution or expression evaluation.
///
/// Numbers are always `f64` regardless of the source width. Text borrows
/// from the record instance when it comes straight from a field.
#[derive(Clone, Default)]
pub enum Value<'a> {
    /// No value: unknown selector, absent pointer, missing key, ...
    #[default]
    Nil,
    Number(f64),
    Text(Cow<'a, str>),
    Bool(bool),
    /// Any other value (containers, records, unsupported types).
    Opaque(&'a dyn Any),
}

impl<'a> Value<'a> {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(t) => Some(t.as_ref()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Downcasts an opaque value.
    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        match self {
            Value::Opaque(any) => {
                let any: &'a dyn Any = *any;
                any.downcast_ref::<T>()
            }
            _ => None,
        }
    }

    /// Normalises a reflected value: follows pointers, widens numbers and
    /// wraps everything that is not a scalar as [`Value::Opaque`].
    pub fn from_reflect(value: &'a dyn Reflect) -> Self {
        let Some(value) = peel(value) else {
            return Value::Nil;
        };
        match value.reflect() {
            Reflected::Number(n) => Value::Number(n),
            Reflected::Text(t) => Value::Text(Cow::Borrowed(t)),
            Reflected::Bool(b) => Value::Bool(b),
            Reflected::Pointer(_)
            | Reflected::Sequence(_)
            | Reflected::Associative(_)
            | Reflected::Record(_)
            | Reflected::Opaque(_) => Value::Opaque(value.as_any()),
        }
    }
}

impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => std::ptr::addr_eq(*a, *b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(t) => f.write_str(t),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Opaque(_) => f.write_str("<opaque>"),
        }
    }
}

impl From<f64> for Value<'_> {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(t: &'a str) -> Self {
        Value::Text(Cow::Borrowed(t))
    }
}

impl From<String> for Value<'_> {
    fn from(t: String) -> Self {
        Value::Text(Cow::Owned(t))
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}
