//! Field accessor compiler.
//!
//! Each field gets one [`Getter`] built at registration time, specialised by
//! its [`FieldKind`] and pointer depth, so evaluation never re-inspects the
//! field's type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::reflect::{deref, FieldKind, Locator, Reflect, Reflected};
use crate::value::Value;

/// Compiled read of one field from a record instance.
///
/// Returns `None` (nil) when the instance has the wrong type, a pointer on
/// the way is absent, or the field kind is unsupported.
pub type Getter = Arc<dyn for<'a> Fn(&'a dyn Any) -> Option<FieldValue<'a>> + Send + Sync>;

/// Raw value produced by a getter.
#[derive(Clone, Copy)]
pub enum FieldValue<'a> {
    Number(f64),
    Text(&'a str),
    Bool(bool),
    /// Sequence or associative container, kept for subscripting.
    Container(&'a dyn Reflect),
}

impl<'a> FieldValue<'a> {
    /// Normalises into an evaluation [`Value`].
    pub fn into_value(self) -> Value<'a> {
        match self {
            FieldValue::Number(n) => Value::Number(n),
            FieldValue::Text(t) => Value::from(t),
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Container(c) => Value::Opaque(c.as_any()),
        }
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            FieldValue::Text(t) => f.debug_tuple("Text").field(t).finish(),
            FieldValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            FieldValue::Container(_) => f.write_str("Container(..)"),
        }
    }
}

type Read = for<'a> fn(&'a dyn Reflect) -> Option<FieldValue<'a>>;

fn getter<F>(f: F) -> Getter
where
    F: for<'a> Fn(&'a dyn Any) -> Option<FieldValue<'a>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Builds the getter for a field of `kind` reached through `locate` and
/// `depth` pointer layers.
///
/// Record kinds get no getter: their fields are flattened with [`nest`].
pub fn compile(kind: &FieldKind, locate: &Locator, depth: usize) -> Option<Getter> {
    let read: Read = match kind {
        FieldKind::Numeric(_) => read_number,
        FieldKind::Text => read_text,
        FieldKind::Boolean => read_bool,
        FieldKind::Sequence | FieldKind::Associative => read_container,
        FieldKind::Record(_) => return None,
        FieldKind::Unsupported => return Some(nil()),
    };
    Some(leaf(locate.clone(), depth, read))
}

/// A getter that always yields nil.
pub fn nil() -> Getter {
    getter(|_| None)
}

/// Composes a nested record's getter with the locator of the field holding
/// that record: `outer(base) = inner(deref(locate(base), depth))`.
pub fn nest(locate: &Locator, depth: usize, inner: &Getter) -> Getter {
    let locate = locate.clone();
    let inner = inner.clone();
    if depth == 0 {
        getter(move |base| inner(locate(base)?.as_any()))
    } else {
        getter(move |base| match deref(locate(base)?, depth)?.reflect() {
            Reflected::Record(record) => inner(record),
            _ => None,
        })
    }
}

fn leaf(locate: Locator, depth: usize, read: Read) -> Getter {
    if depth == 0 {
        getter(move |base| read(locate(base)?))
    } else {
        getter(move |base| read(deref(locate(base)?, depth)?))
    }
}

fn read_number(value: &dyn Reflect) -> Option<FieldValue<'_>> {
    match value.reflect() {
        Reflected::Number(n) => Some(FieldValue::Number(n)),
        _ => None,
    }
}

fn read_text(value: &dyn Reflect) -> Option<FieldValue<'_>> {
    match value.reflect() {
        Reflected::Text(t) => Some(FieldValue::Text(t)),
        _ => None,
    }
}

fn read_bool(value: &dyn Reflect) -> Option<FieldValue<'_>> {
    match value.reflect() {
        Reflected::Bool(b) => Some(FieldValue::Bool(b)),
        _ => None,
    }
}

fn read_container(value: &dyn Reflect) -> Option<FieldValue<'_>> {
    Some(FieldValue::Container(value))
}
