//! Evaluation context: one record instance bound to its descriptor.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use num_traits::ToPrimitive;

use crate::accessor::FieldValue;
use crate::descriptor::TypeDescriptor;
use crate::reflect::{peel, Reflect, Reflected};
use crate::value::Value;

/// An instance bound to its [`TypeDescriptor`].
///
/// Cheap to clone. Evaluation never fails: anything that cannot be resolved
/// yields [`Value::Nil`].
#[derive(Clone)]
pub struct EvalContext<'a> {
    descriptor: Arc<TypeDescriptor>,
    instance: &'a (dyn Any + Send + Sync),
}

impl<'a> EvalContext<'a> {
    pub(crate) fn new(
        descriptor: Arc<TypeDescriptor>,
        instance: &'a (dyn Any + Send + Sync),
    ) -> Self {
        Self {
            descriptor,
            instance,
        }
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn instance(&self) -> &'a dyn Any {
        self.instance
    }

    /// Evaluates the expression registered under `selector`.
    ///
    /// Unknown selectors yield [`Value::Nil`].
    pub fn eval(&self, selector: &str) -> Value<'a> {
        match self.descriptor.expression(selector) {
            Some(expr) => expr.evaluate(field_path(selector), self),
            None => Value::Nil,
        }
    }

    /// Numeric result, `0.0` on any other result.
    pub fn eval_number(&self, selector: &str) -> f64 {
        self.eval(selector).as_number().unwrap_or_default()
    }

    /// Text result, empty on any other result.
    pub fn eval_text(&self, selector: &str) -> Cow<'a, str> {
        match self.eval(selector) {
            Value::Text(text) => text,
            _ => Cow::Borrowed(""),
        }
    }

    /// Boolean result, `false` on any other result.
    pub fn eval_bool(&self, selector: &str) -> bool {
        self.eval(selector).as_bool().unwrap_or_default()
    }

    /// Visits every selector in registration order.
    ///
    /// `visit` receives the selector and a thunk that evaluates it on
    /// demand. Returning `false` stops the walk.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &dyn Fn() -> Value<'a>) -> bool,
    {
        for selector in self.descriptor.selectors() {
            let thunk = || self.eval(selector);
            if !visit(selector, &thunk) {
                break;
            }
        }
    }

    /// Reads the flattened field `path`, then applies `subscripts` in order.
    ///
    /// Sequences and text take numeric subscripts (truncated toward zero);
    /// indexing text yields the byte as a number. Maps convert the subscript
    /// to their key type. Anything unresolvable is nil.
    pub fn resolve_field(&self, path: &str, subscripts: &[Value<'_>]) -> Value<'a> {
        let Some(root) = self
            .descriptor
            .field(path)
            .and_then(|field| field.get(self.instance))
        else {
            return Value::Nil;
        };
        if subscripts.is_empty() {
            return root.into_value();
        }
        let mut cursor = match root {
            FieldValue::Container(node) => Cursor::Node(node),
            FieldValue::Text(text) => Cursor::Text(text),
            FieldValue::Number(_) | FieldValue::Bool(_) => return Value::Nil,
        };
        for key in subscripts {
            match cursor.step(key) {
                Some(next) => cursor = next,
                None => return Value::Nil,
            }
        }
        cursor.into_value()
    }
}

impl fmt::Debug for EvalContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalContext")
            .field("type_name", &self.descriptor.type_name())
            .finish_non_exhaustive()
    }
}

/// Position reached while applying subscripts.
enum Cursor<'a> {
    Node(&'a dyn Reflect),
    Text(&'a str),
    Byte(u8),
}

impl<'a> Cursor<'a> {
    fn step(self, key: &Value<'_>) -> Option<Cursor<'a>> {
        match self {
            Cursor::Text(text) => text.as_bytes().get(index(key)?).copied().map(Cursor::Byte),
            Cursor::Byte(_) => None,
            Cursor::Node(node) => match peel(node)?.reflect() {
                Reflected::Sequence(seq) => seq.item(index(key)?).map(Cursor::Node),
                Reflected::Associative(map) => map.lookup(key).map(Cursor::Node),
                Reflected::Text(text) => Cursor::Text(text).step(key),
                _ => None,
            },
        }
    }

    fn into_value(self) -> Value<'a> {
        match self {
            Cursor::Node(node) => Value::from_reflect(node),
            Cursor::Text(text) => Value::from(text),
            Cursor::Byte(byte) => Value::Number(f64::from(byte)),
        }
    }
}

fn index(key: &Value<'_>) -> Option<usize> {
    let n = key.as_number()?;
    if n < 0.0 {
        return None;
    }
    n.to_usize()
}

/// Field path portion of a selector: everything before `@`.
///
/// ```
/// use fieldexpr_core::field_path;
///
/// assert_eq!(field_path("home.city@"), "home.city");
/// assert_eq!(field_path("age@limit"), "age");
/// assert_eq!(field_path("age"), "age");
/// ```
pub fn field_path(selector: &str) -> &str {
    selector
        .split_once('@')
        .map_or(selector, |(path, _)| path)
}

/// Resolves `name` against the record that declares `field_path`.
///
/// ```
/// use fieldexpr_core::sibling_path;
///
/// assert_eq!(sibling_path("home.zip", "city"), "home.city");
/// assert_eq!(sibling_path("age", "score"), "score");
/// ```
pub fn sibling_path(field_path: &str, name: &str) -> String {
    match field_path.rfind('.') {
        Some(dot) => format!("{}.{name}", &field_path[..dot]),
        None => name.to_string(),
    }
}
