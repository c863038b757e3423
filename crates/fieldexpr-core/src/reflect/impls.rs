//! `Reflect` implementations for standard library types.

use std::any::Any;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use num_traits::NumCast;

use super::{
    Associative, FieldKind, FieldShape, MapKey, NumericKind, Reflect, Reflected, Sequence,
};
use crate::value::Value;

macro_rules! impl_numeric {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl Reflect for $ty {
            fn shape() -> FieldShape {
                FieldShape::direct(FieldKind::Numeric(NumericKind::$kind))
            }

            fn reflect(&self) -> Reflected<'_> {
                Reflected::Number(*self as f64)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    )*};
}

impl_numeric! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
}

// Subscripts arrive as f64; integer keys truncate toward zero and reject
// values outside the key's range.
macro_rules! impl_integer_key {
    ($($ty:ty),* $(,)?) => {$(
        impl MapKey for $ty {
            fn from_value(value: &Value<'_>) -> Option<Self> {
                match value {
                    Value::Number(n) => <$ty as NumCast>::from(*n),
                    _ => None,
                }
            }
        }
    )*};
}

impl_integer_key!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl MapKey for String {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        match value {
            Value::Text(text) => Some(text.to_string()),
            _ => None,
        }
    }
}

impl MapKey for bool {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl MapKey for char {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        let Value::Text(text) = value else {
            return None;
        };
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl Reflect for bool {
    fn shape() -> FieldShape {
        FieldShape::direct(FieldKind::Boolean)
    }

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Bool(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

macro_rules! impl_text {
    ($($ty:ty),* $(,)?) => {$(
        impl Reflect for $ty {
            fn shape() -> FieldShape {
                FieldShape::direct(FieldKind::Text)
            }

            fn reflect(&self) -> Reflected<'_> {
                Reflected::Text(self.as_ref())
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    )*};
}

impl_text!(String, &'static str, Cow<'static, str>, Box<str>, Arc<str>);

impl Reflect for () {
    fn shape() -> FieldShape {
        FieldShape::direct(FieldKind::Unsupported)
    }

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Opaque(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn shape() -> FieldShape {
        T::shape().indirect()
    }

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Pointer(self.as_ref().map(|v| v as &dyn Reflect))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn shape() -> FieldShape {
        T::shape().indirect()
    }

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Pointer(Some(&**self as &dyn Reflect))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Reflect> Reflect for Arc<T> {
    fn shape() -> FieldShape {
        T::shape().indirect()
    }

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Pointer(Some(&**self as &dyn Reflect))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Reflect> Sequence for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn item(&self, index: usize) -> Option<&dyn Reflect> {
        self.get(index).map(|v| v as &dyn Reflect)
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn shape() -> FieldShape {
        FieldShape::direct(FieldKind::Sequence)
    }

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Sequence(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Reflect, const N: usize> Sequence for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn item(&self, index: usize) -> Option<&dyn Reflect> {
        self.get(index).map(|v| v as &dyn Reflect)
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn shape() -> FieldShape {
        FieldShape::direct(FieldKind::Sequence)
    }

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Sequence(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Reflect> Sequence for VecDeque<T> {
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn item(&self, index: usize) -> Option<&dyn Reflect> {
        self.get(index).map(|v| v as &dyn Reflect)
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn shape() -> FieldShape {
        FieldShape::direct(FieldKind::Sequence)
    }

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Sequence(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<K, V, S> Associative for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: Reflect,
    S: BuildHasher,
{
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn lookup(&self, key: &Value<'_>) -> Option<&dyn Reflect> {
        let key = K::from_value(key)?;
        self.get(&key).map(|v| v as &dyn Reflect)
    }
}

impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash + Send + Sync + 'static,
    V: Reflect,
    S: BuildHasher + Send + Sync + 'static,
{
    fn shape() -> FieldShape {
        FieldShape::direct(FieldKind::Associative)
    }

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Associative(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<K, V> Associative for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Reflect,
{
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn lookup(&self, key: &Value<'_>) -> Option<&dyn Reflect> {
        let key = K::from_value(key)?;
        self.get(&key).map(|v| v as &dyn Reflect)
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: MapKey + Ord + Send + Sync + 'static,
    V: Reflect,
{
    fn shape() -> FieldShape {
        FieldShape::direct(FieldKind::Associative)
    }

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Associative(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
