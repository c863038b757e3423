//! Record schemas: the per-type field list the registry compiles.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::{FieldKind, FieldShape, Reflect};

/// Type-erased projection from a record instance to one of its fields.
///
/// Returns `None` when the instance is not of the declaring record type.
pub type Locator = Arc<dyn for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Reflect> + Send + Sync>;

fn locator<F>(f: F) -> Locator
where
    F: for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Reflect> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A record type with named fields.
///
/// Implemented by `#[derive(Record)]`; hand-written impls build the schema
/// with [`RecordSchema::new`] and [`FieldSchema::new`].
pub trait Record: Reflect + Sized {
    /// Describes every field of the record, in declaration order.
    fn schema() -> RecordSchema;

    /// Identity handle used to register this type.
    fn record_type() -> RecordType {
        RecordType::of::<Self>()
    }
}

/// Identity of a record type plus the function producing its schema.
#[derive(Clone, Copy)]
pub struct RecordType {
    type_name: &'static str,
    type_id: TypeId,
    schema: fn() -> RecordSchema,
}

impl RecordType {
    /// Returns the handle for `T`.
    pub fn of<T: Record>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            schema: T::schema,
        }
    }

    /// Fully qualified type name; the registry cache key.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Builds the schema.
    pub fn schema(&self) -> RecordSchema {
        (self.schema)()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for RecordType {}

impl Hash for RecordType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordType").field(&self.type_name).finish()
    }
}

/// Field list of one record type.
pub struct RecordSchema {
    record: RecordType,
    fields: Vec<FieldSchema>,
}

impl RecordSchema {
    /// Creates an empty schema for `T`.
    pub fn new<T: Record>() -> Self {
        Self {
            record: RecordType::of::<T>(),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn record_type(&self) -> RecordType {
        self.record
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Finds a field by name.
    pub fn find_field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("type_name", &self.record.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// One declared field: name, annotations, shape and locator.
pub struct FieldSchema {
    name: &'static str,
    annotations: Vec<(&'static str, &'static str)>,
    shape: FieldShape,
    locate: Option<Locator>,
}

impl FieldSchema {
    /// Describes a field of record `H` with type `F`, read through `project`.
    pub fn new<H, F>(name: &'static str, project: fn(&H) -> &F) -> Self
    where
        H: Any,
        F: Reflect,
    {
        Self {
            name,
            annotations: Vec::new(),
            shape: F::shape(),
            locate: Some(locator(move |base| {
                base.downcast_ref::<H>()
                    .map(|host| project(host) as &dyn Reflect)
            })),
        }
    }

    /// Describes a field whose type is not readable. It never yields a value
    /// but can still carry annotations.
    pub fn opaque(name: &'static str) -> Self {
        Self {
            name,
            annotations: Vec::new(),
            shape: FieldShape::direct(FieldKind::Unsupported),
            locate: None,
        }
    }

    /// Attaches annotation text under `tag`.
    pub fn with_annotation(mut self, tag: &'static str, text: &'static str) -> Self {
        self.annotations.push((tag, text));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    pub fn locator(&self) -> Option<&Locator> {
        self.locate.as_ref()
    }

    /// First annotation attached under `tag`.
    pub fn annotation(&self, tag: &str) -> Option<&'static str> {
        self.annotations
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, text)| *text)
    }
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("annotations", &self.annotations)
            .finish()
    }
}
