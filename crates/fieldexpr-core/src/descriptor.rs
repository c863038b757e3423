//! Compiled metadata for one record type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::accessor::{self, FieldValue, Getter};
use crate::error::{FieldExprError, Result};
use crate::expression::CompiledExpression;
use crate::reflect::{FieldKind, Locator, RecordType};

/// Compiled accessor and metadata for one field, own or flattened.
#[derive(Clone)]
pub struct FieldDescriptor {
    /// Flattened, dotted name (`home.city`).
    name: String,
    /// Name as declared on the owning record (`city`).
    declared_name: &'static str,
    /// Declaration position within the owning record.
    index: usize,
    kind: FieldKind,
    depth: usize,
    /// Type name of the record that declares this field.
    host: &'static str,
    getter: Option<Getter>,
}

impl FieldDescriptor {
    pub(crate) fn new(
        host: &'static str,
        declared_name: &'static str,
        index: usize,
        kind: FieldKind,
        depth: usize,
        getter: Option<Getter>,
    ) -> Self {
        Self {
            name: declared_name.to_string(),
            declared_name,
            index,
            kind,
            depth,
            host,
            getter,
        }
    }

    /// Re-homes a nested record's field under `prefix`, reached through the
    /// outer field's locator.
    fn flattened(&self, prefix: &str, locate: &Locator, depth: usize) -> Self {
        Self {
            name: format!("{prefix}.{}", self.name),
            getter: self
                .getter
                .as_ref()
                .map(|inner| accessor::nest(locate, depth, inner)),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_name(&self) -> &'static str {
        self.declared_name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Number of pointer layers in front of the value.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Type name of the declaring record; resolve it with
    /// [`Registry::descriptor`](crate::Registry::descriptor).
    pub fn host(&self) -> &'static str {
        self.host
    }

    pub fn has_getter(&self) -> bool {
        self.getter.is_some()
    }

    /// Reads the field from `instance`.
    pub fn get<'a>(&self, instance: &'a dyn Any) -> Option<FieldValue<'a>> {
        let getter = self.getter.as_ref()?;
        getter(instance)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("depth", &self.depth)
            .field("host", &self.host)
            .field("has_getter", &self.getter.is_some())
            .finish()
    }
}

/// Immutable, shareable metadata for one record type.
///
/// Contains:
/// - every field, including nested record fields flattened under dotted names
/// - every compiled expression keyed by selector
/// - the selectors in registration order
pub struct TypeDescriptor {
    type_name: &'static str,
    type_id: TypeId,
    fields: Vec<FieldDescriptor>,
    /// Index mapping flattened field name to position in `fields`.
    field_index: HashMap<String, usize>,
    exprs: HashMap<String, Arc<dyn CompiledExpression>>,
    selectors: Vec<String>,
}

impl TypeDescriptor {
    pub(crate) fn new(record: RecordType) -> Self {
        Self {
            type_name: record.type_name(),
            type_id: record.type_id(),
            fields: Vec::with_capacity(16),
            field_index: HashMap::with_capacity(16),
            exprs: HashMap::with_capacity(64),
            selectors: Vec::with_capacity(64),
        }
    }

    pub(crate) fn insert_field(&mut self, field: FieldDescriptor) {
        let index = self.fields.len();
        self.field_index.insert(field.name.clone(), index);
        self.fields.push(field);
    }

    pub(crate) fn insert_expression(
        &mut self,
        selector: String,
        expr: Arc<dyn CompiledExpression>,
    ) -> Result<()> {
        if self.exprs.contains_key(&selector) {
            return Err(FieldExprError::duplicate(selector));
        }
        self.exprs.insert(selector.clone(), expr);
        self.selectors.push(selector);
        Ok(())
    }

    /// Copies every field and expression of `nested` into this descriptor,
    /// prefixed with `prefix.`.
    pub(crate) fn flatten(
        &mut self,
        prefix: &str,
        locate: &Locator,
        depth: usize,
        nested: &TypeDescriptor,
    ) -> Result<()> {
        for field in &nested.fields {
            self.insert_field(field.flattened(prefix, locate, depth));
        }
        for selector in &nested.selectors {
            let expr = nested.exprs[selector].clone();
            self.insert_expression(format!("{prefix}.{selector}"), expr)?;
        }
        Ok(())
    }

    /// Fully qualified name of the record type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Finds a field by flattened name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.field_index.get(name).map(|&i| &self.fields[i])
    }

    /// All fields: own fields in declaration order, each record field
    /// followed by its flattened fields.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Finds a compiled expression by selector.
    pub fn expression(&self, selector: &str) -> Option<&Arc<dyn CompiledExpression>> {
        self.exprs.get(selector)
    }

    /// Selectors in registration order.
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.exprs.contains_key(selector)
    }

    /// Number of registered expressions.
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields.len())
            .field("selectors", &self.selectors)
            .finish()
    }
}
