//! Type descriptor registry.
//!
//! The registry compiles a [`TypeDescriptor`] the first time a record type is
//! seen and serves the cached descriptor afterwards. Lookups share a read
//! lock; building takes the write lock and re-checks the cache, so each type
//! is compiled at most once no matter how many callers race on it.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use fieldexpr_config::{RegistryConfig, SelfReferencePolicy};
use tracing::{debug, trace, warn};

use crate::accessor;
use crate::annotation;
use crate::context::EvalContext;
use crate::descriptor::{FieldDescriptor, TypeDescriptor};
use crate::error::{FieldExprError, Result};
use crate::expression::ExpressionCompiler;
use crate::reflect::{FieldKind, FieldSchema, FieldShape, Record, RecordType, Reflect};

/// Cached descriptors, indexed by type name and by type id.
///
/// `reached` holds, per cached type, every record type its descriptor
/// embeds or cuts off. A cached descriptor is only reused inside another
/// build when none of those types is on the current build path.
struct TypeJar {
    by_name: HashMap<&'static str, Arc<TypeDescriptor>>,
    by_id: HashMap<TypeId, Arc<TypeDescriptor>>,
    reached: HashMap<&'static str, Reached>,
}

type Reached = HashSet<&'static str>;

/// A descriptor together with the record types its build reached.
struct Built {
    descriptor: Arc<TypeDescriptor>,
    reached: Reached,
}

impl TypeJar {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            by_name: HashMap::with_capacity(capacity),
            by_id: HashMap::with_capacity(capacity),
            reached: HashMap::with_capacity(capacity),
        }
    }

    fn insert(&mut self, built: &Built) {
        let descriptor = &built.descriptor;
        self.by_id.insert(descriptor.type_id(), descriptor.clone());
        self.by_name.insert(descriptor.type_name(), descriptor.clone());
        self.reached.insert(descriptor.type_name(), built.reached.clone());
    }

    /// Cached descriptor for `type_name` if it is valid under `path`.
    fn reusable(&self, type_name: &str, path: &[&'static str]) -> Option<Built> {
        let descriptor = self.by_name.get(type_name)?;
        let reached = self.reached.get(type_name)?;
        if reached.iter().any(|t| path.contains(t)) {
            return None;
        }
        Some(Built {
            descriptor: descriptor.clone(),
            reached: reached.clone(),
        })
    }
}

/// Compiles and caches type descriptors; binds instances to them.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use fieldexpr_core::{expression_fn, CompileError, CompiledExpression, Registry};
///
/// let registry = Registry::new(|_source: &str| -> Result<Arc<dyn CompiledExpression>, CompileError> {
///     Ok(expression_fn(|field, ctx| ctx.resolve_field(field, &[])))
/// });
/// assert!(registry.is_empty());
/// ```
pub struct Registry {
    config: RegistryConfig,
    compiler: Arc<dyn ExpressionCompiler>,
    jar: RwLock<TypeJar>,
}

impl Registry {
    /// Creates a registry with the default configuration.
    pub fn new(compiler: impl ExpressionCompiler + 'static) -> Self {
        Self::with_config(RegistryConfig::default(), compiler)
    }

    /// Creates a registry with `config`.
    pub fn with_config(config: RegistryConfig, compiler: impl ExpressionCompiler + 'static) -> Self {
        Self::with_shared_compiler(config, Arc::new(compiler))
    }

    /// Creates a registry around a compiler shared with other owners.
    pub fn with_shared_compiler(
        config: RegistryConfig,
        compiler: Arc<dyn ExpressionCompiler>,
    ) -> Self {
        let jar = TypeJar::with_capacity(config.initial_capacity);
        Self {
            config,
            compiler,
            jar: RwLock::new(jar),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // The jar is append-only, so a guard recovered from a poisoned lock
    // still holds complete descriptors.
    fn read(&self) -> RwLockReadGuard<'_, TypeJar> {
        self.jar.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TypeJar> {
        self.jar.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `record` under the write lock, returning the cached
    /// descriptor if it is already known.
    pub fn register(&self, record: RecordType) -> Result<Arc<TypeDescriptor>> {
        let mut jar = self.write();
        self.register_locked(&mut jar, record)
    }

    /// Returns the cached descriptor for `record`, building it on a miss.
    pub fn get_or_register(&self, record: RecordType) -> Result<Arc<TypeDescriptor>> {
        if let Some(descriptor) = self.read().by_name.get(record.type_name()) {
            trace!(
                event = "descriptor_cache_hit",
                type_name = record.type_name()
            );
            return Ok(descriptor.clone());
        }
        let mut jar = self.write();
        self.register_locked(&mut jar, record)
    }

    /// Registers the record behind any number of pointer layers.
    ///
    /// # Errors
    ///
    /// [`FieldExprError::InvalidInput`] when the underlying kind is not a
    /// record.
    pub fn register_shape(&self, shape: FieldShape) -> Result<Arc<TypeDescriptor>> {
        match shape.kind {
            FieldKind::Record(record) => self.get_or_register(record),
            kind => Err(FieldExprError::InvalidInput(format!(
                "not a record or pointer to record: {kind:?}"
            ))),
        }
    }

    /// Typed form of [`register_shape`](Self::register_shape), e.g.
    /// `register_reflect::<Option<Box<User>>>()`.
    pub fn register_reflect<F: Reflect>(&self) -> Result<Arc<TypeDescriptor>> {
        self.register_shape(F::shape())
    }

    /// Registers every type up front so later binds only take the read lock.
    ///
    /// Stops at, and returns, the first registration error.
    pub fn warm_up<I>(&self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = RecordType>,
    {
        let mut jar = self.write();
        for record in records {
            self.register_locked(&mut jar, record)?;
        }
        Ok(())
    }

    /// Cached descriptor for a type name, if registered.
    pub fn descriptor(&self, type_name: &str) -> Option<Arc<TypeDescriptor>> {
        self.read().by_name.get(type_name).cloned()
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.read().by_name.contains_key(type_name)
    }

    /// Number of cached descriptors.
    pub fn len(&self) -> usize {
        self.read().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Binds `instance`, registering its type on first use.
    pub fn bind<'a, T: Record>(&self, instance: &'a T) -> Result<EvalContext<'a>> {
        let descriptor = self.get_or_register(T::record_type())?;
        Ok(EvalContext::new(descriptor, instance))
    }

    /// Like [`bind`](Self::bind) for a possibly absent instance.
    ///
    /// # Errors
    ///
    /// [`FieldExprError::InvalidInput`] when `instance` is `None`.
    pub fn bind_ptr<'a, T: Record>(&self, instance: Option<&'a T>) -> Result<EvalContext<'a>> {
        let instance = instance.ok_or_else(null_instance)?;
        self.bind(instance)
    }

    /// Binds a type-erased instance.
    ///
    /// The concrete type must already be registered (see
    /// [`warm_up`](Self::warm_up)): a `dyn Any` carries no schema to build
    /// from.
    ///
    /// # Errors
    ///
    /// [`FieldExprError::InvalidInput`] when `instance` is `None` or not a
    /// registered record.
    pub fn bind_dyn<'a>(
        &self,
        instance: Option<&'a (dyn Any + Send + Sync)>,
    ) -> Result<EvalContext<'a>> {
        let instance = instance.ok_or_else(null_instance)?;
        let type_id = (*instance).type_id();
        let descriptor = self.read().by_id.get(&type_id).cloned().ok_or_else(|| {
            FieldExprError::InvalidInput(format!("not a registered record type: {type_id:?}"))
        })?;
        Ok(EvalContext::new(descriptor, instance))
    }

    fn register_locked(
        &self,
        jar: &mut TypeJar,
        record: RecordType,
    ) -> Result<Arc<TypeDescriptor>> {
        let mut in_progress = Vec::new();
        self.build(jar, record, &mut in_progress)
            .map(|built| built.descriptor)
            .inspect_err(|error| {
                debug!(
                    event = "registration_failed",
                    type_name = record.type_name(),
                    error = %error,
                );
            })
    }

    /// Builds the descriptor for `record` as seen from the types in
    /// `in_progress`, cutting any field that leads back to one of them.
    ///
    /// The result is cached only when no cut reached a type outside its own
    /// subtree, so a type's cached descriptor is the same whichever record
    /// was registered first.
    fn build(
        &self,
        jar: &mut TypeJar,
        record: RecordType,
        in_progress: &mut Vec<&'static str>,
    ) -> Result<Built> {
        if let Some(built) = jar.reusable(record.type_name(), in_progress) {
            return Ok(built);
        }
        let host = record.type_name();
        in_progress.push(host);
        let result = self.build_fields(jar, record, in_progress);
        in_progress.pop();
        let (descriptor, reached) = result?;

        let built = Built {
            descriptor: Arc::new(descriptor),
            reached,
        };
        if built.reached.iter().any(|t| in_progress.contains(t)) {
            trace!(
                event = "record_unrolled",
                type_name = host,
                depth = in_progress.len(),
            );
            return Ok(built);
        }
        jar.insert(&built);
        debug!(
            event = "record_registered",
            type_name = host,
            fields = built.descriptor.fields().len(),
            expressions = built.descriptor.len(),
        );
        Ok(built)
    }

    fn build_fields(
        &self,
        jar: &mut TypeJar,
        record: RecordType,
        in_progress: &mut Vec<&'static str>,
    ) -> Result<(TypeDescriptor, Reached)> {
        let host = record.type_name();
        let schema = record.schema();
        let mut descriptor = TypeDescriptor::new(record);
        let mut reached = Reached::from([host]);
        for (index, field) in schema.fields().iter().enumerate() {
            self.compile_expressions(&mut descriptor, field)?;

            let shape = field.shape();
            let describe = |getter| {
                FieldDescriptor::new(host, field.name(), index, shape.kind, shape.depth, getter)
            };
            let Some(locate) = field.locator() else {
                descriptor.insert_field(describe(Some(accessor::nil())));
                continue;
            };
            match shape.kind {
                FieldKind::Record(nested) if in_progress.contains(&nested.type_name()) => {
                    if self.config.self_reference == SelfReferencePolicy::Reject {
                        return Err(FieldExprError::RecursiveRecord {
                            type_name: nested.type_name().to_string(),
                        });
                    }
                    warn!(
                        event = "self_referential_record",
                        type_name = host,
                        field = field.name(),
                        nested = nested.type_name(),
                    );
                    reached.insert(nested.type_name());
                    descriptor.insert_field(describe(Some(accessor::nil())));
                }
                FieldKind::Record(nested) => {
                    let sub = self.build(jar, nested, in_progress)?;
                    reached.extend(sub.reached.iter().copied());
                    descriptor.insert_field(describe(None));
                    descriptor.flatten(field.name(), locate, shape.depth, &sub.descriptor)?;
                }
                kind => {
                    descriptor.insert_field(describe(accessor::compile(
                        &kind,
                        locate,
                        shape.depth,
                    )));
                }
            }
        }
        Ok((descriptor, reached))
    }

    fn compile_expressions(
        &self,
        descriptor: &mut TypeDescriptor,
        field: &FieldSchema,
    ) -> Result<()> {
        let text = field.annotation(&self.config.tag_name).unwrap_or_default();
        for (selector, source) in annotation::parse(text, field.name())? {
            let expr = self.compiler.compile(&source).map_err(|source| {
                FieldExprError::ExpressionCompile {
                    selector: selector.clone(),
                    source,
                }
            })?;
            descriptor.insert_expression(selector, expr)?;
        }
        Ok(())
    }
}

fn null_instance() -> FieldExprError {
    FieldExprError::InvalidInput("cannot bind a null instance".to_string())
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("types", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
