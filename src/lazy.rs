use alloc::{boxed::Box, string::String, sync::Arc};
use core::fmt::{self, Debug, Formatter};
use parking_lot::Mutex;
use tracing::{debug, debug_span, error, warn};

use crate::{
    any::Object,
    container::Container,
    errors::{InstantiateErrorKind, ResolveErrorKind},
    param::{Params, Setters},
    value::Value,
};

type Computation = Box<dyn Fn() -> Result<Value, InstantiateErrorKind> + Send + Sync>;
type ServiceCall = Box<dyn Fn(&Object) -> Result<Value, InstantiateErrorKind> + Send + Sync>;

/// Either kind of deferred value. This is what service slots and type rules hold.
#[derive(Clone, Debug)]
pub enum Lazy {
    Value(LazyValue),
    Reference(LazyReference),
}

impl Lazy {
    /// # Errors
    /// Returns the error of the underlying [`LazyValue`] or [`LazyReference`].
    #[inline]
    pub fn resolve(&self, container: &Container) -> Result<Value, ResolveErrorKind> {
        match self {
            Lazy::Value(lazy) => lazy.resolve(container),
            Lazy::Reference(lazy) => lazy.resolve(container),
        }
    }
}

impl From<LazyValue> for Lazy {
    #[inline]
    fn from(lazy: LazyValue) -> Self {
        Lazy::Value(lazy)
    }
}

impl From<LazyReference> for Lazy {
    #[inline]
    fn from(lazy: LazyReference) -> Self {
        Lazy::Reference(lazy)
    }
}

impl From<Object> for Lazy {
    #[inline]
    fn from(object: Object) -> Self {
        Lazy::Value(LazyValue::literal(object))
    }
}

enum Source {
    Literal(Value),
    Named(String),
    Include(String),
    Require(String),
    Call(Computation),
    GetCall { service: String, call: ServiceCall },
}

struct LazyValueInner {
    source: Source,
    memo: Mutex<Option<Value>>,
}

/// Deferred computation, evaluated on first [`LazyValue::resolve`] and memoized.
///
/// Clones share the memo: resolving any clone evaluates the source at most once.
/// Nothing is evaluated or validated at construction.
#[derive(Clone)]
pub struct LazyValue {
    inner: Arc<LazyValueInner>,
}

impl LazyValue {
    #[inline]
    fn from_source(source: Source) -> Self {
        Self {
            inner: Arc::new(LazyValueInner {
                source,
                memo: Mutex::new(None),
            }),
        }
    }

    /// Wraps a value that is returned as-is.
    #[inline]
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::from_source(Source::Literal(value.into()))
    }

    /// Looks up `key` in container named values at resolution time.
    #[inline]
    #[must_use]
    pub fn named(key: impl Into<String>) -> Self {
        Self::from_source(Source::Named(key.into()))
    }

    /// Loads a resource, yielding [`Value::Null`] with a warning if it can't be loaded.
    #[inline]
    #[must_use]
    pub fn include(path: impl Into<String>) -> Self {
        Self::from_source(Source::Include(path.into()))
    }

    /// Loads a resource, failing if it can't be loaded.
    #[inline]
    #[must_use]
    pub fn require(path: impl Into<String>) -> Self {
        Self::from_source(Source::Require(path.into()))
    }

    #[inline]
    #[must_use]
    pub fn call<F>(computation: F) -> Self
    where
        F: Fn() -> Result<Value, InstantiateErrorKind> + Send + Sync + 'static,
    {
        Self::from_source(Source::Call(Box::new(computation)))
    }

    /// Resolves service `service` and passes it to `call`.
    #[inline]
    #[must_use]
    pub fn get_call<F>(service: impl Into<String>, call: F) -> Self
    where
        F: Fn(&Object) -> Result<Value, InstantiateErrorKind> + Send + Sync + 'static,
    {
        Self::from_source(Source::GetCall {
            service: service.into(),
            call: Box::new(call),
        })
    }

    /// Resolves the value, evaluating its source on the first call only.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::ValueNotFound`] if a named value isn't set
    /// - [`ResolveErrorKind::Resource`] if a required resource can't be loaded
    /// - [`ResolveErrorKind::Computation`] if a computation fails
    /// - any error of the service resolved for a service call
    ///
    /// Errors aren't memoized, a later call evaluates the source again.
    pub fn resolve(&self, container: &Container) -> Result<Value, ResolveErrorKind> {
        if let Source::Literal(value) = &self.inner.source {
            return Ok(value.clone());
        }

        if let Some(value) = self.inner.memo.lock().as_ref() {
            debug!("Found memoized value");
            return Ok(value.clone());
        }

        let value = self.evaluate(container)?;

        // The memo lock isn't held during evaluation, so a racing resolve keeps the first stored value
        Ok(self.inner.memo.lock().get_or_insert(value).clone())
    }

    fn evaluate(&self, container: &Container) -> Result<Value, ResolveErrorKind> {
        match &self.inner.source {
            Source::Literal(value) => Ok(value.clone()),
            Source::Named(key) => {
                let span = debug_span!("lazy_value", key = key.as_str());
                let _guard = span.enter();

                if let Some(value) = container.named_value(key) {
                    debug!("Resolved");
                    Ok(value.clone())
                } else {
                    let err = ResolveErrorKind::ValueNotFound { key: key.clone() };
                    error!("{}", err);
                    Err(err)
                }
            }
            Source::Include(path) => {
                let span = debug_span!("lazy_include", path = path.as_str());
                let _guard = span.enter();

                match container.loader().load(path) {
                    Ok(value) => {
                        debug!("Loaded");
                        Ok(value)
                    }
                    Err(err) => {
                        warn!("{}", err);
                        Ok(Value::Null)
                    }
                }
            }
            Source::Require(path) => {
                let span = debug_span!("lazy_require", path = path.as_str());
                let _guard = span.enter();

                match container.loader().load(path) {
                    Ok(value) => {
                        debug!("Loaded");
                        Ok(value)
                    }
                    Err(err) => {
                        error!("{}", err);
                        Err(err.into())
                    }
                }
            }
            Source::Call(computation) => computation().map_err(|err| {
                let err = ResolveErrorKind::Computation(err);
                error!("{}", err);
                err
            }),
            Source::GetCall { service, call } => {
                let object = container.get(service)?;
                call(&object).map_err(|err| {
                    let err = ResolveErrorKind::Computation(err);
                    error!("{}", err);
                    err
                })
            }
        }
    }
}

impl Debug for LazyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("LazyValue");
        match &self.inner.source {
            Source::Literal(value) => debug.field("literal", value),
            Source::Named(key) => debug.field("named", key),
            Source::Include(path) => debug.field("include", path),
            Source::Require(path) => debug.field("require", path),
            Source::Call(_) => debug.field("call", &".."),
            Source::GetCall { service, .. } => debug.field("get_call", service),
        };
        debug.finish()
    }
}

/// Class to build with its instance-specific overrides
#[derive(Clone, Debug)]
pub struct Blueprint {
    pub class: String,
    pub params: Params,
    pub setters: Setters,
}

impl Blueprint {
    #[inline]
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            params: Params::new(),
            setters: Setters::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_setters(mut self, setters: Setters) -> Self {
        self.setters = setters;
        self
    }
}

/// Deferred lookup of an object. Neither variant caches anything itself.
#[derive(Clone, Debug)]
pub enum LazyReference {
    /// Current instance of a named service
    Service(String),
    /// Fresh instance on every resolution
    NewInstance(Blueprint),
}

impl LazyReference {
    #[inline]
    #[must_use]
    pub fn service(name: impl Into<String>) -> Self {
        LazyReference::Service(name.into())
    }

    #[inline]
    #[must_use]
    pub fn new_instance(class: impl Into<String>) -> Self {
        LazyReference::NewInstance(Blueprint::new(class))
    }

    /// # Errors
    /// Returns the error of [`Container::get`] or of building the blueprint.
    pub fn resolve(&self, container: &Container) -> Result<Value, ResolveErrorKind> {
        self.resolve_object(container).map(Value::Object)
    }

    /// # Errors
    /// Returns the error of [`Container::get`] or of building the blueprint.
    pub fn resolve_object(&self, container: &Container) -> Result<Object, ResolveErrorKind> {
        match self {
            LazyReference::Service(name) => container.get(name),
            LazyReference::NewInstance(blueprint) => container.build(blueprint),
        }
    }
}
