use alloc::{
    boxed::Box,
    collections::BTreeMap,
    string::{String, ToString as _},
    sync::Arc,
    vec::Vec,
};
use core::{
    any::type_name,
    sync::atomic::{AtomicBool, Ordering},
};
use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    any::Object,
    cache::Cache,
    config::Config,
    errors::{ConfigErrorKind, InstantiateErrorKind, ResolveErrorKind},
    factory::Factory,
    instantiator,
    lazy::{Blueprint, Lazy, LazyReference, LazyValue},
    loader::{DefaultLoader, ResourceLoader},
    param::{Param, ParamKey, Params, Setters},
    reflection::{ClassDescriptor, Reflection, Reflector},
    table::ResolutionTable,
    value::Value,
};

/// Lazy-resolution dependency injection container.
///
/// The container is configured through `&mut self` methods until it's locked,
/// either explicitly by [`Container::lock`] or implicitly by the first [`Container::get`] or [`Container::new_instance`].
/// After that every mutator returns [`ConfigErrorKind::Locked`].
pub struct Container {
    pub(crate) table: ResolutionTable,
    services: BTreeMap<String, Lazy>,
    cache: Mutex<Cache>,
    reflection: Reflection,
    loader: Box<dyn ResourceLoader>,
    config: Config,
    locked: AtomicBool,
}

impl Container {
    #[inline]
    #[must_use]
    pub fn new(reflector: impl Reflector + 'static) -> Self {
        Self::new_with_config(reflector, Config::default())
    }

    #[must_use]
    pub fn new_with_config(reflector: impl Reflector + 'static, config: Config) -> Self {
        Self {
            table: ResolutionTable::new(),
            services: BTreeMap::new(),
            cache: Mutex::new(Cache::new()),
            reflection: Reflection::new(Box::new(reflector)),
            loader: Box::new(DefaultLoader::default()),
            config,
            locked: AtomicBool::new(false),
        }
    }

    /// Replaces the loader used by include and require lazies
    #[inline]
    #[must_use]
    pub fn with_loader(mut self, loader: impl ResourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Freezes the definitions
    #[inline]
    pub fn lock(&self) {
        if !self.locked.swap(true, Ordering::AcqRel) {
            debug!("Container locked");
        }
    }

    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    fn check_unlocked(&self) -> Result<(), ConfigErrorKind> {
        if self.is_locked() {
            let err = ConfigErrorKind::Locked;
            error!("{}", err);
            return Err(err);
        }
        Ok(())
    }

    /// # Errors
    /// Returns [`ConfigErrorKind::Locked`] if the container is locked.
    pub fn set_auto_resolve(&mut self, auto_resolve: bool) -> Result<(), ConfigErrorKind> {
        self.check_unlocked()?;
        self.config.auto_resolve = auto_resolve;
        Ok(())
    }

    #[inline]
    #[must_use]
    pub const fn auto_resolve(&self) -> bool {
        self.config.auto_resolve
    }

    /// Registers a service. The lazy is resolved on the first [`Container::get`] of the service only.
    ///
    /// # Errors
    /// - Returns [`ConfigErrorKind::Locked`] if the container is locked
    /// - Returns [`ConfigErrorKind::ServiceAlreadyDefined`] if a service with this name is registered
    pub fn set(&mut self, name: impl Into<String>, lazy: impl Into<Lazy>) -> Result<(), ConfigErrorKind> {
        self.check_unlocked()?;

        let name = name.into();
        if self.services.contains_key(&name) {
            let err = ConfigErrorKind::ServiceAlreadyDefined { name };
            error!("{}", err);
            return Err(err);
        }

        debug!(service = name.as_str(), "Service defined");
        self.services.insert(name, lazy.into());
        Ok(())
    }

    /// Sets a default for a constructor parameter of the class and its subclasses.
    ///
    /// # Errors
    /// Returns [`ConfigErrorKind::Locked`] if the container is locked.
    pub fn set_param(&mut self, class: impl Into<String>, key: impl Into<ParamKey>, param: impl Into<Param>) -> Result<(), ConfigErrorKind> {
        self.check_unlocked()?;
        self.table.params.entry(class.into()).or_default().insert(key, param);
        Ok(())
    }

    /// Sets defaults for several constructor parameters of the class, see [`Container::set_param`].
    ///
    /// # Errors
    /// Returns [`ConfigErrorKind::Locked`] if the container is locked.
    pub fn set_params(&mut self, class: impl Into<String>, params: Params) -> Result<(), ConfigErrorKind> {
        self.check_unlocked()?;
        let defaults = self.table.params.entry(class.into()).or_default();
        for (key, param) in params {
            defaults.insert(key, param);
        }
        Ok(())
    }

    /// Sets a setter value for the class, trait or interface.
    ///
    /// # Errors
    /// Returns [`ConfigErrorKind::Locked`] if the container is locked.
    pub fn set_setter(&mut self, class: impl Into<String>, method: impl Into<String>, param: impl Into<Param>) -> Result<(), ConfigErrorKind> {
        self.check_unlocked()?;
        self.table.setters.entry(class.into()).or_default().insert(method, param);
        Ok(())
    }

    /// Sets the lazy used for auto-resolved parameters hinted with `type_name`.
    ///
    /// # Errors
    /// Returns [`ConfigErrorKind::Locked`] if the container is locked.
    pub fn set_type(&mut self, type_name: impl Into<String>, lazy: impl Into<Lazy>) -> Result<(), ConfigErrorKind> {
        self.check_unlocked()?;
        self.table.types.insert(type_name.into(), lazy.into());
        Ok(())
    }

    /// Sets a named value for [`Container::lazy_value`].
    ///
    /// # Errors
    /// Returns [`ConfigErrorKind::Locked`] if the container is locked.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), ConfigErrorKind> {
        self.check_unlocked()?;
        self.table.values.insert(key.into(), value.into());
        Ok(())
    }

    /// Gets the instance of a service, resolving it on the first call.
    ///
    /// Every call for one name returns the same instance.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::ServiceNotFound`] if the service isn't registered
    /// - Returns [`ResolveErrorKind::NotAnObject`] if the service lazy resolves to a plain value
    /// - Returns any error of the service lazy. Failed resolutions aren't cached
    pub fn get(&self, name: &str) -> Result<Object, ResolveErrorKind> {
        let span = info_span!("get", service = name);
        let _guard = span.enter();

        self.lock();

        if let Some(object) = self.cache.lock().get(name) {
            debug!("Found in cache");
            return Ok(object);
        }
        debug!("Not found in cache");

        let Some(lazy) = self.services.get(name) else {
            let err = ResolveErrorKind::ServiceNotFound { name: name.to_string() };
            error!("{}", err);
            return Err(err);
        };

        let object = match lazy.resolve(self)? {
            Value::Object(object) => object,
            value => {
                let err = ResolveErrorKind::NotAnObject {
                    name: name.to_string(),
                    actual: value.kind(),
                };
                error!("{}", err);
                return Err(err);
            }
        };

        let object = self.cache.lock().insert_or_get(name, object);
        debug!("Cached");

        Ok(object)
    }

    /// Gets the instance of a service and downcasts it to `T`.
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::IncorrectType`] if the instance isn't a `T`, or any error of [`Container::get`].
    pub fn get_as<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, ResolveErrorKind> {
        let object = self.get(name)?;
        object.downcast().ok_or_else(|| {
            let err = ResolveErrorKind::IncorrectType {
                expected: type_name::<T>(),
                actual: object.class().to_string(),
            };
            error!("{}", err);
            err
        })
    }

    #[inline]
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    #[must_use]
    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    /// Names of the services resolved so far
    #[must_use]
    pub fn instantiated_names(&self) -> Vec<String> {
        self.cache.lock().names()
    }

    /// Builds a fresh instance of the class using only definition-time defaults.
    ///
    /// # Errors
    /// Returns an error if a parameter can't be resolved, or the class can't be described or constructed.
    #[inline]
    pub fn new_instance(&self, class: &str) -> Result<Object, ResolveErrorKind> {
        self.new_instance_with(class, Params::new(), Setters::new())
    }

    /// Builds a fresh instance of the class, with instance overrides winning over every default.
    ///
    /// # Errors
    /// Returns an error if a parameter can't be resolved, or the class can't be described or constructed.
    pub fn new_instance_with(&self, class: &str, params: Params, setters: Setters) -> Result<Object, ResolveErrorKind> {
        let span = info_span!("new_instance", class);
        let _guard = span.enter();

        self.lock();

        self.build(&Blueprint::new(class).with_params(params).with_setters(setters))
    }

    #[inline]
    pub(crate) fn build(&self, blueprint: &Blueprint) -> Result<Object, ResolveErrorKind> {
        instantiator::build(self, blueprint)
    }

    /// Reflects the class with its whole inheritance chain.
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::Reflection`] if the class or one of its parents is unknown.
    #[inline]
    pub fn describe(&self, class: &str) -> Result<Arc<ClassDescriptor>, ResolveErrorKind> {
        self.reflection.describe(class).map_err(Into::into)
    }

    #[inline]
    #[must_use]
    pub fn lazy_new(&self, class: impl Into<String>) -> LazyReference {
        LazyReference::new_instance(class)
    }

    #[inline]
    #[must_use]
    pub fn lazy_new_with(&self, class: impl Into<String>, params: Params, setters: Setters) -> LazyReference {
        LazyReference::NewInstance(Blueprint::new(class).with_params(params).with_setters(setters))
    }

    #[inline]
    #[must_use]
    pub fn lazy_get(&self, name: impl Into<String>) -> LazyReference {
        LazyReference::service(name)
    }

    #[inline]
    #[must_use]
    pub fn lazy_value(&self, key: impl Into<String>) -> LazyValue {
        LazyValue::named(key)
    }

    #[inline]
    #[must_use]
    pub fn lazy_include(&self, path: impl Into<String>) -> LazyValue {
        LazyValue::include(path)
    }

    #[inline]
    #[must_use]
    pub fn lazy_require(&self, path: impl Into<String>) -> LazyValue {
        LazyValue::require(path)
    }

    #[inline]
    #[must_use]
    pub fn lazy<F>(&self, computation: F) -> LazyValue
    where
        F: Fn() -> Result<Value, InstantiateErrorKind> + Send + Sync + 'static,
    {
        LazyValue::call(computation)
    }

    #[inline]
    #[must_use]
    pub fn lazy_get_call<F>(&self, name: impl Into<String>, call: F) -> LazyValue
    where
        F: Fn(&Object) -> Result<Value, InstantiateErrorKind> + Send + Sync + 'static,
    {
        LazyValue::get_call(name, call)
    }

    #[inline]
    #[must_use]
    pub fn new_factory(&self, class: impl Into<String>) -> Factory {
        Factory::new(class, Params::new())
    }

    #[inline]
    #[must_use]
    pub fn new_factory_with(&self, class: impl Into<String>, params: Params) -> Factory {
        Factory::new(class, params)
    }

    #[inline]
    #[must_use]
    pub(crate) fn named_value(&self, key: &str) -> Option<&Value> {
        self.table.value(key)
    }

    #[inline]
    #[must_use]
    pub(crate) fn loader(&self) -> &dyn ResourceLoader {
        self.loader.as_ref()
    }
}
