use alloc::{
    boxed::Box,
    collections::BTreeMap,
    string::{String, ToString as _},
    sync::Arc,
    vec,
    vec::Vec,
};
use core::{
    any::type_name,
    fmt::{self, Debug, Formatter},
};
use parking_lot::Mutex;
use tracing::{debug, debug_span, error};

use crate::{
    any::{AnyInstance, Object},
    errors::{InstantiateErrorKind, ReflectionErrorKind},
    value::Value,
};

pub(crate) type ConstructorFn = Arc<dyn Fn(&mut Args) -> Result<Box<AnyInstance>, InstantiateErrorKind> + Send + Sync>;
pub(crate) type SetterFn = Arc<dyn Fn(&mut AnyInstance, Value) -> Result<(), InstantiateErrorKind> + Send + Sync>;

/// Declared type of a constructor parameter
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TypeHint {
    /// No declared type
    #[default]
    Mixed,
    /// Builtin scalar type, never auto-resolved
    Scalar,
    /// Homogeneous sequence, auto-resolved to an empty list
    List,
    /// Map, auto-resolved to an empty map
    Map,
    /// Class or interface name
    Class(String),
}

/// Reflected constructor parameter
#[derive(Clone, Debug)]
pub struct ParamDef {
    name: String,
    hint: TypeHint,
    default: Option<Value>,
}

impl ParamDef {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint: TypeHint::Mixed,
            default: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn hint(mut self, hint: TypeHint) -> Self {
        self.hint = hint;
        self
    }

    #[inline]
    #[must_use]
    pub fn scalar(self) -> Self {
        self.hint(TypeHint::Scalar)
    }

    #[inline]
    #[must_use]
    pub fn list(self) -> Self {
        self.hint(TypeHint::List)
    }

    #[inline]
    #[must_use]
    pub fn map(self) -> Self {
        self.hint(TypeHint::Map)
    }

    #[inline]
    #[must_use]
    pub fn class(self, class: impl Into<String>) -> Self {
        self.hint(TypeHint::Class(class.into()))
    }

    /// Language-level default value of the parameter
    #[inline]
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub const fn type_hint(&self) -> &TypeHint {
        &self.hint
    }

    #[inline]
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// Resolved constructor arguments, in declaration order.
pub struct Args {
    values: Vec<(String, Option<Value>)>,
}

impl Args {
    #[inline]
    #[must_use]
    pub(crate) fn new(values: Vec<(String, Value)>) -> Self {
        Self {
            values: values.into_iter().map(|(name, value)| (name, Some(value))).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(arg_name, _)| arg_name == name)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Takes the argument out.
    ///
    /// # Errors
    /// Returns [`InstantiateErrorKind::MissingArgument`] if there is no such argument or it was already taken.
    pub fn take(&mut self, name: &str) -> Result<Value, InstantiateErrorKind> {
        self.values
            .iter_mut()
            .find(|(arg_name, _)| arg_name == name)
            .and_then(|(_, value)| value.take())
            .ok_or_else(|| InstantiateErrorKind::MissingArgument { name: name.to_string() })
    }

    /// Takes the argument at declaration position `index`.
    ///
    /// # Errors
    /// Returns [`InstantiateErrorKind::MissingArgument`] if there is no such argument or it was already taken.
    pub fn take_at(&mut self, index: usize) -> Result<Value, InstantiateErrorKind> {
        self.values
            .get_mut(index)
            .and_then(|(_, value)| value.take())
            .ok_or_else(|| InstantiateErrorKind::MissingArgument { name: index.to_string() })
    }

    fn mismatched(name: &str, expected: &'static str, actual: &Value) -> InstantiateErrorKind {
        InstantiateErrorKind::MismatchedArgument {
            name: name.to_string(),
            expected,
            actual: actual.kind(),
        }
    }

    /// # Errors
    /// Returns an error if the argument is missing or isn't a string.
    pub fn string(&mut self, name: &str) -> Result<String, InstantiateErrorKind> {
        match self.take(name)? {
            Value::Str(val) => Ok(val),
            other => Err(Self::mismatched(name, "string", &other)),
        }
    }

    /// # Errors
    /// Returns an error if the argument is missing or isn't an int.
    pub fn int(&mut self, name: &str) -> Result<i64, InstantiateErrorKind> {
        match self.take(name)? {
            Value::Int(val) => Ok(val),
            other => Err(Self::mismatched(name, "int", &other)),
        }
    }

    /// # Errors
    /// Returns an error if the argument is missing or isn't a bool.
    pub fn bool(&mut self, name: &str) -> Result<bool, InstantiateErrorKind> {
        match self.take(name)? {
            Value::Bool(val) => Ok(val),
            other => Err(Self::mismatched(name, "bool", &other)),
        }
    }

    /// # Errors
    /// Returns an error if the argument is missing or isn't a list.
    pub fn list(&mut self, name: &str) -> Result<Vec<Value>, InstantiateErrorKind> {
        match self.take(name)? {
            Value::List(val) => Ok(val),
            other => Err(Self::mismatched(name, "list", &other)),
        }
    }

    /// # Errors
    /// Returns an error if the argument is missing or isn't a map.
    pub fn map(&mut self, name: &str) -> Result<BTreeMap<String, Value>, InstantiateErrorKind> {
        match self.take(name)? {
            Value::Map(val) => Ok(val),
            other => Err(Self::mismatched(name, "map", &other)),
        }
    }

    /// # Errors
    /// Returns an error if the argument is missing or isn't an object.
    pub fn object(&mut self, name: &str) -> Result<Object, InstantiateErrorKind> {
        match self.take(name)? {
            Value::Object(val) => Ok(val),
            other => Err(Self::mismatched(name, "object", &other)),
        }
    }

    /// Takes an object argument and downcasts it to `T`.
    ///
    /// # Errors
    /// Returns an error if the argument is missing, isn't an object or isn't a `T`.
    pub fn instance<T: Send + Sync + 'static>(&mut self, name: &str) -> Result<Arc<T>, InstantiateErrorKind> {
        let object = self.object(name)?;
        object.downcast().ok_or_else(|| InstantiateErrorKind::MismatchedArgument {
            name: name.to_string(),
            expected: type_name::<T>(),
            actual: "object of another class",
        })
    }
}

/// Reflected class: what the reflector knows about a single class, trait or interface.
///
/// A definition without a constructor describes something that can't be instantiated,
/// like an interface or an abstract class.
#[derive(Clone)]
pub struct ClassDef {
    name: String,
    parent: Option<String>,
    interfaces: Vec<String>,
    traits: Vec<String>,
    params: Vec<ParamDef>,
    constructor: Option<ConstructorFn>,
    setters: BTreeMap<String, SetterFn>,
}

impl ClassDef {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            interfaces: Vec::new(),
            traits: Vec::new(),
            params: Vec::new(),
            constructor: None,
            setters: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn uses(mut self, r#trait: impl Into<String>) -> Self {
        self.traits.push(r#trait.into());
        self
    }

    /// Appends a constructor parameter. Parameters are passed in the order they are added.
    #[inline]
    #[must_use]
    pub fn param(mut self, param: ParamDef) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn constructor<T, F>(mut self, constructor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut Args) -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(move |args: &mut Args| {
            constructor(args).map(|instance| Box::new(instance) as Box<AnyInstance>)
        }));
        self
    }

    /// Adds a setter method. The method receives the instance built by this class's constructor.
    /// Setters are not inherited: a subclass must redeclare every parent setter it should receive.
    #[must_use]
    pub fn setter<T, F>(mut self, method: impl Into<String>, setter: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut T, Value) -> Result<(), InstantiateErrorKind> + Send + Sync + 'static,
    {
        self.setters.insert(
            method.into(),
            Arc::new(move |instance: &mut AnyInstance, value: Value| match instance.downcast_mut::<T>() {
                Some(instance) => setter(instance, value),
                None => Err(InstantiateErrorKind::MismatchedReceiver { expected: type_name::<T>() }),
            }),
        );
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn params(&self) -> &[ParamDef] {
        &self.params
    }
}

impl Debug for ClassDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("interfaces", &self.interfaces)
            .field("traits", &self.traits)
            .field("params", &self.params)
            .field("setters", &self.setters.keys())
            .finish_non_exhaustive()
    }
}

/// Source of class definitions for the container.
pub trait Reflector: Send + Sync {
    /// # Errors
    /// Returns [`ReflectionErrorKind::UnknownClass`] if the class isn't known.
    fn describe(&self, class: &str) -> Result<ClassDef, ReflectionErrorKind>;
}

/// In-memory reflector built from registered [`ClassDef`]s.
#[derive(Default, Clone, Debug)]
pub struct Catalog {
    classes: BTreeMap<String, ClassDef>,
}

impl Catalog {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { classes: BTreeMap::new() }
    }

    #[inline]
    #[must_use]
    pub fn class(mut self, class: ClassDef) -> Self {
        self.add(class);
        self
    }

    #[inline]
    pub fn add(&mut self, class: ClassDef) -> Option<ClassDef> {
        self.classes.insert(class.name.clone(), class)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }
}

impl Reflector for Catalog {
    fn describe(&self, class: &str) -> Result<ClassDef, ReflectionErrorKind> {
        self.classes
            .get(class)
            .cloned()
            .ok_or_else(|| ReflectionErrorKind::UnknownClass { class: class.to_string() })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapabilityKind {
    Trait,
    Interface,
}

/// Trait or interface found somewhere in a class chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capability {
    pub name: String,
    pub kind: CapabilityKind,
}

/// Class with its whole inheritance chain flattened
pub struct ClassDescriptor {
    pub(crate) name: String,
    pub(crate) ancestors: Vec<String>,
    pub(crate) capabilities: Vec<Capability>,
    pub(crate) params: Vec<ParamDef>,
    pub(crate) constructor: Option<ConstructorFn>,
    pub(crate) setters: BTreeMap<String, SetterFn>,
}

impl ClassDescriptor {
    fn new(reflector: &dyn Reflector, class: &str) -> Result<Self, ReflectionErrorKind> {
        let ClassDef {
            name,
            parent,
            interfaces,
            traits,
            params,
            constructor,
            setters,
        } = reflector.describe(class)?;

        let mut capabilities = Vec::new();
        push_capabilities(&mut capabilities, traits, interfaces);

        let mut ancestors = vec![name.clone()];
        let mut parent = parent;
        while let Some(parent_name) = parent {
            if ancestors.contains(&parent_name) {
                return Err(ReflectionErrorKind::InheritanceCycle { class: name });
            }
            let parent_def = reflector.describe(&parent_name)?;
            push_capabilities(&mut capabilities, parent_def.traits, parent_def.interfaces);
            ancestors.push(parent_name);
            parent = parent_def.parent;
        }

        // Capabilities appended here are always more general than the one being expanded
        let mut index = 0;
        while let Some(Capability { name, kind }) = capabilities.get(index).cloned() {
            index += 1;
            let def = match reflector.describe(&name) {
                Ok(def) => def,
                Err(ReflectionErrorKind::UnknownClass { .. }) => continue,
                Err(err) => return Err(err),
            };
            push_capabilities(&mut capabilities, def.traits, def.interfaces);
            if let Some(parent_name) = def.parent {
                push_capability(&mut capabilities, parent_name, kind);
            }
        }

        Ok(Self {
            name,
            ancestors,
            capabilities,
            params,
            constructor,
            setters,
        })
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class itself followed by its parent, grandparent and so on
    #[inline]
    #[must_use]
    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    #[inline]
    #[must_use]
    pub fn params(&self) -> &[ParamDef] {
        &self.params
    }

    #[inline]
    #[must_use]
    pub fn is_instantiable(&self) -> bool {
        self.constructor.is_some()
    }

    #[inline]
    #[must_use]
    pub fn has_setter(&self, method: &str) -> bool {
        self.setters.contains_key(method)
    }
}

fn push_capabilities(capabilities: &mut Vec<Capability>, traits: Vec<String>, interfaces: Vec<String>) {
    let tagged = traits
        .into_iter()
        .map(|name| (name, CapabilityKind::Trait))
        .chain(interfaces.into_iter().map(|name| (name, CapabilityKind::Interface)));
    for (name, kind) in tagged {
        push_capability(capabilities, name, kind);
    }
}

fn push_capability(capabilities: &mut Vec<Capability>, name: String, kind: CapabilityKind) {
    if !capabilities.iter().any(|capability| capability.name == name) {
        capabilities.push(Capability { name, kind });
    }
}

/// Reflector with descriptors cached per class name
pub(crate) struct Reflection {
    reflector: Box<dyn Reflector>,
    descriptors: Mutex<BTreeMap<String, Arc<ClassDescriptor>>>,
}

impl Reflection {
    #[inline]
    #[must_use]
    pub(crate) fn new(reflector: Box<dyn Reflector>) -> Self {
        Self {
            reflector,
            descriptors: Mutex::new(BTreeMap::new()),
        }
    }

    pub(crate) fn describe(&self, class: &str) -> Result<Arc<ClassDescriptor>, ReflectionErrorKind> {
        let span = debug_span!("describe", class);
        let _guard = span.enter();

        if let Some(descriptor) = self.descriptors.lock().get(class) {
            debug!("Found in cache");
            return Ok(descriptor.clone());
        }
        debug!("Not found in cache");

        let descriptor = match ClassDescriptor::new(self.reflector.as_ref(), class) {
            Ok(descriptor) => Arc::new(descriptor),
            Err(err) => {
                error!("{}", err);
                return Err(err);
            }
        };

        Ok(self
            .descriptors
            .lock()
            .entry(class.to_string())
            .or_insert(descriptor)
            .clone())
    }
}
