use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::slice;

use crate::{
    any::Object,
    container::Container,
    errors::ResolveErrorKind,
    factory::Factory,
    lazy::{Lazy, LazyReference, LazyValue},
    value::Value,
};

/// Key of a constructor parameter: its declared name or its zero-based position.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParamKey {
    Position(usize),
    Name(String),
}

impl ParamKey {
    #[inline]
    #[must_use]
    pub(crate) fn matches(&self, index: usize, name: &str) -> bool {
        match self {
            ParamKey::Position(position) => *position == index,
            ParamKey::Name(key) => key == name,
        }
    }
}

impl From<usize> for ParamKey {
    #[inline]
    fn from(position: usize) -> Self {
        ParamKey::Position(position)
    }
}

impl From<&str> for ParamKey {
    #[inline]
    fn from(name: &str) -> Self {
        ParamKey::Name(name.into())
    }
}

impl From<String> for ParamKey {
    #[inline]
    fn from(name: String) -> Self {
        ParamKey::Name(name)
    }
}

/// Definition-time value of a parameter or setter.
///
/// Lazies stay unresolved until the object that needs them is built,
/// including lazies nested in [`Param::List`] and [`Param::Map`].
#[derive(Clone, Debug)]
pub enum Param {
    Value(Value),
    Lazy(Lazy),
    List(Vec<Param>),
    Map(BTreeMap<String, Param>),
}

impl Param {
    /// Resolves the param and every lazy inside it.
    ///
    /// # Errors
    /// Returns the error of the first lazy that fails to resolve.
    pub fn resolve(&self, container: &Container) -> Result<Value, ResolveErrorKind> {
        match self {
            Param::Value(value) => Ok(value.clone()),
            Param::Lazy(lazy) => lazy.resolve(container),
            Param::List(params) => params
                .iter()
                .map(|param| param.resolve(container))
                .collect::<Result<_, _>>()
                .map(Value::List),
            Param::Map(params) => params
                .iter()
                .map(|(key, param)| param.resolve(container).map(|value| (key.clone(), value)))
                .collect::<Result<_, _>>()
                .map(Value::Map),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_lazy(&self) -> bool {
        matches!(self, Param::Lazy(_))
    }
}

macro_rules! impl_from_value_for_param {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Param {
                #[inline]
                fn from(val: $ty) -> Self {
                    Param::Value(val.into())
                }
            }
        )*
    };
}

impl_from_value_for_param!(Value, bool, i64, i32, u32, u8, f64, &str, String, Object);

impl From<Lazy> for Param {
    #[inline]
    fn from(lazy: Lazy) -> Self {
        Param::Lazy(lazy)
    }
}

impl From<LazyValue> for Param {
    #[inline]
    fn from(lazy: LazyValue) -> Self {
        Param::Lazy(lazy.into())
    }
}

impl From<LazyReference> for Param {
    #[inline]
    fn from(lazy: LazyReference) -> Self {
        Param::Lazy(lazy.into())
    }
}

impl From<Factory> for Param {
    #[inline]
    fn from(factory: Factory) -> Self {
        Param::Value(Value::Object(Object::new(factory)))
    }
}

impl From<Vec<Param>> for Param {
    #[inline]
    fn from(params: Vec<Param>) -> Self {
        Param::List(params)
    }
}

impl From<BTreeMap<String, Param>> for Param {
    #[inline]
    fn from(params: BTreeMap<String, Param>) -> Self {
        Param::Map(params)
    }
}

/// Map that keeps insertion order. Replacing an entry keeps its original slot.
#[derive(Clone, Debug)]
pub struct OrderedMap<K, V> {
    entries: Vec<(K, V)>,
}

/// Constructor parameter overrides and defaults
pub type Params = OrderedMap<ParamKey, Param>;
/// Setter method values, keyed by method name
pub type Setters = OrderedMap<String, Param>;

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> OrderedMap<K, V> {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, (K, V)> {
        self.entries.iter()
    }
}

impl<K: PartialEq, V> OrderedMap<K, V> {
    /// Inserts the value, returning the replaced one.
    pub fn insert(&mut self, key: impl Into<K>, value: impl Into<V>) -> Option<V> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(entry_key, _)| *entry_key == key) {
            Some((_, entry_value)) => Some(core::mem::replace(entry_value, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<K>, value: impl Into<V>) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries
            .iter()
            .find_map(|(entry_key, value)| (entry_key == key).then_some(value))
    }

    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }
}

impl<V> OrderedMap<ParamKey, V> {
    /// Finds a value for the parameter at `index` named `name`.
    /// A positional key takes priority over a named one.
    #[must_use]
    pub fn get_param(&self, index: usize, name: &str) -> Option<&V> {
        let by_position = self
            .entries
            .iter()
            .find_map(|(key, value)| matches!(key, ParamKey::Position(_) if key.matches(index, name)).then_some(value));
        by_position.or_else(|| {
            self.entries
                .iter()
                .find_map(|(key, value)| matches!(key, ParamKey::Name(_) if key.matches(index, name)).then_some(value))
        })
    }
}

impl<K: PartialEq, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = &'a (K, V);
    type IntoIter = slice::Iter<'a, (K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = alloc::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Param, ParamKey, Params, Setters};
    use crate::Value;

    use alloc::{string::String, vec::Vec};

    #[test]
    fn test_insert_keeps_slot() {
        let mut setters = Setters::new();
        setters.insert("setFoo", 1i64);
        setters.insert("setBar", 2i64);
        let replaced = setters.insert("setFoo", 3i64);

        assert!(matches!(replaced, Some(Param::Value(Value::Int(1)))));

        let methods: Vec<&String> = setters.iter().map(|(method, _)| method).collect();
        assert_eq!(methods, ["setFoo", "setBar"]);
        assert!(matches!(setters.get(&String::from("setFoo")), Some(Param::Value(Value::Int(3)))));
    }

    #[test]
    fn test_position_wins_over_name() {
        let params = Params::new().with("data", "named").with(0usize, "positional");

        assert!(matches!(params.get_param(0, "data"), Some(Param::Value(Value::Str(val))) if val == "positional"));
        assert!(matches!(params.get_param(1, "data"), Some(Param::Value(Value::Str(val))) if val == "named"));
        assert!(params.get_param(1, "other").is_none());
        assert!(params.contains_key(&ParamKey::Position(0)));
    }
}
