use alloc::{collections::BTreeMap, string::String};
use tracing::debug;

use crate::{
    lazy::Lazy,
    param::{Param, Params, Setters},
    reflection::ClassDescriptor,
    value::Value,
};

/// Definition-time defaults the container resolves against
#[derive(Default)]
pub(crate) struct ResolutionTable {
    /// Class name to constructor parameter defaults
    pub(crate) params: BTreeMap<String, Params>,
    /// Class, trait or interface name to setter defaults
    pub(crate) setters: BTreeMap<String, Setters>,
    /// Type name to the lazy used for parameters hinted with it
    pub(crate) types: BTreeMap<String, Lazy>,
    pub(crate) values: BTreeMap<String, Value>,
}

impl ResolutionTable {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            params: BTreeMap::new(),
            setters: BTreeMap::new(),
            types: BTreeMap::new(),
            values: BTreeMap::new(),
        }
    }

    /// Finds an explicit value for the constructor parameter at `index` named `name`.
    ///
    /// Instance overrides come first, then class defaults from the most derived ancestor to the most general.
    #[must_use]
    pub(crate) fn explicit_param<'a>(
        &'a self,
        descriptor: &ClassDescriptor,
        overrides: &'a Params,
        index: usize,
        name: &str,
    ) -> Option<&'a Param> {
        if let Some(param) = overrides.get_param(index, name) {
            debug!(param = name, "Found in overrides");
            return Some(param);
        }

        descriptor.ancestors.iter().find_map(|class| {
            let param = self.params.get(class)?.get_param(index, name)?;
            debug!(param = name, class = class.as_str(), "Found in class defaults");
            Some(param)
        })
    }

    /// Merges setter values for the class.
    ///
    /// Trait and interface setters go first, then class setters from the most general ancestor
    /// to the class itself, then instance overrides. A later value for the same method replaces
    /// the earlier one but keeps its slot.
    #[must_use]
    pub(crate) fn effective_setters(&self, descriptor: &ClassDescriptor, overrides: &Setters) -> Setters {
        let mut merged = Setters::new();

        let capabilities = descriptor.capabilities.iter().rev().map(|capability| &capability.name);
        let ancestors = descriptor.ancestors.iter().rev();
        for name in capabilities.chain(ancestors) {
            if let Some(setters) = self.setters.get(name) {
                for (method, param) in setters {
                    merged.insert(method.clone(), param.clone());
                }
            }
        }
        for (method, param) in overrides {
            merged.insert(method.clone(), param.clone());
        }

        merged
    }

    #[inline]
    #[must_use]
    pub(crate) fn type_rule(&self, type_name: &str) -> Option<&Lazy> {
        self.types.get(type_name)
    }

    #[inline]
    #[must_use]
    pub(crate) fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::ResolutionTable;
    use crate::{
        reflection::{Catalog, ClassDef, Reflection},
        Param, Params, Setters, Value,
    };

    use alloc::{boxed::Box, vec::Vec};

    fn reflection() -> Reflection {
        Reflection::new(Box::new(
            Catalog::new()
                .class(ClassDef::new("Base").uses("HasLogger"))
                .class(ClassDef::new("Child").extends("Base").implements("Configurable")),
        ))
    }

    fn int(param: Option<&Param>) -> Option<i64> {
        match param {
            Some(Param::Value(Value::Int(val))) => Some(*val),
            _ => None,
        }
    }

    #[test]
    fn test_explicit_param_precedence() {
        let reflection = reflection();
        let descriptor = reflection.describe("Child").unwrap();

        let mut table = ResolutionTable::new();
        table.params.insert("Base".into(), Params::new().with("foo", 1i64).with("bar", 2i64));
        table.params.insert("Child".into(), Params::new().with("foo", 3i64));

        let overrides = Params::new().with(1usize, 4i64);

        assert_eq!(int(table.explicit_param(&descriptor, &overrides, 0, "foo")), Some(3));
        assert_eq!(int(table.explicit_param(&descriptor, &overrides, 1, "bar")), Some(4));
        assert_eq!(int(table.explicit_param(&descriptor, &Params::new(), 1, "bar")), Some(2));
        assert!(table.explicit_param(&descriptor, &overrides, 2, "baz").is_none());
    }

    #[test]
    fn test_effective_setters_union() {
        let reflection = reflection();
        let descriptor = reflection.describe("Child").unwrap();

        let mut table = ResolutionTable::new();
        table.setters.insert("HasLogger".into(), Setters::new().with("setLogger", "trait"));
        table.setters.insert("Configurable".into(), Setters::new().with("setConfig", "interface"));
        table.setters.insert("Base".into(), Setters::new().with("setName", "base").with("setConfig", "base"));
        table.setters.insert("Child".into(), Setters::new().with("setName", "child"));

        let overrides = Setters::new().with("setLogger", "override").with("setExtra", "override");
        let merged = table.effective_setters(&descriptor, &overrides);

        let merged: Vec<(&str, &str)> = merged
            .iter()
            .map(|(method, param)| match param {
                Param::Value(Value::Str(val)) => (method.as_str(), val.as_str()),
                _ => (method.as_str(), ""),
            })
            .collect();
        assert_eq!(
            merged,
            [
                ("setLogger", "override"),
                ("setConfig", "base"),
                ("setName", "child"),
                ("setExtra", "override"),
            ]
        );
    }
}
