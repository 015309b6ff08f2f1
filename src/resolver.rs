use alloc::{
    collections::BTreeMap,
    string::{String, ToString as _},
    vec::Vec,
};
use tracing::{debug, debug_span, error};

use crate::{
    errors::ResolveErrorKind,
    lazy::LazyReference,
    param::{Param, Params},
    reflection::{ClassDescriptor, ParamDef, TypeHint},
    table::ResolutionTable,
    value::Value,
};

/// Fills every constructor parameter of a class with a param, in declaration order
pub(crate) struct AutoResolver<'a> {
    table: &'a ResolutionTable,
    auto_resolve: bool,
}

impl<'a> AutoResolver<'a> {
    #[inline]
    #[must_use]
    pub(crate) const fn new(table: &'a ResolutionTable, auto_resolve: bool) -> Self {
        Self { table, auto_resolve }
    }

    /// # Errors
    /// Returns [`ResolveErrorKind::UnresolvableParameter`] for the first parameter nothing gives a value to.
    pub(crate) fn resolve(&self, descriptor: &ClassDescriptor, overrides: &Params) -> Result<Vec<(String, Param)>, ResolveErrorKind> {
        let span = debug_span!("auto_resolve", class = descriptor.name(), auto_resolve = self.auto_resolve);
        let _guard = span.enter();

        descriptor
            .params()
            .iter()
            .enumerate()
            .map(|(index, param_def)| {
                self.resolve_param(descriptor, overrides, index, param_def)
                    .map(|param| (param_def.name().to_string(), param))
            })
            .collect()
    }

    fn resolve_param(
        &self,
        descriptor: &ClassDescriptor,
        overrides: &Params,
        index: usize,
        param_def: &ParamDef,
    ) -> Result<Param, ResolveErrorKind> {
        if let Some(param) = self.table.explicit_param(descriptor, overrides, index, param_def.name()) {
            return Ok(param.clone());
        }

        if let Some(value) = param_def.default_value() {
            debug!(param = param_def.name(), "Using default value");
            return Ok(Param::Value(value.clone()));
        }

        if self.auto_resolve {
            match param_def.type_hint() {
                TypeHint::List => {
                    debug!(param = param_def.name(), "Using empty list");
                    return Ok(Param::Value(Value::List(Vec::new())));
                }
                TypeHint::Map => {
                    debug!(param = param_def.name(), "Using empty map");
                    return Ok(Param::Value(Value::Map(BTreeMap::new())));
                }
                TypeHint::Class(class) => {
                    if let Some(lazy) = self.table.type_rule(class) {
                        debug!(param = param_def.name(), class = class.as_str(), "Using type rule");
                        return Ok(Param::Lazy(lazy.clone()));
                    }
                    debug!(param = param_def.name(), class = class.as_str(), "Using new instance");
                    return Ok(LazyReference::new_instance(class.as_str()).into());
                }
                TypeHint::Mixed | TypeHint::Scalar => {}
            }
        }

        let err = ResolveErrorKind::UnresolvableParameter {
            class: descriptor.name().to_string(),
            param: param_def.name().to_string(),
        };
        error!("{}", err);
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::AutoResolver;
    use crate::{
        lazy::{Lazy, LazyReference},
        reflection::{Catalog, ClassDef, ParamDef, Reflection},
        table::ResolutionTable,
        Param, Params, ResolveErrorKind, Value,
    };

    use alloc::{
        boxed::Box,
        format,
        string::{String, ToString as _},
        vec::Vec,
    };
    use tracing_test::traced_test;

    fn reflection() -> Reflection {
        Reflection::new(Box::new(
            Catalog::new()
                .class(ClassDef::new("Example").constructor(|_| Ok(())))
                .class(ClassDef::new("Logger").constructor(|_| Ok(())))
                .class(
                    ClassDef::new("Service")
                        .param(ParamDef::new("foo").scalar().default("bar"))
                        .param(ParamDef::new("baz").list())
                        .param(ParamDef::new("dib").class("Example"))
                        .param(ParamDef::new("logger").class("Logger"))
                        .param(ParamDef::new("options").map())
                        .constructor(|_| Ok(())),
                )
                .class(
                    ClassDef::new("Scalar")
                        .param(ParamDef::new("port").scalar())
                        .constructor(|_| Ok(())),
                ),
        ))
    }

    #[test]
    #[traced_test]
    fn test_auto_resolve() {
        let reflection = reflection();
        let descriptor = reflection.describe("Service").unwrap();

        let mut table = ResolutionTable::new();
        table
            .types
            .insert("Logger".to_string(), LazyReference::service("logger").into());

        let params = AutoResolver::new(&table, true).resolve(&descriptor, &Params::new()).unwrap();
        let names: Vec<&str> = params.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["foo", "baz", "dib", "logger", "options"]);

        assert!(matches!(&params[0].1, Param::Value(Value::Str(val)) if val == "bar"));
        assert!(matches!(&params[1].1, Param::Value(Value::List(val)) if val.is_empty()));
        assert!(matches!(
            &params[2].1,
            Param::Lazy(Lazy::Reference(LazyReference::NewInstance(blueprint))) if blueprint.class == "Example"
        ));
        assert!(matches!(
            &params[3].1,
            Param::Lazy(Lazy::Reference(LazyReference::Service(name))) if name == "logger"
        ));
        assert!(matches!(&params[4].1, Param::Value(Value::Map(val)) if val.is_empty()));
    }

    #[test]
    #[traced_test]
    fn test_auto_resolve_disabled() {
        let reflection = reflection();
        let descriptor = reflection.describe("Service").unwrap();
        let table = ResolutionTable::new();

        let overrides = Params::new().with("baz", Vec::<Param>::new());
        let err = AutoResolver::new(&table, false).resolve(&descriptor, &overrides).unwrap_err();

        assert!(matches!(err, ResolveErrorKind::UnresolvableParameter { param, .. } if param == "dib"));
        assert!(logs_contain("Using default value"));
    }

    #[test]
    #[traced_test]
    fn test_scalar_never_auto_resolved() {
        let reflection = reflection();
        let descriptor = reflection.describe("Scalar").unwrap();
        let table = ResolutionTable::new();

        assert!(matches!(
            AutoResolver::new(&table, true).resolve(&descriptor, &Params::new()),
            Err(ResolveErrorKind::UnresolvableParameter { class, param }) if class == "Scalar" && param == "port"
        ));

        let params = AutoResolver::new(&table, true)
            .resolve(&descriptor, &Params::new().with(0usize, 8080i64))
            .unwrap();
        assert!(matches!(params[0].1, Param::Value(Value::Int(8080))));
    }
}
