use alloc::vec::Vec;
use tracing::{debug, debug_span, error};

use crate::{
    any::Object,
    container::Container,
    errors::{ReflectionErrorKind, ResolveErrorKind},
    lazy::Blueprint,
    reflection::Args,
    resolver::AutoResolver,
};

/// Builds a fresh object from a blueprint.
///
/// Every lazy in the arguments and setter values is resolved right before the constructor is called.
/// Nothing is cached: a failed build leaves no trace and the next one starts over.
pub(crate) fn build(container: &Container, blueprint: &Blueprint) -> Result<Object, ResolveErrorKind> {
    let Blueprint { class, params, setters } = blueprint;

    let span = debug_span!("build", class = class.as_str());
    let _guard = span.enter();

    let descriptor = container.describe(class)?;
    let Some(constructor) = descriptor.constructor.clone() else {
        let err = ResolveErrorKind::Reflection(ReflectionErrorKind::NotInstantiable { class: class.clone() });
        error!("{}", err);
        return Err(err);
    };

    let params = AutoResolver::new(&container.table, container.auto_resolve()).resolve(&descriptor, params)?;
    let values = params
        .into_iter()
        .map(|(name, param)| param.resolve(container).map(|value| (name, value)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut instance = match constructor(&mut Args::new(values)) {
        Ok(instance) => instance,
        Err(err) => {
            let err = ResolveErrorKind::Construction {
                class: class.clone(),
                source: err,
            };
            error!("{}", err);
            return Err(err);
        }
    };
    debug!("Constructed");

    for (method, param) in container.table.effective_setters(&descriptor, setters) {
        let Some(setter) = descriptor.setters.get(&method) else {
            let err = ResolveErrorKind::SetterNotFound {
                class: class.clone(),
                method,
            };
            error!("{}", err);
            return Err(err);
        };

        let value = param.resolve(container)?;
        if let Err(err) = setter(&mut *instance, value) {
            let err = ResolveErrorKind::Setter {
                class: class.clone(),
                method,
                source: err,
            };
            error!("{}", err);
            return Err(err);
        }
        debug!(method = method.as_str(), "Setter applied");
    }

    Ok(Object::from_boxed(class, instance))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::build;
    use crate::{
        lazy::Blueprint, Args, Catalog, ClassDef, Container, InstantiateErrorKind, LazyValue, ParamDef, Params,
        ReflectionErrorKind, ResolveErrorKind, Setters, Value,
    };

    use alloc::{
        format,
        string::{String, ToString as _},
        sync::Arc,
        vec::Vec,
    };
    use core::sync::atomic::{AtomicU8, Ordering};
    use parking_lot::Mutex;
    use tracing_test::traced_test;

    struct Mailer {
        transport: String,
        calls: Vec<String>,
    }

    fn container(constructed: Arc<AtomicU8>) -> Container {
        Container::new(
            Catalog::new()
                .class(ClassDef::new("Transport"))
                .class(
                    ClassDef::new("Mailer")
                        .param(ParamDef::new("transport").scalar())
                        .constructor(move |args: &mut Args| {
                            constructed.fetch_add(1, Ordering::SeqCst);
                            Ok(Mailer {
                                transport: args.string("transport")?,
                                calls: Vec::new(),
                            })
                        })
                        .setter("setFrom", |mailer: &mut Mailer, value: Value| {
                            mailer.calls.push(format!("from:{}", value.as_str().unwrap_or_default()));
                            Ok(())
                        })
                        .setter("setRetries", |mailer: &mut Mailer, value: Value| {
                            let retries = value
                                .as_int()
                                .ok_or_else(|| InstantiateErrorKind::Custom(anyhow::anyhow!("retries must be an int")))?;
                            mailer.calls.push(format!("retries:{retries}"));
                            Ok(())
                        }),
                ),
        )
    }

    #[test]
    #[traced_test]
    fn test_build_applies_setters_in_order() {
        let constructed = Arc::new(AtomicU8::new(0));
        let mut container = container(constructed.clone());
        container.set_setter("Mailer", "setRetries", 3i64).unwrap();
        container.set_setter("Mailer", "setFrom", "noreply@example.com").unwrap();

        let blueprint = Blueprint::new("Mailer").with_params(Params::new().with("transport", "smtp"));
        let mailer = build(&container, &blueprint).unwrap();
        let mailer = mailer.downcast_ref::<Mailer>().unwrap();

        assert_eq!(mailer.transport, "smtp");
        assert_eq!(mailer.calls, ["retries:3", "from:noreply@example.com"]);
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[traced_test]
    fn test_lazy_args_resolved_at_build() {
        let constructed = Arc::new(AtomicU8::new(0));
        let container = container(constructed.clone());
        let evaluated = Arc::new(Mutex::new(false));

        let transport = LazyValue::call({
            let evaluated = evaluated.clone();
            move || {
                *evaluated.lock() = true;
                Ok(Value::from("sendmail"))
            }
        });
        let blueprint = Blueprint::new("Mailer").with_params(Params::new().with("transport", transport));
        assert!(!*evaluated.lock());

        let mailer = build(&container, &blueprint).unwrap();
        assert!(*evaluated.lock());
        assert_eq!(mailer.downcast_ref::<Mailer>().unwrap().transport, "sendmail");
    }

    #[test]
    #[traced_test]
    fn test_build_errors() {
        let constructed = Arc::new(AtomicU8::new(0));
        let container = container(constructed.clone());
        let blueprint = Blueprint::new("Mailer").with_params(Params::new().with("transport", 25i64));

        assert!(matches!(
            build(&container, &blueprint),
            Err(ResolveErrorKind::Construction {
                source: InstantiateErrorKind::MismatchedArgument { .. },
                ..
            })
        ));
        assert!(matches!(
            build(&container, &Blueprint::new("Transport")),
            Err(ResolveErrorKind::Reflection(ReflectionErrorKind::NotInstantiable { .. }))
        ));

        let blueprint = Blueprint::new("Mailer")
            .with_params(Params::new().with("transport", "smtp"))
            .with_setters(Setters::new().with("setMissing", true));
        assert!(matches!(
            build(&container, &blueprint),
            Err(ResolveErrorKind::SetterNotFound { method, .. }) if method == "setMissing"
        ));

        let blueprint = Blueprint::new("Mailer")
            .with_params(Params::new().with("transport", "smtp"))
            .with_setters(Setters::new().with("setRetries", "many"));
        assert!(matches!(build(&container, &blueprint), Err(ResolveErrorKind::Setter { .. })));
        assert!(logs_contain("retries must be an int"));
        assert_eq!(constructed.load(Ordering::SeqCst), 3);
    }
}
