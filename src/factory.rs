use alloc::string::String;

use crate::{
    any::Object,
    container::Container,
    errors::ResolveErrorKind,
    param::{Param, ParamKey, Params, Setters},
};

/// Callable that builds a fresh instance of a class on every [`Factory::call`].
///
/// Call arguments are positional: argument `i` fills constructor parameter `i`,
/// winning over the fixed params for that slot. Setter defaults of the class apply as usual.
#[derive(Clone, Debug)]
pub struct Factory {
    class: String,
    params: Params,
}

impl Factory {
    #[inline]
    #[must_use]
    pub fn new(class: impl Into<String>, params: Params) -> Self {
        Self {
            class: class.into(),
            params,
        }
    }

    #[inline]
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// # Errors
    /// Returns any error of [`Container::new_instance_with`].
    pub fn call<I>(&self, container: &Container, args: I) -> Result<Object, ResolveErrorKind>
    where
        I: IntoIterator,
        I::Item: Into<Param>,
    {
        let mut params = self.params.clone();
        for (index, arg) in args.into_iter().enumerate() {
            params.insert(ParamKey::Position(index), arg);
        }
        container.new_instance_with(&self.class, params, Setters::new())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::Factory;
    use crate::{Args, Catalog, ClassDef, Container, Param, ParamDef, Params, Value};

    use alloc::{
        format,
        string::{String, ToString as _},
        sync::Arc,
        vec::Vec,
    };
    use tracing_test::traced_test;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
        label: String,
    }

    struct Canvas {
        factory: Arc<Factory>,
    }

    fn container() -> Container {
        Container::new(
            Catalog::new()
                .class(
                    ClassDef::new("Point")
                        .param(ParamDef::new("x").scalar())
                        .param(ParamDef::new("y").scalar().default(0i64))
                        .param(ParamDef::new("label").scalar())
                        .constructor(|args: &mut Args| {
                            Ok(Point {
                                x: args.int("x")?,
                                y: args.int("y")?,
                                label: args.string("label")?,
                            })
                        })
                        .setter("setLabel", |point: &mut Point, value: Value| {
                            point.label = value.as_str().unwrap_or_default().to_string();
                            Ok(())
                        }),
                )
                .class(
                    ClassDef::new("Canvas")
                        .param(ParamDef::new("factory").class("Factory"))
                        .constructor(|args: &mut Args| Ok(Canvas { factory: args.instance("factory")? })),
                ),
        )
    }

    #[test]
    #[traced_test]
    fn test_positional_args() {
        let container = container();
        let factory = container.new_factory_with("Point", Params::new().with("x", 1i64).with("label", "fixed"));

        let point = factory.call(&container, [10i64, 20i64]).unwrap();
        assert_eq!(
            point.downcast_ref::<Point>(),
            Some(&Point {
                x: 10,
                y: 20,
                label: String::from("fixed"),
            })
        );

        let point = factory.call(&container, Vec::<Param>::new()).unwrap();
        assert_eq!(point.downcast_ref::<Point>().map(|point| (point.x, point.y)), Some((1, 0)));

        let point_1 = factory.call(&container, [5i64]).unwrap();
        let point_2 = factory.call(&container, [5i64]).unwrap();
        assert_ne!(point_1, point_2);
    }

    #[test]
    #[traced_test]
    fn test_setter_defaults_apply() {
        let mut container = container();
        container.set_setter("Point", "setLabel", "from setter").unwrap();

        let factory = container.new_factory("Point");
        let err = factory.call(&container, [1i64, 2i64, 3i64]).unwrap_err();
        assert!(err.to_string().contains("label"));

        let point = factory.call(&container, [Param::from(1i64), Param::from(2i64), Param::from("arg")]).unwrap();
        assert_eq!(point.downcast_ref::<Point>().map(|point| point.label.as_str()), Some("from setter"));
    }

    #[test]
    #[traced_test]
    fn test_factory_injected() {
        let mut container = container();
        container.set_param("Canvas", "factory", container.new_factory("Point")).unwrap();

        let canvas = container.new_instance("Canvas").unwrap();
        let canvas = canvas.downcast_ref::<Canvas>().unwrap();
        assert_eq!(canvas.factory.class(), "Point");

        let point = canvas.factory.call(&container, [Param::from(7i64), Param::from(8i64), Param::from("drawn")]).unwrap();
        assert_eq!(point.downcast_ref::<Point>().map(|point| point.x), Some(7));
    }
}
