use alloc::string::String;

use super::{instantiate::InstantiateErrorKind, reflection::ReflectionErrorKind, resource::ResourceErrorKind};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Service `{name}` not found in container")]
    ServiceNotFound { name: String },
    #[error("Named value `{key}` isn't set")]
    ValueNotFound { key: String },
    #[error("Service `{name}` resolved to {actual}, expected an object")]
    NotAnObject { name: String, actual: &'static str },
    #[error("Incorrect instance type. Actual class: {actual}, expected: {expected}")]
    IncorrectType { expected: &'static str, actual: String },
    #[error("Parameter `{param}` of `{class}` has no value and can't be resolved")]
    UnresolvableParameter { class: String, param: String },
    #[error(transparent)]
    Reflection(#[from] ReflectionErrorKind),
    #[error(transparent)]
    Resource(#[from] ResourceErrorKind),
    #[error("Constructor of `{class}` failed: {source}")]
    Construction {
        class: String,
        #[source]
        source: InstantiateErrorKind,
    },
    #[error("Setter `{method}` of `{class}` failed: {source}")]
    Setter {
        class: String,
        method: String,
        #[source]
        source: InstantiateErrorKind,
    },
    #[error("Setter `{method}` not found in `{class}`")]
    SetterNotFound { class: String, method: String },
    #[error("Lazy computation failed: {0}")]
    Computation(#[source] InstantiateErrorKind),
}
