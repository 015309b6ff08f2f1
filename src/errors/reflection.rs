use alloc::string::String;

#[derive(thiserror::Error, Debug)]
pub enum ReflectionErrorKind {
    #[error("Class `{class}` is unknown to reflector")]
    UnknownClass { class: String },
    #[error("Class `{class}` has no constructor and can't be instantiated")]
    NotInstantiable { class: String },
    #[error("Inheritance cycle detected in parents of `{class}`")]
    InheritanceCycle { class: String },
}
