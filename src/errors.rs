mod container;
mod instantiate;
mod reflection;
mod resolve;
mod resource;

pub use container::ConfigErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use reflection::ReflectionErrorKind;
pub use resolve::ResolveErrorKind;
pub use resource::ResourceErrorKind;
