#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod errors;
pub(crate) mod factory;
pub(crate) mod instantiator;
pub(crate) mod lazy;
pub(crate) mod loader;
pub(crate) mod param;
pub(crate) mod reflection;
pub(crate) mod resolver;
pub(crate) mod table;
pub(crate) mod value;

pub use any::Object;
pub use config::Config;
pub use container::Container;
pub use errors::{ConfigErrorKind, InstantiateErrorKind, ReflectionErrorKind, ResolveErrorKind, ResourceErrorKind};
pub use factory::Factory;
pub use lazy::{Blueprint, Lazy, LazyReference, LazyValue};
pub use loader::ResourceLoader;
pub use param::{OrderedMap, Param, ParamKey, Params, Setters};
pub use reflection::{Args, Capability, CapabilityKind, Catalog, ClassDef, ClassDescriptor, ParamDef, Reflector, TypeHint};
pub use value::Value;

#[cfg(feature = "std")]
pub use loader::FsLoader;
#[cfg(not(feature = "std"))]
pub use loader::NoLoader;
