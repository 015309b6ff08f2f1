use alloc::{boxed::Box, sync::Arc};
use core::{
    any::{type_name, Any},
    fmt::{self, Debug, Formatter},
    ptr,
};

pub(crate) type AnyInstance = dyn Any + Send + Sync;

/// Shared handle to an instance built by the container.
///
/// Clones point to the same instance, so [`Object::ptr_eq`] is the identity check
/// for services: every `get` of one service name yields handles that are `ptr_eq`.
#[derive(Clone)]
pub struct Object {
    class: Arc<str>,
    instance: Arc<AnyInstance>,
}

impl Object {
    /// Wraps a value created outside the container, using its Rust type name as class name.
    #[inline]
    #[must_use]
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::with_class(type_name::<T>(), value)
    }

    #[inline]
    #[must_use]
    pub fn with_class<T: Send + Sync + 'static>(class: impl Into<Arc<str>>, value: T) -> Self {
        Self {
            class: class.into(),
            instance: Arc::new(value),
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn from_boxed(class: &str, instance: Box<AnyInstance>) -> Self {
        Self {
            class: Arc::from(class),
            instance: Arc::from(instance),
        }
    }

    /// Name of the class the instance was built as
    #[inline]
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[inline]
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.instance.is::<T>()
    }

    #[inline]
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.instance.downcast_ref()
    }

    #[inline]
    #[must_use]
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.instance.clone().downcast().ok()
    }

    #[inline]
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        ptr::eq(Arc::as_ptr(&this.instance).cast::<()>(), Arc::as_ptr(&other.instance).cast::<()>())
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl Debug for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object").field("class", &self.class).finish_non_exhaustive()
    }
}
