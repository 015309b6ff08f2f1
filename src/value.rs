use alloc::{collections::BTreeMap, string::String, vec::Vec};

use crate::any::Object;

/// Resolved value passed to constructors and setters.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(Object),
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(val) => Some(*val),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(val) => Some(*val),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(val) => Some(*val),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(val) => Some(val),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(val) => Some(val),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(val) => Some(val),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(val) => Some(val),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(val: $ty) -> Self {
                    Value::$variant(val $(as $cast)?)
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    i64 => Int,
    i32 => Int as i64,
    u32 => Int as i64,
    u8 => Int as i64,
    f64 => Float,
    String => Str,
    Vec<Value> => List,
    BTreeMap<String, Value> => Map,
    Object => Object,
}

impl From<&str> for Value {
    #[inline]
    fn from(val: &str) -> Self {
        Value::Str(val.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(val: Option<T>) -> Self {
        val.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use crate::Object;

    use alloc::{string::String, vec};

    #[test]
    fn test_from() {
        assert_eq!(Value::from(1i32), Value::Int(1));
        assert_eq!(Value::from("bar"), Value::Str(String::from("bar")));
        assert_eq!(Value::from(None::<bool>), Value::Null);
        assert_eq!(Value::from(vec![Value::from(true)]).as_list().map(<[Value]>::len), Some(1));
    }

    #[test]
    fn test_accessors() {
        let object = Object::new(1u8);
        let value = Value::from(object.clone());

        assert!(Object::ptr_eq(value.as_object().unwrap(), &object));
        assert_eq!(value.kind(), "object");
        assert_eq!(Value::Null.as_str(), None);
        assert!(Value::default().is_null());
    }
}
