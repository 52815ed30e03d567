//! Erased runtime view of the values the engine traverses.
//!
//! `Value` collapses every field a validated type can expose into a small
//! set of shapes: scalars (never descended into), strings, file paths,
//! lists, maps, and nested objects. `AsValue` produces the view; the derive
//! macro implements it for annotated types, and this module implements it
//! for the standard containers and primitives.

use std::any::TypeId;
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::OnceLock;

use crate::declaration::TypeDeclarations;

/// A type that exposes its constraint declarations and field values to the
/// validation engine. Implemented by `#[derive(Validate)]`.
pub trait Validatable {
    /// Fully-qualified type name, used for metadata and diagnostics.
    fn type_name(&self) -> &'static str;

    /// Cache key for this type's compiled metadata.
    fn type_key(&self) -> TypeId;

    /// The static declaration table generated for this type.
    fn declarations(&self) -> &'static TypeDeclarations;

    /// Read the current value of a declared field by name.
    fn field(&self, name: &str) -> Option<Value<'_>>;
}

/// Address of an object, used to key the per-call visited set. Identity is
/// the data pointer, so two structurally equal but distinct objects get
/// distinct identities while `Rc`-shared references coincide.
pub(crate) fn object_identity(object: &dyn Validatable) -> usize {
    object as *const dyn Validatable as *const () as usize
}

/// An erased view of one value in the object graph.
#[derive(Clone)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(&'a str),
    Path(&'a Path),
    List(Vec<Value<'a>>),
    Map(Vec<(Value<'a>, Value<'a>)>),
    Object(&'a dyn Validatable),
}

impl<'a> Value<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short descriptive name for diagnostics, e.g. "string" or the type
    /// name of a nested object.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Path(_) => "path",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(object) => object.type_name(),
        }
    }

    /// Display form used for map keys in violation paths.
    pub fn display_key(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(value) => value.to_string(),
            Value::Int(value) => value.to_string(),
            Value::Float(value) => value.to_string(),
            Value::Char(value) => value.to_string(),
            Value::Str(value) => (*value).to_string(),
            Value::Path(value) => value.display().to_string(),
            other => other.kind().to_string(),
        }
    }
}

impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Objects compare by identity, matching the visited set.
            (Value::Object(a), Value::Object(b)) => {
                object_identity(*a) == object_identity(*b)
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(value) => write!(f, "Bool({})", value),
            Value::Int(value) => write!(f, "Int({})", value),
            Value::Float(value) => write!(f, "Float({})", value),
            Value::Char(value) => write!(f, "Char({:?})", value),
            Value::Str(value) => write!(f, "Str({:?})", value),
            Value::Path(value) => write!(f, "Path({:?})", value),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Value::Object(object) => write!(f, "Object({})", object.type_name()),
        }
    }
}

/// Conversion into the erased `Value` view.
///
/// The derive macro emits an implementation for every annotated type
/// (returning `Value::Object`); the implementations below cover scalars and
/// the standard containers so any reasonable field type composes.
pub trait AsValue {
    fn as_value(&self) -> Value<'_>;
}

macro_rules! as_value_int {
    ($($ty:ty),*) => {
        $(impl AsValue for $ty {
            fn as_value(&self) -> Value<'_> {
                Value::Int(*self as i64)
            }
        })*
    };
}

as_value_int!(i8, i16, i32, i64, isize, u8, u16, u32);

impl AsValue for u64 {
    fn as_value(&self) -> Value<'_> {
        Value::Int(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

impl AsValue for usize {
    fn as_value(&self) -> Value<'_> {
        Value::Int(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

impl AsValue for f32 {
    fn as_value(&self) -> Value<'_> {
        Value::Float(f64::from(*self))
    }
}

impl AsValue for f64 {
    fn as_value(&self) -> Value<'_> {
        Value::Float(*self)
    }
}

impl AsValue for bool {
    fn as_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl AsValue for char {
    fn as_value(&self) -> Value<'_> {
        Value::Char(*self)
    }
}

impl AsValue for String {
    fn as_value(&self) -> Value<'_> {
        Value::Str(self)
    }
}

impl AsValue for &str {
    fn as_value(&self) -> Value<'_> {
        Value::Str(self)
    }
}

impl AsValue for PathBuf {
    fn as_value(&self) -> Value<'_> {
        Value::Path(self)
    }
}

impl AsValue for &Path {
    fn as_value(&self) -> Value<'_> {
        Value::Path(self)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(&self) -> Value<'_> {
        match self {
            Some(inner) => inner.as_value(),
            None => Value::Null,
        }
    }
}

impl<T: AsValue> AsValue for Vec<T> {
    fn as_value(&self) -> Value<'_> {
        Value::List(self.iter().map(AsValue::as_value).collect())
    }
}

impl<T: AsValue> AsValue for VecDeque<T> {
    fn as_value(&self) -> Value<'_> {
        Value::List(self.iter().map(AsValue::as_value).collect())
    }
}

impl<T: AsValue, const N: usize> AsValue for [T; N] {
    fn as_value(&self) -> Value<'_> {
        Value::List(self.iter().map(AsValue::as_value).collect())
    }
}

impl<T: AsValue> AsValue for HashSet<T> {
    fn as_value(&self) -> Value<'_> {
        Value::List(self.iter().map(AsValue::as_value).collect())
    }
}

impl<T: AsValue> AsValue for BTreeSet<T> {
    fn as_value(&self) -> Value<'_> {
        Value::List(self.iter().map(AsValue::as_value).collect())
    }
}

impl<K: AsValue, V: AsValue> AsValue for HashMap<K, V> {
    fn as_value(&self) -> Value<'_> {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.as_value(), value.as_value()))
                .collect(),
        )
    }
}

impl<K: AsValue, V: AsValue> AsValue for BTreeMap<K, V> {
    fn as_value(&self) -> Value<'_> {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.as_value(), value.as_value()))
                .collect(),
        )
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_value(&self) -> Value<'_> {
        (**self).as_value()
    }
}

impl<T: AsValue> AsValue for Rc<T> {
    fn as_value(&self) -> Value<'_> {
        (**self).as_value()
    }
}

impl<T: AsValue> AsValue for Arc<T> {
    fn as_value(&self) -> Value<'_> {
        (**self).as_value()
    }
}

impl<T: AsValue> AsValue for OnceCell<T> {
    fn as_value(&self) -> Value<'_> {
        match self.get() {
            Some(inner) => inner.as_value(),
            None => Value::Null,
        }
    }
}

impl<T: AsValue> AsValue for OnceLock<T> {
    fn as_value(&self) -> Value<'_> {
        match self.get() {
            Some(inner) => inner.as_value(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_map_to_expected_variants() {
        assert_eq!(5i32.as_value(), Value::Int(5));
        assert_eq!(9.5f64.as_value(), Value::Float(9.5));
        assert_eq!(true.as_value(), Value::Bool(true));
        assert_eq!('x'.as_value(), Value::Char('x'));
        assert_eq!("qwerty".to_string().as_value(), Value::Str("qwerty"));
    }

    #[test]
    fn test_option_none_is_null() {
        let value: Option<String> = None;
        assert!(value.as_value().is_null());
        assert_eq!(Some(7u8).as_value(), Value::Int(7));
    }

    #[test]
    fn test_containers_map_to_lists_and_maps() {
        let list = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            list.as_value(),
            Value::List(vec![Value::Str("a"), Value::Str("b")])
        );

        let mut map = BTreeMap::new();
        map.insert("key".to_string(), 17i64);
        assert_eq!(
            map.as_value(),
            Value::Map(vec![(Value::Str("key"), Value::Int(17))])
        );
    }

    #[test]
    fn test_deep_equality_spans_containers() {
        let a = vec![vec![1i32, 2], vec![3]];
        let b = vec![vec![1i32, 2], vec![3]];
        assert_eq!(a.as_value(), b.as_value());

        let c = vec![vec![1i32, 2], vec![4]];
        assert_ne!(a.as_value(), c.as_value());
    }
}
