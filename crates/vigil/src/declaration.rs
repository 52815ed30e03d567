//! Static constraint declaration model.
//!
//! The derive macro compiles `#[validate(...)]` attributes into tables of
//! these types, one per annotated struct. Declarations are plain `'static`
//! data: a constraint kind, an optional checker binding, a message template,
//! and named parameters. The metadata module turns them into bound checkers.

use crate::value::Value;

/// All declarations attached to one type: the type-level constraints plus
/// the per-field constraint lists, in source order.
#[derive(Debug)]
pub struct TypeDeclarations {
    pub type_name: &'static str,
    pub type_constraints: &'static [Declaration],
    pub fields: &'static [FieldDeclarations],
}

/// The ordered constraint declarations attached to one field.
#[derive(Debug)]
pub struct FieldDeclarations {
    pub name: &'static str,
    pub constraints: &'static [Declaration],
}

/// One constraint declaration: a kind, an optional checker binding, a
/// message template, and bound parameters.
///
/// A declaration without a checker binding is a deep-validation marker
/// (`#[validate(valid)]`): the field is descended into but nothing is
/// evaluated against it directly.
#[derive(Debug)]
pub struct Declaration {
    pub kind: &'static str,
    pub checked_by: Option<&'static str>,
    pub message: &'static str,
    pub params: &'static [(&'static str, ParamValue)],
}

impl Declaration {
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|(param, _)| *param == name)
            .map(|(_, value)| value)
    }

    pub fn int_param(&self, name: &str, default: i64) -> i64 {
        match self.param(name) {
            Some(ParamValue::Int(value)) => *value,
            _ => default,
        }
    }

    pub fn float_param(&self, name: &str, default: f64) -> f64 {
        match self.param(name) {
            Some(ParamValue::Float(value)) => *value,
            Some(ParamValue::Int(value)) => *value as f64,
            _ => default,
        }
    }

    pub fn bool_param(&self, name: &str, default: bool) -> bool {
        match self.param(name) {
            Some(ParamValue::Bool(value)) => *value,
            _ => default,
        }
    }

    pub fn str_param(&self, name: &str) -> Option<&'static str> {
        match self.param(name) {
            Some(ParamValue::Str(value)) => Some(value),
            _ => None,
        }
    }

    pub fn str_list_param(&self, name: &str) -> &'static [&'static str] {
        match self.param(name) {
            Some(ParamValue::StrList(values)) => values,
            _ => &[],
        }
    }

    pub fn type_param(&self, name: &str) -> TypeRef {
        match self.param(name) {
            Some(ParamValue::Type(type_ref)) => *type_ref,
            _ => TypeRef::NONE,
        }
    }

    pub fn type_list_param(&self, name: &str) -> &'static [TypeRef] {
        match self.param(name) {
            Some(ParamValue::TypeList(types)) => types,
            _ => &[],
        }
    }

    pub fn group_param(&self, name: &str) -> &'static [Declaration] {
        match self.param(name) {
            Some(ParamValue::Group(declarations)) => declarations,
            _ => &[],
        }
    }
}

/// A parameter value bound in a declaration.
#[derive(Debug)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'static str),
    StrList(&'static [&'static str]),
    Type(TypeRef),
    TypeList(&'static [TypeRef]),
    /// Nested sub-declarations of a composite constraint.
    Group(&'static [Declaration]),
}

/// A reference to an expected value type, usable in `const` declaration
/// tables. Scalar references match on the `Value` variant; object references
/// match the short type name of a nested `Validatable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeRef {
    name: &'static str,
    kind: TypeRefKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeRefKind {
    None,
    Str,
    Int,
    Float,
    Bool,
    Char,
    Path,
    Object,
}

impl TypeRef {
    /// The "no type" sentinel, e.g. an unset map key class.
    pub const NONE: TypeRef = TypeRef {
        name: "",
        kind: TypeRefKind::None,
    };

    pub const STRING: TypeRef = TypeRef {
        name: "String",
        kind: TypeRefKind::Str,
    };

    pub const INTEGER: TypeRef = TypeRef {
        name: "Integer",
        kind: TypeRefKind::Int,
    };

    pub const FLOAT: TypeRef = TypeRef {
        name: "Float",
        kind: TypeRefKind::Float,
    };

    pub const BOOLEAN: TypeRef = TypeRef {
        name: "Boolean",
        kind: TypeRefKind::Bool,
    };

    pub const CHAR: TypeRef = TypeRef {
        name: "Char",
        kind: TypeRefKind::Char,
    };

    pub const PATH: TypeRef = TypeRef {
        name: "Path",
        kind: TypeRefKind::Path,
    };

    /// Reference to an annotated object type, matched by short type name.
    pub const fn object(name: &'static str) -> TypeRef {
        TypeRef {
            name,
            kind: TypeRefKind::Object,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.kind, TypeRefKind::None)
    }

    /// Short name used in rendered messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn matches(&self, value: &Value<'_>) -> bool {
        match self.kind {
            TypeRefKind::None => false,
            TypeRefKind::Str => matches!(value, Value::Str(_)),
            TypeRefKind::Int => matches!(value, Value::Int(_)),
            TypeRefKind::Float => matches!(value, Value::Float(_)),
            TypeRefKind::Bool => matches!(value, Value::Bool(_)),
            TypeRefKind::Char => matches!(value, Value::Char(_)),
            TypeRefKind::Path => matches!(value, Value::Path(_)),
            TypeRefKind::Object => match value {
                Value::Object(object) => short_name(object.type_name()) == self.name,
                _ => false,
            },
        }
    }
}

/// Last path segment of a fully-qualified type name.
pub(crate) fn short_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}
