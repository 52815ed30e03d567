use std::str::FromStr;

use strum::EnumString;

use crate::checker::BUILTIN_CHECKERS;
use crate::checker::Checker;
use crate::checker::CheckerFactory;
use crate::checker::CheckerRegistry;
use crate::declaration::Declaration;
use crate::declaration::TypeRef;
use crate::error::EngineError;
use crate::render::render;
use crate::value::Value;

use linkme::distributed_slice;

/// Expected container shape of a structurally checked value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Schema {
    Direct,
    Coll,
    CollColl,
    Map,
    MapColl,
}

/// Checks that a value's runtime shape matches a schema: a direct instance
/// of one of the base types, a collection of them, a collection of
/// collections, a map, or a map of collections.
///
/// Outer and inner collections are bound by `max_size` / `max_inner_size`,
/// element nulls by `allow_null` / `allow_inner_null`, and only the first
/// `max_checks` elements of any level are inspected; elements beyond the
/// cap are assumed valid. A top-level null is always valid. Every shape
/// mismatch fails closed rather than erroring.
pub struct ObjectTypeChecker {
    declaration: &'static Declaration,
    schema: Schema,
    base: &'static [TypeRef],
    key: TypeRef,
    max_size: i64,
    max_inner_size: i64,
    max_checks: usize,
    allow_null: bool,
    allow_inner_null: bool,
}

#[distributed_slice(BUILTIN_CHECKERS)]
static REGISTER: (&'static str, CheckerFactory) = ("object_type", ObjectTypeChecker::factory);

impl ObjectTypeChecker {
    fn factory(
        declaration: &'static Declaration,
        _registry: &CheckerRegistry,
    ) -> Result<Box<dyn Checker>, EngineError> {
        let schema_name = declaration.str_param("schema").unwrap_or("direct");
        let schema = Schema::from_str(schema_name).map_err(|_| EngineError::InvalidParams {
            kind: declaration.kind,
            reason: format!("unknown schema '{}'", schema_name),
        })?;
        let base = declaration.type_list_param("base");
        if base.is_empty() {
            return Err(EngineError::InvalidParams {
                kind: declaration.kind,
                reason: "at least one base type is required".to_string(),
            });
        }
        let max_checks = declaration.int_param("max_checks", 20);
        Ok(Box::new(ObjectTypeChecker {
            declaration,
            schema,
            base,
            key: declaration.type_param("key"),
            max_size: declaration.int_param("max_size", i64::MAX),
            max_inner_size: declaration.int_param("max_inner_size", i64::MAX),
            max_checks: usize::try_from(max_checks).unwrap_or(usize::MAX),
            allow_null: declaration.bool_param("allow_null", true),
            allow_inner_null: declaration.bool_param("allow_inner_null", true),
        }))
    }

    fn matches_base(&self, value: &Value<'_>) -> bool {
        self.base.iter().any(|base| base.matches(value))
    }

    fn key_ok(&self, key: &Value<'_>) -> bool {
        self.key.is_none() || self.key.matches(key)
    }

    /// The outer collection of a `coll` schema: bound by `max_size`,
    /// element nulls governed by `allow_null`.
    fn collection_ok(&self, items: &[Value<'_>]) -> bool {
        if items.len() as i64 > self.max_size {
            return false;
        }
        items.iter().take(self.max_checks).all(|item| match item {
            Value::Null => self.allow_null,
            other => self.matches_base(other),
        })
    }

    /// An inner collection of a `coll_coll` / `map_coll` schema: bound by
    /// `max_inner_size`, element nulls governed by `allow_inner_null`.
    fn inner_collection_ok(&self, items: &[Value<'_>]) -> bool {
        if items.len() as i64 > self.max_inner_size {
            return false;
        }
        items.iter().take(self.max_checks).all(|item| match item {
            Value::Null => self.allow_inner_null,
            other => self.matches_base(other),
        })
    }

    fn collection_of_collections_ok(&self, items: &[Value<'_>]) -> bool {
        if items.len() as i64 > self.max_size {
            return false;
        }
        items.iter().take(self.max_checks).all(|item| match item {
            Value::Null => self.allow_null,
            Value::List(inner) => self.inner_collection_ok(inner),
            _ => false,
        })
    }

    fn map_ok(&self, entries: &[(Value<'_>, Value<'_>)]) -> bool {
        if entries.len() as i64 > self.max_size {
            return false;
        }
        entries
            .iter()
            .take(self.max_checks)
            .all(|(key, value)| {
                self.key_ok(key)
                    && match value {
                        Value::Null => self.allow_null,
                        other => self.matches_base(other),
                    }
            })
    }

    fn map_of_collections_ok(&self, entries: &[(Value<'_>, Value<'_>)]) -> bool {
        if entries.len() as i64 > self.max_size {
            return false;
        }
        entries
            .iter()
            .take(self.max_checks)
            .all(|(key, value)| {
                self.key_ok(key)
                    && match value {
                        Value::Null => self.allow_null,
                        Value::List(inner) => self.inner_collection_ok(inner),
                        _ => false,
                    }
            })
    }

    /// Rendered description of the accepted shape, e.g.
    /// `Collection<String> and size at most 2`.
    fn describe(&self) -> String {
        let base = self
            .base
            .iter()
            .map(TypeRef::name)
            .collect::<Vec<_>>()
            .join("|");
        let key = if self.key.is_none() { "_" } else { self.key.name() };
        let mut message = match self.schema {
            Schema::Direct => base,
            Schema::Coll => format!("Collection<{}>", base),
            Schema::CollColl => format!("Collection<Collection<{}>>", base),
            Schema::Map => format!("Map<{}, {}>", key, base),
            Schema::MapColl => format!("Map<{}, Collection<{}>>", key, base),
        };
        if self.max_size != i64::MAX {
            message.push_str(&format!(" and size at most {}", self.max_size));
        }
        if !self.allow_null || !self.allow_inner_null {
            message.push_str(" and not contain nulls");
        }
        message
    }
}

impl Checker for ObjectTypeChecker {
    fn is_valid(&self, value: &Value<'_>) -> Result<bool, EngineError> {
        Ok(match value {
            Value::Null => true,
            _ => match self.schema {
                Schema::Direct => self.matches_base(value),
                Schema::Coll => match value {
                    Value::List(items) => self.collection_ok(items),
                    _ => false,
                },
                Schema::CollColl => match value {
                    Value::List(items) => self.collection_of_collections_ok(items),
                    _ => false,
                },
                Schema::Map => match value {
                    Value::Map(entries) => self.map_ok(entries),
                    _ => false,
                },
                Schema::MapColl => match value {
                    Value::Map(entries) => self.map_of_collections_ok(entries),
                    _ => false,
                },
            },
        })
    }

    fn message(&self) -> String {
        if self.declaration.message.is_empty() {
            self.describe()
        } else {
            render(self.declaration.message, self.declaration, &[])
        }
    }
}

/// Composite of repeated `object_type` declarations on one field: the value
/// is valid if any one of the declared shapes matches.
pub struct ObjectTypesChecker {
    declaration: &'static Declaration,
    shapes: Vec<Box<dyn Checker>>,
}

#[distributed_slice(BUILTIN_CHECKERS)]
static REGISTER_LIST: (&'static str, CheckerFactory) = ("object_types", ObjectTypesChecker::factory);

impl ObjectTypesChecker {
    fn factory(
        declaration: &'static Declaration,
        registry: &CheckerRegistry,
    ) -> Result<Box<dyn Checker>, EngineError> {
        let mut shapes = Vec::new();
        for sub_declaration in declaration.group_param("value") {
            let kind = sub_declaration.checked_by.unwrap_or("object_type");
            shapes.push(registry.instantiate(kind, sub_declaration)?);
        }
        if shapes.is_empty() {
            return Err(EngineError::InvalidParams {
                kind: declaration.kind,
                reason: "at least one object_type declaration is required".to_string(),
            });
        }
        Ok(Box::new(ObjectTypesChecker {
            declaration,
            shapes,
        }))
    }
}

impl Checker for ObjectTypesChecker {
    fn is_valid(&self, value: &Value<'_>) -> Result<bool, EngineError> {
        if value.is_null() {
            return Ok(true);
        }
        for shape in &self.shapes {
            if shape.is_valid(value)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn message(&self) -> String {
        let sub_messages: Vec<String> = self.shapes.iter().map(|shape| shape.message()).collect();
        render(self.declaration.message, self.declaration, &sub_messages)
    }
}
