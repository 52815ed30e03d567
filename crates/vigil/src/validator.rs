//! The traversal engine.
//!
//! `Validator` walks an object graph guided by cached metadata, evaluates
//! every bound checker, and collects violations with dotted path names.
//! Violations never abort the walk; engine errors abort the whole call.

use std::collections::HashSet;

use crate::checker::CheckerRegistry;
use crate::error::EngineError;
use crate::metadata::MetadataCache;
use crate::path::PathNode;
use crate::value::object_identity;
use crate::value::Validatable;
use crate::value::Value;
use crate::violation::Violation;

/// Main entry point of the validation process.
///
/// A `Validator` owns its checker registry and metadata cache; sharing one
/// instance across threads shares the compiled metadata. Each `validate`
/// call carries its own context, so independent calls may run concurrently.
pub struct Validator {
    registry: CheckerRegistry,
    cache: MetadataCache,
}

/// Per-call state: the growing violation list and the identities of
/// already-visited objects, which breaks cycles and avoids re-validating
/// shared sub-objects.
struct ValidationContext<'a> {
    violations: Vec<Violation<'a>>,
    visited: HashSet<usize>,
}

impl<'a> ValidationContext<'a> {
    fn new() -> Self {
        ValidationContext {
            violations: Vec::new(),
            visited: HashSet::new(),
        }
    }

    /// Mark an object visited. Returns false if it already was.
    fn visit(&mut self, object: &dyn Validatable) -> bool {
        self.visited.insert(object_identity(object))
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::with_registry(CheckerRegistry::new())
    }

    /// Build a validator around a registry carrying custom checker kinds.
    pub fn with_registry(registry: CheckerRegistry) -> Self {
        Validator {
            registry,
            cache: MetadataCache::new(),
        }
    }

    /// Check the whole object graph against its declared constraints and
    /// return every violation, in deterministic order: for each visited
    /// object, type-level constraints before field-level constraints,
    /// fields in declaration order, elements in iteration order.
    pub fn validate<'a>(
        &self,
        object: &'a dyn Validatable,
    ) -> Result<Vec<Violation<'a>>, EngineError> {
        let mut context = ValidationContext::new();
        let root = PathNode::root();
        self.validate_object(object, &mut context, &root)?;
        Ok(context.violations)
    }

    fn validate_object<'a>(
        &self,
        object: &'a dyn Validatable,
        context: &mut ValidationContext<'a>,
        path: &PathNode<'_>,
    ) -> Result<(), EngineError> {
        if !context.visit(object) {
            return Ok(());
        }
        let metadata = self.cache.get(object, &self.registry)?;

        let as_value = Value::Object(object);
        for constraint in &metadata.type_constraints {
            if let Some(checker) = &constraint.checker {
                if !checker.is_valid(&as_value)? {
                    // The "in " prefix disambiguates type-level violations
                    // from field-level ones sharing the same path.
                    let rendered = path.render();
                    let name = if rendered.is_empty() {
                        rendered
                    } else {
                        format!("in {}", rendered)
                    };
                    context
                        .violations
                        .push(Violation::new(as_value.clone(), name, checker.message()));
                }
            }
        }

        for field in &metadata.fields {
            let field_value =
                object
                    .field(field.name)
                    .ok_or_else(|| EngineError::UnknownField {
                        type_name: metadata.type_name,
                        field: field.name.to_string(),
                    })?;
            let field_path = path.child(field.name);
            for constraint in &field.constraints {
                if let Some(checker) = &constraint.checker {
                    if !checker.is_valid(&field_value)? {
                        context.violations.push(Violation::new(
                            field_value.clone(),
                            field_path.render(),
                            checker.message(),
                        ));
                    }
                }
            }
            self.descend(&field_value, context, &field_path)?;
        }
        Ok(())
    }

    /// Recurse into a field value: nested objects directly, collection
    /// elements at `.<index>`, map entry values at `.<key>`. Scalars and
    /// nulls are never descended into.
    fn descend<'a>(
        &self,
        value: &Value<'a>,
        context: &mut ValidationContext<'a>,
        path: &PathNode<'_>,
    ) -> Result<(), EngineError> {
        match value {
            Value::Object(object) => self.validate_object(*object, context, path),
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    let segment = index.to_string();
                    let item_path = path.child(&segment);
                    self.descend(item, context, &item_path)?;
                }
                Ok(())
            }
            Value::Map(entries) => {
                for (key, entry_value) in entries {
                    let segment = key.display_key();
                    let entry_path = path.child(&segment);
                    self.descend(entry_value, context, &entry_path)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
