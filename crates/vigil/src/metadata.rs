//! Compiled per-type metadata and the process-wide cache.
//!
//! A type's declaration table is compiled exactly once per distinct runtime
//! type for the lifetime of the cache: every declaration with a checker
//! binding is instantiated and initialized eagerly, and the resulting
//! record is shared read-only across all subsequent validations.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use tracing::debug;

use crate::checker::Checker;
use crate::checker::CheckerRegistry;
use crate::declaration::TypeDeclarations;
use crate::error::EngineError;
use crate::value::Validatable;

/// Compiled metadata for one type: bound type-level checkers followed by
/// per-field checker lists, both in declaration order.
#[derive(Debug)]
pub struct TypeMetadata {
    pub type_name: &'static str,
    pub type_constraints: Vec<ConstraintMetadata>,
    pub fields: Vec<FieldMetadata>,
}

/// One field and its bound checkers, in declaration order.
#[derive(Debug)]
pub struct FieldMetadata {
    pub name: &'static str,
    pub constraints: Vec<ConstraintMetadata>,
}

/// One compiled constraint. Deep-validation markers carry no checker; they
/// only make the traversal descend into the field.
#[derive(Debug)]
pub struct ConstraintMetadata {
    pub kind: &'static str,
    pub checker: Option<Box<dyn Checker>>,
}

impl TypeMetadata {
    fn build(
        declarations: &'static TypeDeclarations,
        registry: &CheckerRegistry,
    ) -> Result<Self, EngineError> {
        let type_constraints = compile_constraints(declarations.type_constraints, registry)?;
        let mut fields = Vec::with_capacity(declarations.fields.len());
        for field in declarations.fields {
            fields.push(FieldMetadata {
                name: field.name,
                constraints: compile_constraints(field.constraints, registry)?,
            });
        }
        debug!(type_name = declarations.type_name, "compiled validation metadata");
        Ok(TypeMetadata {
            type_name: declarations.type_name,
            type_constraints,
            fields,
        })
    }
}

fn compile_constraints(
    declarations: &'static [crate::declaration::Declaration],
    registry: &CheckerRegistry,
) -> Result<Vec<ConstraintMetadata>, EngineError> {
    declarations
        .iter()
        .map(|declaration| {
            let checker = match declaration.checked_by {
                Some(kind) => Some(registry.instantiate(kind, declaration)?),
                None => None,
            };
            Ok(ConstraintMetadata {
                kind: declaration.kind,
                checker,
            })
        })
        .collect()
}

/// Cache of compiled metadata, keyed by runtime type identity.
///
/// Population is insert-if-absent with first-writer-wins semantics: two
/// threads racing on a previously unseen type both build a record, one
/// insert wins, and readers only ever observe complete records.
pub struct MetadataCache {
    types: RwLock<HashMap<TypeId, Arc<TypeMetadata>>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        MetadataCache {
            types: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(
        &self,
        object: &dyn Validatable,
        registry: &CheckerRegistry,
    ) -> Result<Arc<TypeMetadata>, EngineError> {
        let key = object.type_key();
        {
            let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(metadata) = types.get(&key) {
                return Ok(metadata.clone());
            }
        }

        let built = Arc::new(TypeMetadata::build(object.declarations(), registry)?);
        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        Ok(types.entry(key).or_insert(built).clone())
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}
