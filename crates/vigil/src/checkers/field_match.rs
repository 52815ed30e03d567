use crate::checker::BUILTIN_CHECKERS;
use crate::checker::Checker;
use crate::checker::CheckerFactory;
use crate::checker::CheckerRegistry;
use crate::declaration::Declaration;
use crate::error::EngineError;
use crate::render::render;
use crate::value::Value;

use linkme::distributed_slice;

/// Type-level check that one named field deep-equals another.
pub struct FieldMatchChecker {
    declaration: &'static Declaration,
    first: &'static str,
    second: &'static str,
}

#[distributed_slice(BUILTIN_CHECKERS)]
static REGISTER: (&'static str, CheckerFactory) = ("field_match", FieldMatchChecker::factory);

impl FieldMatchChecker {
    fn factory(
        declaration: &'static Declaration,
        _registry: &CheckerRegistry,
    ) -> Result<Box<dyn Checker>, EngineError> {
        let first = declaration
            .str_param("first")
            .ok_or_else(|| EngineError::InvalidParams {
                kind: declaration.kind,
                reason: "the 'first' field name is required".to_string(),
            })?;
        let second = declaration
            .str_param("second")
            .ok_or_else(|| EngineError::InvalidParams {
                kind: declaration.kind,
                reason: "the 'second' field name is required".to_string(),
            })?;
        Ok(Box::new(FieldMatchChecker {
            declaration,
            first,
            second,
        }))
    }
}

impl Checker for FieldMatchChecker {
    fn is_valid(&self, value: &Value<'_>) -> Result<bool, EngineError> {
        let object = match value {
            Value::Null => return Ok(true),
            Value::Object(object) => *object,
            other => {
                return Err(EngineError::NotAnObject {
                    kind: self.declaration.kind,
                    found: other.kind(),
                })
            }
        };
        let first = read_field(object, self.first)?;
        let second = read_field(object, self.second)?;
        Ok(first == second)
    }

    fn message(&self) -> String {
        render(self.declaration.message, self.declaration, &[])
    }
}

pub(super) fn read_field<'a>(
    object: &'a dyn crate::value::Validatable,
    name: &str,
) -> Result<Value<'a>, EngineError> {
    object.field(name).ok_or_else(|| EngineError::UnknownField {
        type_name: object.type_name(),
        field: name.to_string(),
    })
}
