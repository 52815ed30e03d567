use crate::checker::BUILTIN_CHECKERS;
use crate::checker::Checker;
use crate::checker::CheckerFactory;
use crate::checker::CheckerRegistry;
use crate::declaration::Declaration;
use crate::error::EngineError;
use crate::render::render;
use crate::value::Value;

use linkme::distributed_slice;

/// Checks that a text's length or a container's size is within a closed
/// range. Applies to strings, lists, and maps.
pub struct SizeChecker {
    declaration: &'static Declaration,
    min: i64,
    max: i64,
}

#[distributed_slice(BUILTIN_CHECKERS)]
static REGISTER: (&'static str, CheckerFactory) = ("size", SizeChecker::factory);

impl SizeChecker {
    fn factory(
        declaration: &'static Declaration,
        _registry: &CheckerRegistry,
    ) -> Result<Box<dyn Checker>, EngineError> {
        let min = declaration.int_param("min", 0);
        let max = declaration.int_param("max", i64::MAX);
        if min > max {
            return Err(EngineError::InvalidParams {
                kind: declaration.kind,
                reason: "min must be less or equal than max".to_string(),
            });
        }
        Ok(Box::new(SizeChecker {
            declaration,
            min,
            max,
        }))
    }

    fn size_of(value: &Value<'_>) -> Result<i64, EngineError> {
        match value {
            Value::Str(text) => Ok(text.chars().count() as i64),
            Value::List(items) => Ok(items.len() as i64),
            Value::Map(entries) => Ok(entries.len() as i64),
            other => Err(EngineError::NotSized { kind: other.kind() }),
        }
    }
}

impl Checker for SizeChecker {
    fn is_valid(&self, value: &Value<'_>) -> Result<bool, EngineError> {
        if value.is_null() {
            return Ok(true);
        }
        let size = Self::size_of(value)?;
        Ok(size >= self.min && size <= self.max)
    }

    fn message(&self) -> String {
        render(self.declaration.message, self.declaration, &[])
    }
}
