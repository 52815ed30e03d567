use crate::checker::BUILTIN_CHECKERS;
use crate::checker::Checker;
use crate::checker::CheckerFactory;
use crate::checker::CheckerRegistry;
use crate::declaration::Declaration;
use crate::error::EngineError;
use crate::render::render;
use crate::value::Value;

use linkme::distributed_slice;

/// Checks that a value is present: not null, and not an empty collection
/// or map. Applies to fields of any type.
pub struct RequiredChecker {
    declaration: &'static Declaration,
}

#[distributed_slice(BUILTIN_CHECKERS)]
static REGISTER: (&'static str, CheckerFactory) = ("required", RequiredChecker::factory);

impl RequiredChecker {
    fn factory(
        declaration: &'static Declaration,
        _registry: &CheckerRegistry,
    ) -> Result<Box<dyn Checker>, EngineError> {
        Ok(Box::new(RequiredChecker { declaration }))
    }
}

impl Checker for RequiredChecker {
    fn is_valid(&self, value: &Value<'_>) -> Result<bool, EngineError> {
        Ok(match value {
            Value::Null => false,
            Value::List(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
            _ => true,
        })
    }

    fn message(&self) -> String {
        render(self.declaration.message, self.declaration, &[])
    }
}
