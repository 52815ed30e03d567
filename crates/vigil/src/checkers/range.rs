use crate::checker::BUILTIN_CHECKERS;
use crate::checker::Checker;
use crate::checker::CheckerFactory;
use crate::checker::CheckerRegistry;
use crate::declaration::Declaration;
use crate::error::EngineError;
use crate::render::render;
use crate::value::Value;

use linkme::distributed_slice;

/// Checks that a value is within a closed range. Applies to fields of any
/// numeric type.
pub struct RangeChecker {
    declaration: &'static Declaration,
    min: f64,
    max: f64,
}

#[distributed_slice(BUILTIN_CHECKERS)]
static REGISTER: (&'static str, CheckerFactory) = ("range", RangeChecker::factory);

impl RangeChecker {
    fn factory(
        declaration: &'static Declaration,
        _registry: &CheckerRegistry,
    ) -> Result<Box<dyn Checker>, EngineError> {
        let min = declaration.float_param("min", f64::MIN);
        let max = declaration.float_param("max", f64::MAX);
        if min > max {
            return Err(EngineError::InvalidParams {
                kind: declaration.kind,
                reason: "min must be less or equal than max".to_string(),
            });
        }
        Ok(Box::new(RangeChecker {
            declaration,
            min,
            max,
        }))
    }

    fn number_of(value: &Value<'_>) -> Result<f64, EngineError> {
        match value {
            Value::Int(number) => Ok(*number as f64),
            Value::Float(number) => Ok(*number),
            other => Err(EngineError::NotNumeric { kind: other.kind() }),
        }
    }
}

impl Checker for RangeChecker {
    fn is_valid(&self, value: &Value<'_>) -> Result<bool, EngineError> {
        if value.is_null() {
            return Ok(true);
        }
        let number = Self::number_of(value)?;
        Ok(number >= self.min && number <= self.max)
    }

    fn message(&self) -> String {
        render(self.declaration.message, self.declaration, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::ParamValue;

    static DECLARATION: Declaration = Declaration {
        kind: "Range",
        checked_by: Some("range"),
        message: "must be#if(min) at least {min}#endif#if(max) at most {max}#endif.",
        params: &[
            ("min", ParamValue::Float(1.0)),
            ("max", ParamValue::Float(100.0)),
        ],
    };

    fn checker() -> Box<dyn Checker> {
        RangeChecker::factory(&DECLARATION, &CheckerRegistry::new()).unwrap()
    }

    #[test]
    fn test_numbers_within_range_pass() {
        let checker = checker();
        assert!(checker.is_valid(&Value::Null).unwrap());
        assert!(checker.is_valid(&Value::Int(1)).unwrap());
        assert!(checker.is_valid(&Value::Int(100)).unwrap());
        assert!(checker.is_valid(&Value::Float(25.5)).unwrap());
    }

    #[test]
    fn test_numbers_outside_range_fail() {
        let checker = checker();
        assert!(!checker.is_valid(&Value::Int(0)).unwrap());
        assert!(!checker.is_valid(&Value::Int(101)).unwrap());
        assert!(!checker.is_valid(&Value::Float(-0.5)).unwrap());
    }

    #[test]
    fn test_non_numeric_value_is_fatal() {
        let error = checker().is_valid(&Value::Str("ten")).unwrap_err();
        assert!(matches!(error, EngineError::NotNumeric { kind: "string" }));
    }

    #[test]
    fn test_message_drops_trailing_zero() {
        assert_eq!(checker().message(), "must be at least 1 at most 100.");
    }

    #[test]
    fn test_min_greater_than_max_is_rejected_eagerly() {
        static BROKEN: Declaration = Declaration {
            kind: "Range",
            checked_by: Some("range"),
            message: "",
            params: &[
                ("min", ParamValue::Float(10.0)),
                ("max", ParamValue::Float(1.0)),
            ],
        };
        let error = RangeChecker::factory(&BROKEN, &CheckerRegistry::new()).unwrap_err();
        assert!(matches!(error, EngineError::InvalidParams { .. }));
    }
}
