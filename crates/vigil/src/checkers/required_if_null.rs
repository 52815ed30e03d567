use crate::checker::BUILTIN_CHECKERS;
use crate::checker::Checker;
use crate::checker::CheckerFactory;
use crate::checker::CheckerRegistry;
use crate::checkers::field_match::read_field;
use crate::declaration::Declaration;
use crate::error::EngineError;
use crate::render::render;
use crate::value::Value;

use linkme::distributed_slice;

/// Type-level check that all listed fields have a value whenever the
/// `depends_on` field is null.
pub struct RequiredIfNullChecker {
    declaration: &'static Declaration,
    fields: &'static [&'static str],
    depends_on: &'static str,
}

#[distributed_slice(BUILTIN_CHECKERS)]
static REGISTER: (&'static str, CheckerFactory) =
    ("required_if_null", RequiredIfNullChecker::factory);

impl RequiredIfNullChecker {
    fn factory(
        declaration: &'static Declaration,
        _registry: &CheckerRegistry,
    ) -> Result<Box<dyn Checker>, EngineError> {
        let fields = declaration.str_list_param("fields");
        if fields.is_empty() {
            return Err(EngineError::InvalidParams {
                kind: declaration.kind,
                reason: "at least one dependent field is required".to_string(),
            });
        }
        let depends_on =
            declaration
                .str_param("depends_on")
                .ok_or_else(|| EngineError::InvalidParams {
                    kind: declaration.kind,
                    reason: "the 'depends_on' field name is required".to_string(),
                })?;
        Ok(Box::new(RequiredIfNullChecker {
            declaration,
            fields,
            depends_on,
        }))
    }
}

impl Checker for RequiredIfNullChecker {
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
        if !read_field(object, self.depends_on)?.is_null() {
            return Ok(true);
        }
        for field in self.fields {
            if read_field(object, field)?.is_null() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn message(&self) -> String {
        render(self.declaration.message, self.declaration, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::ParamValue;
    use crate::declaration::TypeDeclarations;
    use crate::value::AsValue;
    use crate::value::Validatable;
    use std::any::TypeId;

    static DECLARATION: Declaration = Declaration {
        kind: "RequiredIfNull",
        checked_by: Some("required_if_null"),
        message: "{fields} must have a value when {depends_on} is null.",
        params: &[
            ("fields", ParamValue::StrList(&["first_name", "last_name"])),
            ("depends_on", ParamValue::Str("full_name")),
        ],
    };

    static PERSON_DECLARATIONS: TypeDeclarations = TypeDeclarations {
        type_name: "Person",
        type_constraints: &[],
        fields: &[],
    };

    struct Person {
        first_name: Option<String>,
        last_name: Option<String>,
        full_name: Option<String>,
    }

    impl Validatable for Person {
        fn type_name(&self) -> &'static str {
            "Person"
        }

        fn type_key(&self) -> TypeId {
            TypeId::of::<Person>()
        }

        fn declarations(&self) -> &'static TypeDeclarations {
            &PERSON_DECLARATIONS
        }

        fn field(&self, name: &str) -> Option<Value<'_>> {
            match name {
                "first_name" => Some(self.first_name.as_value()),
                "last_name" => Some(self.last_name.as_value()),
                "full_name" => Some(self.full_name.as_value()),
                _ => None,
            }
        }
    }

    fn checker() -> Box<dyn Checker> {
        RequiredIfNullChecker::factory(&DECLARATION, &CheckerRegistry::new()).unwrap()
    }

    #[test]
    fn test_dependent_fields_unneeded_when_depends_on_set() {
        let person = Person {
            first_name: None,
            last_name: None,
            full_name: Some("Robert Taylor".to_string()),
        };
        assert!(checker().is_valid(&Value::Object(&person)).unwrap());
    }

    #[test]
    fn test_all_dependent_fields_present_pass() {
        let person = Person {
            first_name: Some("Robert".to_string()),
            last_name: Some("Taylor".to_string()),
            full_name: None,
        };
        assert!(checker().is_valid(&Value::Object(&person)).unwrap());
    }

    #[test]
    fn test_missing_dependent_field_fails() {
        let person = Person {
            first_name: Some("Robert".to_string()),
            last_name: None,
            full_name: None,
        };
        assert!(!checker().is_valid(&Value::Object(&person)).unwrap());
    }

    #[test]
    fn test_message_lists_fields() {
        assert_eq!(
            checker().message(),
            "[first_name, last_name] must have a value when full_name is null."
        );
    }
}
