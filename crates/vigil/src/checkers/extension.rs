use std::path::Path;

use crate::checker::BUILTIN_CHECKERS;
use crate::checker::Checker;
use crate::checker::CheckerFactory;
use crate::checker::CheckerRegistry;
use crate::declaration::Declaration;
use crate::error::EngineError;
use crate::render::render;
use crate::value::Value;

use linkme::distributed_slice;

/// Checks that a file path's extension is one of an expected list. Applies
/// to path and string values.
pub struct ExtensionChecker {
    declaration: &'static Declaration,
    extensions: &'static [&'static str],
}

#[distributed_slice(BUILTIN_CHECKERS)]
static REGISTER: (&'static str, CheckerFactory) = ("extension", ExtensionChecker::factory);

impl ExtensionChecker {
    fn factory(
        declaration: &'static Declaration,
        _registry: &CheckerRegistry,
    ) -> Result<Box<dyn Checker>, EngineError> {
        let extensions = declaration.str_list_param("value");
        if extensions.is_empty() {
            return Err(EngineError::InvalidParams {
                kind: declaration.kind,
                reason: "at least one extension is required".to_string(),
            });
        }
        Ok(Box::new(ExtensionChecker {
            declaration,
            extensions,
        }))
    }

    fn extension_of(value: &Value<'_>) -> Result<String, EngineError> {
        let path = match value {
            Value::Path(path) => *path,
            Value::Str(text) => Path::new(*text),
            other => return Err(EngineError::NotAPath { kind: other.kind() }),
        };
        let extension = path
            .extension()
            .map(|extension| extension.to_string_lossy().to_string())
            .filter(|extension| !extension.is_empty());
        extension.ok_or_else(|| EngineError::NoExtension {
            name: path.display().to_string(),
        })
    }
}

impl Checker for ExtensionChecker {
    fn is_valid(&self, value: &Value<'_>) -> Result<bool, EngineError> {
        if value.is_null() {
            return Ok(true);
        }
        let extension = Self::extension_of(value)?;
        Ok(self.extensions.iter().any(|expected| *expected == extension))
    }

    fn message(&self) -> String {
        render(self.declaration.message, self.declaration, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::ParamValue;
    use std::path::PathBuf;

    static DECLARATION: Declaration = Declaration {
        kind: "Extension",
        checked_by: Some("extension"),
        message: "extension must be one of {value}.",
        params: &[("value", ParamValue::StrList(&["png", "jpg"]))],
    };

    fn checker() -> Box<dyn Checker> {
        ExtensionChecker::factory(&DECLARATION, &CheckerRegistry::new()).unwrap()
    }

    #[test]
    fn test_expected_extensions_pass() {
        let checker = checker();
        let image = PathBuf::from("photos/holiday.png");
        assert!(checker.is_valid(&Value::Path(&image)).unwrap());
        assert!(checker.is_valid(&Value::Str("scan.jpg")).unwrap());
        assert!(checker.is_valid(&Value::Null).unwrap());
    }

    #[test]
    fn test_unexpected_extension_fails() {
        let checker = checker();
        assert!(!checker.is_valid(&Value::Str("notes.txt")).unwrap());
        // Case-sensitive, like the rest of the path handling.
        assert!(!checker.is_valid(&Value::Str("photo.PNG")).unwrap());
    }

    #[test]
    fn test_missing_extension_is_fatal() {
        let checker = checker();
        assert!(matches!(
            checker.is_valid(&Value::Str("README")).unwrap_err(),
            EngineError::NoExtension { .. }
        ));
        assert!(matches!(
            checker.is_valid(&Value::Str(".gitignore")).unwrap_err(),
            EngineError::NoExtension { .. }
        ));
    }

    #[test]
    fn test_non_path_value_is_fatal() {
        let error = checker().is_valid(&Value::Int(3)).unwrap_err();
        assert!(matches!(error, EngineError::NotAPath { kind: "integer" }));
    }

    #[test]
    fn test_message_lists_extensions() {
        assert_eq!(checker().message(), "extension must be one of [png, jpg].");
    }
}
