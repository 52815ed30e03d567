//! Checker plugin contract and registry.
//!
//! One checker implements one constraint kind. Built-in checkers register
//! themselves on [`BUILTIN_CHECKERS`]; custom kinds can be added to a
//! [`CheckerRegistry`] before it is handed to a `Validator`.

use std::collections::HashMap;

use linkme::distributed_slice;

use crate::declaration::Declaration;
use crate::error::EngineError;
use crate::value::Value;

/// A bound constraint checker.
///
/// Checkers are constructed by their factory with the declaration's
/// parameters already validated, then shared read-only across every
/// validation of the owning type.
pub trait Checker: Send + Sync {
    /// Whether the value satisfies the constraint. `Ok(false)` is a
    /// violation; `Err` is a fatal engine error (e.g. a named field that
    /// does not exist) and aborts the whole call. Null values are valid for
    /// every built-in checker except `required`.
    fn is_valid(&self, value: &Value<'_>) -> Result<bool, EngineError>;

    /// Fully rendered description of the constraint for its bound
    /// parameters; no further substitution is needed downstream.
    fn message(&self) -> String;
}

impl std::fmt::Debug for dyn Checker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checker").finish_non_exhaustive()
    }
}

/// Factory producing a checker from a declaration. Rejecting invalid
/// parameter combinations (e.g. `min > max`) happens here, eagerly.
pub type CheckerFactory =
    fn(&'static Declaration, &CheckerRegistry) -> Result<Box<dyn Checker>, EngineError>;

/// Built-in checker registrations, one entry per checker module.
#[distributed_slice]
pub static BUILTIN_CHECKERS: [(&'static str, CheckerFactory)];

/// Maps constraint kind identifiers to checker factories.
pub struct CheckerRegistry {
    factories: HashMap<&'static str, CheckerFactory>,
}

impl CheckerRegistry {
    /// A registry seeded with every built-in checker.
    pub fn new() -> Self {
        let factories = BUILTIN_CHECKERS.iter().copied().collect();
        CheckerRegistry { factories }
    }

    /// Register a custom checker kind. Re-registering a kind replaces the
    /// previous factory.
    pub fn register(&mut self, kind: &'static str, factory: CheckerFactory) {
        self.factories.insert(kind, factory);
    }

    /// Construct and initialize the checker bound to a declaration.
    pub fn instantiate(
        &self,
        kind: &str,
        declaration: &'static Declaration,
    ) -> Result<Box<dyn Checker>, EngineError> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| EngineError::UnknownChecker {
                kind: kind.to_string(),
            })?;
        factory(declaration, self)
    }
}

impl Default for CheckerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_checkers_are_registered() {
        let registry = CheckerRegistry::new();
        for kind in [
            "required",
            "size",
            "range",
            "extension",
            "field_match",
            "required_if_null",
            "object_type",
            "object_types",
        ] {
            assert!(
                registry.factories.contains_key(kind),
                "missing built-in checker '{}'",
                kind
            );
        }
    }

    #[test]
    fn test_unknown_kind_is_fatal() {
        static DECLARATION: Declaration = Declaration {
            kind: "Custom",
            checked_by: Some("custom"),
            message: "",
            params: &[],
        };
        let registry = CheckerRegistry::new();
        let error = registry.instantiate("custom", &DECLARATION).unwrap_err();
        assert!(matches!(error, EngineError::UnknownChecker { .. }));
    }
}
