use thiserror::Error;

use crate::violation::Violation;

/// Fatal configuration or engine errors.
///
/// These are programmer errors, not data errors: they abort the whole
/// `validate` call and are never converted into violations. Data that merely
/// fails a constraint is reported through [`Violation`] instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A declaration is bound to a checker kind nothing has registered.
    #[error("no checker is registered for constraint kind '{kind}'")]
    UnknownChecker { kind: String },

    /// A checker rejected its own parameters at initialization.
    #[error("in {kind} constraint, {reason}")]
    InvalidParams { kind: &'static str, reason: String },

    /// A type-level checker names a field the type does not declare.
    #[error("cannot read the field {type_name}.{field}")]
    UnknownField {
        type_name: &'static str,
        field: String,
    },

    /// A type-level checker was evaluated against something that is not an
    /// annotated object.
    #[error("{kind} constraint applies to object types, found {found}")]
    NotAnObject {
        kind: &'static str,
        found: &'static str,
    },

    /// A size constraint was applied to a value without a size.
    #[error("cannot get a size from {kind}")]
    NotSized { kind: &'static str },

    /// A range constraint was applied to a non-numeric value.
    #[error("cannot get a number from {kind}")]
    NotNumeric { kind: &'static str },

    /// An extension constraint was applied to a non-path value.
    #[error("input must be a file path, found {kind}")]
    NotAPath { kind: &'static str },

    /// An extension constraint found no usable file extension.
    #[error("no valid file extension found in '{name}'")]
    NoExtension { name: String },
}

/// Convenience error aggregating a violation list into one report.
///
/// Each line is `"<path> <message>"`, with the path segment (and its
/// trailing space) omitted when the path is empty.
#[derive(Debug, Clone)]
pub struct ViolationError {
    lines: Vec<String>,
}

impl ViolationError {
    pub fn new(violations: &[Violation<'_>]) -> Self {
        let lines = violations
            .iter()
            .map(|violation| {
                if violation.path.is_empty() {
                    violation.message.clone()
                } else {
                    format!("{} {}", violation.path, violation.message)
                }
            })
            .collect();
        ViolationError { lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

impl std::fmt::Display for ViolationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

impl std::error::Error for ViolationError {}
