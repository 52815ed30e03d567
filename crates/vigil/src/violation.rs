use crate::value::Value;

/// Detail of one failed constraint: the offending value, the dotted path
/// from the validation root, and the rendered message.
///
/// The path is empty for type-level constraints on the root object, and
/// carries a leading `"in "` prefix for type-level constraints reported on
/// nested objects, disambiguating them from field-level violations at the
/// same path.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation<'a> {
    pub value: Value<'a>,
    pub path: String,
    pub message: String,
}

impl<'a> Violation<'a> {
    pub fn new(value: Value<'a>, path: String, message: String) -> Self {
        Violation {
            value,
            path,
            message,
        }
    }
}
