//! Built-in constraint checkers, one module per constraint kind.

mod extension;
mod field_match;
mod object_type;
mod range;
mod required;
mod required_if_null;
mod size;

pub use object_type::Schema;
