mod checker;
mod checkers;
mod declaration;
mod error;
mod metadata;
mod path;
mod render;
mod validator;
mod value;
mod violation;

// Re-export the public surface
pub use checker::BUILTIN_CHECKERS;
pub use checker::Checker;
pub use checker::CheckerFactory;
pub use checker::CheckerRegistry;
pub use checkers::Schema;
pub use declaration::Declaration;
pub use declaration::FieldDeclarations;
pub use declaration::ParamValue;
pub use declaration::TypeDeclarations;
pub use declaration::TypeRef;
pub use error::EngineError;
pub use error::ViolationError;
pub use render::render;
pub use validator::Validator;
pub use value::AsValue;
pub use value::Validatable;
pub use value::Value;
pub use violation::Violation;
pub use vigil_derive::Validate;
