use proc_macro::TokenStream;
use syn::DeriveInput;
use syn::parse_macro_input;

mod generate;

/// Derive macro attaching constraint declarations to a data-model struct.
///
/// The macro compiles `#[validate(...)]` attributes into a static
/// declaration table and implements the reflection surface (`Validatable`
/// and `AsValue`) the validation engine traverses.
///
/// # Field constraints
///
/// - `#[validate(required)]`: the value must be present (not `None`, not an
///   empty collection or map)
/// - `#[validate(size(min = 1, max = 3))]`: length of a string or size of a
///   collection/map within a closed range
/// - `#[validate(range(min = 1, max = 100))]`: numeric value within a
///   closed range
/// - `#[validate(extension("png", "jpg"))]`: file extension of a path-like
///   value is one of the listed ones
/// - `#[validate(object_type(schema = coll, base(String), max_size = 2))]`:
///   runtime shape of a dynamically-typed value; repeatable, and repeated
///   declarations mean "valid if any one shape matches"
/// - `#[validate(valid)]`: no direct constraint, but descend into the
///   nested value during validation
///
/// # Type constraints
///
/// - `#[validate(field_match(first = "password", second = "confirm_password"))]`:
///   two named fields must be equal
/// - `#[validate(required_if_null(fields(first_name, last_name), depends_on = "full_name"))]`:
///   the listed fields must have values whenever the depended-on field is null
///
/// Every constraint also accepts `message = "..."` to replace its default
/// message template.
///
/// # Example
///
/// ```ignore
/// use vigil::Validate;
///
/// #[derive(Validate)]
/// struct User {
///     #[validate(required)]
///     id: Option<i64>,
///
///     #[validate(required, size(max = 20))]
///     name: Option<String>,
///
///     #[validate(size(min = 1, max = 3), valid)]
///     addresses: Vec<Address>,
/// }
///
/// let violations = vigil::Validator::new().validate(&user)?;
/// ```
#[proc_macro_derive(Validate, attributes(validate))]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate::expand_validate(input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
