use proc_macro2::TokenStream;
use quote::format_ident;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::Data;
use syn::DeriveInput;
use syn::Error;
use syn::Expr;
use syn::ExprLit;
use syn::Fields;
use syn::Lit;
use syn::Meta;
use syn::Result;
use syn::Token;

/// Where a constraint is attached; type-level and field-level constraints
/// come from disjoint sets.
#[derive(Clone, Copy, PartialEq)]
enum Level {
    Type,
    Field,
}

/// One parsed constraint, ready to be emitted as a `vigil::Declaration`.
struct ParsedConstraint {
    kind: String,
    tokens: TokenStream,
}

pub fn expand_validate(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    // Only support structs with named fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new_spanned(
                    name,
                    "Validate only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new_spanned(name, "Validate only supports structs"));
        }
    };

    // Type-level constraints
    let mut type_constraints = Vec::new();
    for meta in parse_validate_metas(&input.attrs)? {
        let constraint = parse_constraint(&meta, Level::Type)?;
        type_constraints.push(constraint.tokens);
    }

    // Field-level constraints, grouping repeated object_type declarations
    // into a single one-of composite per field
    let mut group_statics = Vec::new();
    let mut field_tables = Vec::new();
    for field in fields {
        let field_ident = field.ident.as_ref().unwrap();
        let metas = parse_validate_metas(&field.attrs)?;
        if metas.is_empty() {
            continue;
        }

        let mut constraints = Vec::new();
        for meta in &metas {
            constraints.push(parse_constraint(meta, Level::Field)?);
        }

        let object_types: Vec<TokenStream> = constraints
            .iter()
            .filter(|constraint| constraint.kind == "object_type")
            .map(|constraint| constraint.tokens.clone())
            .collect();

        let mut declarations = Vec::new();
        if object_types.len() > 1 {
            let static_ident = format_ident!("{}_SHAPES", field_ident.to_string().to_uppercase());
            let count = object_types.len();
            group_statics.push(quote! {
                static #static_ident: [vigil::Declaration; #count] = [#(#object_types),*];
            });

            let mut composite_emitted = false;
            for constraint in &constraints {
                if constraint.kind == "object_type" {
                    if !composite_emitted {
                        composite_emitted = true;
                        declarations.push(quote! {
                            vigil::Declaration {
                                kind: "ObjectTypes",
                                checked_by: Some("object_types"),
                                message: "type must be#for(value) or {message}#endfor.",
                                params: &[("value", vigil::ParamValue::Group(&#static_ident))],
                            }
                        });
                    }
                } else {
                    declarations.push(constraint.tokens.clone());
                }
            }
        } else {
            declarations = constraints
                .into_iter()
                .map(|constraint| constraint.tokens)
                .collect();
        }

        let field_name = field_ident.to_string();
        field_tables.push(quote! {
            vigil::FieldDeclarations {
                name: #field_name,
                constraints: &[#(#declarations),*],
            }
        });
    }

    // The reflection surface exposes every named field, constrained or not,
    // so type-level checkers can read fields by name
    let field_arms: Vec<TokenStream> = fields
        .iter()
        .map(|field| {
            let field_ident = field.ident.as_ref().unwrap();
            let field_name = field_ident.to_string();
            quote! {
                #field_name => Some(vigil::AsValue::as_value(&self.#field_ident)),
            }
        })
        .collect();

    Ok(quote! {
        impl vigil::Validatable for #name {
            fn type_name(&self) -> &'static str {
                concat!(module_path!(), "::", stringify!(#name))
            }

            fn type_key(&self) -> ::std::any::TypeId {
                ::std::any::TypeId::of::<#name>()
            }

            fn declarations(&self) -> &'static vigil::TypeDeclarations {
                #(#group_statics)*
                static DECLARATIONS: vigil::TypeDeclarations = vigil::TypeDeclarations {
                    type_name: concat!(module_path!(), "::", stringify!(#name)),
                    type_constraints: &[#(#type_constraints),*],
                    fields: &[#(#field_tables),*],
                };
                &DECLARATIONS
            }

            fn field(&self, name: &str) -> Option<vigil::Value<'_>> {
                match name {
                    #(#field_arms)*
                    _ => None,
                }
            }
        }

        impl vigil::AsValue for #name {
            fn as_value(&self) -> vigil::Value<'_> {
                vigil::Value::Object(self)
            }
        }
    })
}

/// Collect the comma-separated constraint metas of every `#[validate(...)]`
/// attribute, in source order.
fn parse_validate_metas(attrs: &[syn::Attribute]) -> Result<Vec<Meta>> {
    let mut metas = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("validate") {
            continue;
        }
        let nested = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        metas.extend(nested);
    }
    Ok(metas)
}

fn parse_constraint(meta: &Meta, level: Level) -> Result<ParsedConstraint> {
    let kind = meta
        .path()
        .get_ident()
        .map(|ident| ident.to_string())
        .ok_or_else(|| Error::new(meta.span(), "expected a constraint name"))?;

    let expected_level = match kind.as_str() {
        "field_match" | "required_if_null" => Level::Type,
        "required" | "valid" | "size" | "range" | "extension" | "object_type" => Level::Field,
        other => {
            return Err(Error::new(
                meta.span(),
                format!("unknown constraint '{}'", other),
            ));
        }
    };
    if expected_level != level {
        let position = match expected_level {
            Level::Type => "on the struct",
            Level::Field => "on a field",
        };
        return Err(Error::new(
            meta.span(),
            format!("the {} constraint belongs {}", kind, position),
        ));
    }

    let tokens = match kind.as_str() {
        "required" => expand_required(meta)?,
        "valid" => expand_valid(meta)?,
        "size" => expand_size(meta)?,
        "range" => expand_range(meta)?,
        "extension" => expand_extension(meta)?,
        "object_type" => expand_object_type(meta)?,
        "field_match" => expand_field_match(meta)?,
        "required_if_null" => expand_required_if_null(meta)?,
        _ => unreachable!(),
    };
    Ok(ParsedConstraint { kind, tokens })
}

/// A named argument inside a constraint: `name = expr` or `name(item, ...)`.
enum Arg {
    Value(Expr),
    Items(Vec<syn::Path>),
}

fn parse_named_args(meta: &Meta) -> Result<Vec<(String, Arg)>> {
    let list = match meta {
        Meta::Path(_) => return Ok(Vec::new()),
        Meta::List(list) => list,
        Meta::NameValue(_) => {
            return Err(Error::new(meta.span(), "expected a constraint, not a value"));
        }
    };
    let nested = list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
    let mut args = Vec::new();
    for inner in nested {
        match inner {
            Meta::NameValue(name_value) => {
                let name = ident_of(name_value.path.clone())?;
                args.push((name, Arg::Value(name_value.value)));
            }
            Meta::List(inner_list) => {
                let name = ident_of(inner_list.path.clone())?;
                let items = inner_list
                    .parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)?;
                args.push((name, Arg::Items(items.into_iter().collect())));
            }
            Meta::Path(path) => {
                return Err(Error::new(
                    path.span(),
                    "expected 'name = value' or 'name(...)'",
                ));
            }
        }
    }
    Ok(args)
}

fn ident_of(path: syn::Path) -> Result<String> {
    path.get_ident()
        .map(|ident| ident.to_string())
        .ok_or_else(|| Error::new(path.span(), "expected an identifier"))
}

fn declaration_tokens(
    kind: &str,
    checked_by: TokenStream,
    message: TokenStream,
    params: Vec<TokenStream>,
) -> TokenStream {
    quote! {
        vigil::Declaration {
            kind: #kind,
            checked_by: #checked_by,
            message: #message,
            params: &[#(#params),*],
        }
    }
}

fn message_tokens(message: Option<&Expr>, default: &str) -> TokenStream {
    match message {
        Some(expr) => quote!(#expr),
        None => quote!(#default),
    }
}

fn expand_required(meta: &Meta) -> Result<TokenStream> {
    let mut message = None;
    for (name, arg) in parse_named_args(meta)? {
        match (name.as_str(), arg) {
            ("message", Arg::Value(expr)) => message = Some(expr),
            (other, _) => {
                return Err(Error::new(
                    meta.span(),
                    format!("unknown required parameter '{}'", other),
                ));
            }
        }
    }
    Ok(declaration_tokens(
        "Required",
        quote!(Some("required")),
        message_tokens(message.as_ref(), "must have a value."),
        Vec::new(),
    ))
}

fn expand_valid(meta: &Meta) -> Result<TokenStream> {
    if !matches!(meta, Meta::Path(_)) {
        return Err(Error::new(meta.span(), "valid takes no parameters"));
    }
    Ok(declaration_tokens("Valid", quote!(None), quote!(""), Vec::new()))
}

fn expand_size(meta: &Meta) -> Result<TokenStream> {
    let mut message = None;
    let mut params = Vec::new();
    for (name, arg) in parse_named_args(meta)? {
        match (name.as_str(), arg) {
            ("min", Arg::Value(expr)) => {
                params.push(quote!(("min", vigil::ParamValue::Int((#expr) as i64))));
            }
            ("max", Arg::Value(expr)) => {
                params.push(quote!(("max", vigil::ParamValue::Int((#expr) as i64))));
            }
            ("message", Arg::Value(expr)) => message = Some(expr),
            (other, _) => {
                return Err(Error::new(
                    meta.span(),
                    format!("unknown size parameter '{}'", other),
                ));
            }
        }
    }
    Ok(declaration_tokens(
        "Size",
        quote!(Some("size")),
        message_tokens(
            message.as_ref(),
            "size must be#if(min) at least {min}#endif#if(max) at most {max}#endif.",
        ),
        params,
    ))
}

fn expand_range(meta: &Meta) -> Result<TokenStream> {
    let mut message = None;
    let mut params = Vec::new();
    for (name, arg) in parse_named_args(meta)? {
        match (name.as_str(), arg) {
            ("min", Arg::Value(expr)) => {
                params.push(quote!(("min", vigil::ParamValue::Float((#expr) as f64))));
            }
            ("max", Arg::Value(expr)) => {
                params.push(quote!(("max", vigil::ParamValue::Float((#expr) as f64))));
            }
            ("message", Arg::Value(expr)) => message = Some(expr),
            (other, _) => {
                return Err(Error::new(
                    meta.span(),
                    format!("unknown range parameter '{}'", other),
                ));
            }
        }
    }
    Ok(declaration_tokens(
        "Range",
        quote!(Some("range")),
        message_tokens(
            message.as_ref(),
            "must be#if(min) at least {min}#endif#if(max) at most {max}#endif.",
        ),
        params,
    ))
}

fn expand_extension(meta: &Meta) -> Result<TokenStream> {
    let list = match meta {
        Meta::List(list) => list,
        _ => {
            return Err(Error::new(
                meta.span(),
                "extension requires a list of extensions, e.g. extension(\"png\", \"jpg\")",
            ));
        }
    };
    let literals = list.parse_args_with(Punctuated::<Lit, Token![,]>::parse_terminated)?;
    let mut extensions = Vec::new();
    for literal in literals {
        match literal {
            Lit::Str(value) => extensions.push(value.value()),
            other => {
                return Err(Error::new(
                    other.span(),
                    "extension entries must be string literals",
                ));
            }
        }
    }
    if extensions.is_empty() {
        return Err(Error::new(meta.span(), "extension requires at least one entry"));
    }
    let params = vec![quote!(("value", vigil::ParamValue::StrList(&[#(#extensions),*])))];
    Ok(declaration_tokens(
        "Extension",
        quote!(Some("extension")),
        quote!("extension must be one of {value}."),
        params,
    ))
}

fn expand_object_type(meta: &Meta) -> Result<TokenStream> {
    let mut message = None;
    let mut params = Vec::new();
    let mut has_base = false;
    for (name, arg) in parse_named_args(meta)? {
        match (name.as_str(), arg) {
            ("schema", Arg::Value(expr)) => {
                let schema = name_literal(&expr)?;
                params.push(quote!(("schema", vigil::ParamValue::Str(#schema))));
            }
            ("base", Arg::Items(items)) => {
                has_base = true;
                let refs: Vec<TokenStream> = items
                    .iter()
                    .map(type_ref_tokens)
                    .collect::<Result<Vec<_>>>()?;
                params.push(quote!(("base", vigil::ParamValue::TypeList(&[#(#refs),*]))));
            }
            ("key", Arg::Value(expr)) => {
                let type_ref = match &expr {
                    Expr::Path(path) => type_ref_tokens(&path.path)?,
                    _ => {
                        return Err(Error::new(expr.span(), "key must be a type name"));
                    }
                };
                params.push(quote!(("key", vigil::ParamValue::Type(#type_ref))));
            }
            ("max_size", Arg::Value(expr)) => {
                params.push(quote!(("max_size", vigil::ParamValue::Int((#expr) as i64))));
            }
            ("max_inner_size", Arg::Value(expr)) => {
                params.push(quote!(("max_inner_size", vigil::ParamValue::Int((#expr) as i64))));
            }
            ("max_checks", Arg::Value(expr)) => {
                params.push(quote!(("max_checks", vigil::ParamValue::Int((#expr) as i64))));
            }
            ("allow_null", Arg::Value(expr)) => {
                params.push(quote!(("allow_null", vigil::ParamValue::Bool(#expr))));
            }
            ("allow_inner_null", Arg::Value(expr)) => {
                params.push(quote!(("allow_inner_null", vigil::ParamValue::Bool(#expr))));
            }
            ("message", Arg::Value(expr)) => message = Some(expr),
            (other, _) => {
                return Err(Error::new(
                    meta.span(),
                    format!("unknown object_type parameter '{}'", other),
                ));
            }
        }
    }
    if !has_base {
        return Err(Error::new(
            meta.span(),
            "object_type requires a base type list, e.g. base(String)",
        ));
    }
    Ok(declaration_tokens(
        "ObjectType",
        quote!(Some("object_type")),
        message_tokens(message.as_ref(), ""),
        params,
    ))
}

fn expand_field_match(meta: &Meta) -> Result<TokenStream> {
    let mut message = None;
    let mut params = Vec::new();
    let mut has_first = false;
    let mut has_second = false;
    for (name, arg) in parse_named_args(meta)? {
        match (name.as_str(), arg) {
            ("first", Arg::Value(expr)) => {
                has_first = true;
                params.push(quote!(("first", vigil::ParamValue::Str(#expr))));
            }
            ("second", Arg::Value(expr)) => {
                has_second = true;
                params.push(quote!(("second", vigil::ParamValue::Str(#expr))));
            }
            ("message", Arg::Value(expr)) => message = Some(expr),
            (other, _) => {
                return Err(Error::new(
                    meta.span(),
                    format!("unknown field_match parameter '{}'", other),
                ));
            }
        }
    }
    if !has_first || !has_second {
        return Err(Error::new(
            meta.span(),
            "field_match requires 'first' and 'second' field names",
        ));
    }
    Ok(declaration_tokens(
        "FieldMatch",
        quote!(Some("field_match")),
        message_tokens(message.as_ref(), "{first} and {second} must match."),
        params,
    ))
}

fn expand_required_if_null(meta: &Meta) -> Result<TokenStream> {
    let mut message = None;
    let mut params = Vec::new();
    let mut has_fields = false;
    let mut has_depends_on = false;
    for (name, arg) in parse_named_args(meta)? {
        match (name.as_str(), arg) {
            ("fields", Arg::Items(items)) => {
                has_fields = true;
                let names: Vec<String> = items
                    .iter()
                    .map(|path| ident_of(path.clone()))
                    .collect::<Result<Vec<_>>>()?;
                params.push(quote!(("fields", vigil::ParamValue::StrList(&[#(#names),*]))));
            }
            ("depends_on", Arg::Value(expr)) => {
                has_depends_on = true;
                params.push(quote!(("depends_on", vigil::ParamValue::Str(#expr))));
            }
            ("message", Arg::Value(expr)) => message = Some(expr),
            (other, _) => {
                return Err(Error::new(
                    meta.span(),
                    format!("unknown required_if_null parameter '{}'", other),
                ));
            }
        }
    }
    if !has_fields || !has_depends_on {
        return Err(Error::new(
            meta.span(),
            "required_if_null requires 'fields(...)' and 'depends_on'",
        ));
    }
    Ok(declaration_tokens(
        "RequiredIfNull",
        quote!(Some("required_if_null")),
        message_tokens(
            message.as_ref(),
            "{fields} must have a value when {depends_on} is null.",
        ),
        params,
    ))
}

/// A schema name given either as a bare identifier (`schema = coll`) or a
/// string literal (`schema = "coll"`).
fn name_literal(expr: &Expr) -> Result<String> {
    match expr {
        Expr::Path(path) => ident_of(path.path.clone()),
        Expr::Lit(ExprLit {
            lit: Lit::Str(value),
            ..
        }) => Ok(value.value()),
        _ => Err(Error::new(expr.span(), "expected a name")),
    }
}

/// Map a type name in an attribute to the engine's type reference:
/// well-known scalar names map to the scalar references, anything else is
/// an annotated object type matched by its short name.
fn type_ref_tokens(path: &syn::Path) -> Result<TokenStream> {
    let ident = path
        .segments
        .last()
        .map(|segment| segment.ident.to_string())
        .ok_or_else(|| Error::new(path.span(), "expected a type name"))?;
    Ok(match ident.as_str() {
        "String" | "str" => quote!(vigil::TypeRef::STRING),
        "Integer" | "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64"
        | "usize" => quote!(vigil::TypeRef::INTEGER),
        "Float" | "f32" | "f64" => quote!(vigil::TypeRef::FLOAT),
        "Boolean" | "bool" => quote!(vigil::TypeRef::BOOLEAN),
        "Char" | "char" => quote!(vigil::TypeRef::CHAR),
        "Path" | "PathBuf" => quote!(vigil::TypeRef::PATH),
        _ => quote!(vigil::TypeRef::object(#ident)),
    })
}
