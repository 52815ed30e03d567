//! Message template rendering.
//!
//! Templates come in three forms, detected by content and mutually
//! exclusive at the top level:
//!
//! - plain substitution: every `{name}` token is replaced by the
//!   stringified parameter value;
//! - conditional segments: `#if(name) ... #endif` keeps the enclosed text
//!   only when the named parameter is present, then substitutes;
//! - a loop segment: `#for(name) ... #endfor` repeats the enclosed text
//!   once per sub-declaration, replacing `{message}` with each
//!   sub-declaration's fully rendered message. Only the first loop in a
//!   template is expanded.
//!
//! Rendering is a pure string transform over immutable inputs.

use crate::declaration::Declaration;
use crate::declaration::ParamValue;

/// Render a constraint's message template against its bound parameters.
/// `sub_messages` carries the rendered messages of nested sub-declarations
/// for the loop form; it is empty for ordinary constraints.
pub fn render(template: &str, declaration: &Declaration, sub_messages: &[String]) -> String {
    let expanded = if template.contains("#for(") {
        expand_loop(template, sub_messages)
    } else if template.contains("#if(") {
        expand_conditionals(template, declaration)
    } else {
        template.to_string()
    };
    substitute(&expanded, declaration)
}

/// Expand the first `#for(name) ... #endfor` segment.
fn expand_loop(template: &str, sub_messages: &[String]) -> String {
    let Some(start) = template.find("#for(") else {
        return template.to_string();
    };
    let Some(name_end) = template[start..].find(')') else {
        return template.to_string();
    };
    let body_start = start + name_end + 1;
    let Some(body_len) = template[body_start..].find("#endfor") else {
        return template.to_string();
    };
    let body = &template[body_start..body_start + body_len];

    let mut output = String::new();
    output.push_str(&template[..start]);
    for message in sub_messages {
        output.push_str(&body.replace("{message}", message));
    }
    output.push_str(&template[body_start + body_len + "#endfor".len()..]);
    output
}

/// Evaluate every `#if(name) ... #endif` segment independently.
fn expand_conditionals(template: &str, declaration: &Declaration) -> String {
    let mut output = String::new();
    let mut rest = template;
    while let Some(start) = rest.find("#if(") {
        output.push_str(&rest[..start]);
        let after_tag = &rest[start + "#if(".len()..];
        let Some(name_len) = after_tag.find(')') else {
            output.push_str(&rest[start..]);
            return output;
        };
        let name = &after_tag[..name_len];
        let body_and_rest = &after_tag[name_len + 1..];
        let Some(body_len) = body_and_rest.find("#endif") else {
            output.push_str(&rest[start..]);
            return output;
        };
        if declaration.param(name).is_some_and(is_present) {
            output.push_str(&body_and_rest[..body_len]);
        }
        rest = &body_and_rest[body_len + "#endif".len()..];
    }
    output.push_str(rest);
    output
}

/// Replace every `{name}` token with the stringified parameter value.
/// Unknown tokens are left untouched.
fn substitute(template: &str, declaration: &Declaration) -> String {
    let mut output = String::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        let after_brace = &rest[start + 1..];
        match after_brace.find('}') {
            Some(name_len) => {
                let name = &after_brace[..name_len];
                match declaration.param(name) {
                    Some(value) => output.push_str(&stringify(value)),
                    None => {
                        output.push('{');
                        output.push_str(name);
                        output.push('}');
                    }
                }
                rest = &after_brace[name_len + 1..];
            }
            None => {
                output.push_str(&rest[start..]);
                return output;
            }
        }
    }
    output.push_str(rest);
    output
}

/// Type-specific truthiness of a parameter: booleans must be true, strings
/// and lists non-empty, numbers away from their "unset" sentinel extreme,
/// type references not the "no type" sentinel.
fn is_present(value: &ParamValue) -> bool {
    match value {
        ParamValue::Bool(value) => *value,
        ParamValue::Int(value) => *value != 0 && *value != i64::MAX,
        ParamValue::Float(value) => *value != f64::MIN && *value != f64::MAX,
        ParamValue::Str(value) => !value.is_empty(),
        ParamValue::StrList(values) => !values.is_empty(),
        ParamValue::Type(type_ref) => !type_ref.is_none(),
        ParamValue::TypeList(types) => !types.is_empty(),
        ParamValue::Group(declarations) => !declarations.is_empty(),
    }
}

/// Natural string form of a parameter value. Whole floats drop their
/// trailing `.0`; type references render as their short name; string lists
/// render bracketed and comma-separated.
fn stringify(value: &ParamValue) -> String {
    match value {
        ParamValue::Bool(value) => value.to_string(),
        ParamValue::Int(value) => value.to_string(),
        ParamValue::Float(value) => render_float(*value),
        ParamValue::Str(value) => (*value).to_string(),
        ParamValue::StrList(values) => format!("[{}]", values.join(", ")),
        ParamValue::Type(type_ref) => type_ref.name().to_string(),
        ParamValue::TypeList(types) => types
            .iter()
            .map(|type_ref| type_ref.name())
            .collect::<Vec<_>>()
            .join("|"),
        ParamValue::Group(_) => String::new(),
    }
}

pub(crate) fn render_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::TypeRef;

    fn declaration(params: &'static [(&'static str, ParamValue)]) -> Declaration {
        Declaration {
            kind: "Test",
            checked_by: None,
            message: "",
            params,
        }
    }

    #[test]
    fn test_plain_substitution() {
        let declaration = declaration(&[
            ("first", ParamValue::Str("password")),
            ("second", ParamValue::Str("confirm_password")),
        ]);
        assert_eq!(
            render("{first} and {second} must match.", &declaration, &[]),
            "password and confirm_password must match."
        );
    }

    #[test]
    fn test_conditional_keeps_present_segments() {
        let declaration = declaration(&[
            ("min", ParamValue::Int(2)),
            ("max", ParamValue::Int(10)),
        ]);
        assert_eq!(
            render(
                "must be#if(min) at least {min}#endif#if(max) at most {max}#endif.",
                &declaration,
                &[],
            ),
            "must be at least 2 at most 10."
        );
    }

    #[test]
    fn test_conditional_drops_sentinel_segments() {
        let declaration = declaration(&[
            ("min", ParamValue::Int(0)),
            ("max", ParamValue::Int(10)),
        ]);
        assert_eq!(
            render(
                "must be#if(min) at least {min}#endif#if(max) at most {max}#endif.",
                &declaration,
                &[],
            ),
            "must be at most 10."
        );
    }

    #[test]
    fn test_whole_floats_render_without_fraction() {
        let declaration = declaration(&[
            ("min", ParamValue::Float(1.0)),
            ("max", ParamValue::Float(99.5)),
        ]);
        assert_eq!(
            render(
                "must be#if(min) at least {min}#endif#if(max) at most {max}#endif.",
                &declaration,
                &[],
            ),
            "must be at least 1 at most 99.5."
        );
    }

    #[test]
    fn test_float_sentinels_are_absent() {
        let declaration = declaration(&[
            ("min", ParamValue::Float(f64::MIN)),
            ("max", ParamValue::Float(100.0)),
        ]);
        assert_eq!(
            render(
                "must be#if(min) at least {min}#endif#if(max) at most {max}#endif.",
                &declaration,
                &[],
            ),
            "must be at most 100."
        );
    }

    #[test]
    fn test_string_list_renders_bracketed() {
        let declaration = declaration(&[
            (
                "fields",
                ParamValue::StrList(&["first_name", "last_name"]),
            ),
            ("depends_on", ParamValue::Str("full_name")),
        ]);
        assert_eq!(
            render(
                "{fields} must have a value when {depends_on} is null.",
                &declaration,
                &[],
            ),
            "[first_name, last_name] must have a value when full_name is null."
        );
    }

    #[test]
    fn test_type_list_renders_joined_short_names() {
        let declaration = declaration(&[(
            "base",
            ParamValue::TypeList(&[TypeRef::STRING, TypeRef::INTEGER]),
        )]);
        assert_eq!(render("{base}", &declaration, &[]), "String|Integer");
    }

    #[test]
    fn test_loop_expands_sub_messages_in_order() {
        let declaration = declaration(&[]);
        let sub_messages = vec![
            "String".to_string(),
            "Collection<String> and size at most 2".to_string(),
        ];
        assert_eq!(
            render(
                "type must be#for(value) or {message}#endfor.",
                &declaration,
                &sub_messages,
            ),
            "type must be or String or Collection<String> and size at most 2."
        );
    }

    #[test]
    fn test_unknown_tokens_are_left_untouched() {
        let declaration = declaration(&[]);
        assert_eq!(
            render("keep {unknown} as-is", &declaration, &[]),
            "keep {unknown} as-is"
        );
    }
}
