//! HTML form rendering and submission for a wrapped function.

use std::collections::HashMap;

use quick_xml::escape::escape;

use callkit_core::types::{Capability, PrimitiveKind, TypeDescriptor};
use callkit_core::Context;
use callkit_engine::{CallResult, FunctionDescription, Wrapper};

/// Input control for one argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Checkbox,
    Number,
    File,
    Select(Vec<String>),
    Text,
}

impl InputKind {
    /// Control for `ty`. Optional types use their inner type's control.
    pub fn for_type(ty: &TypeDescriptor) -> Self {
        match ty {
            TypeDescriptor::Optional(inner) => Self::for_type(inner),
            TypeDescriptor::Primitive(PrimitiveKind::Bool) => Self::Checkbox,
            TypeDescriptor::Primitive(kind) if kind.is_numeric() => Self::Number,
            TypeDescriptor::Opaque(o) if o.has_capability(Capability::File) => Self::File,
            TypeDescriptor::Opaque(o) if o.has_capability(Capability::Enumeration) => {
                Self::Select(o.options().to_vec())
            }
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: InputKind,
}

/// One field per non-context argument, in declaration order.
pub fn form_fields(description: &FunctionDescription) -> Vec<FormField> {
    description
        .bindable_args()
        .map(|(_, arg)| FormField {
            name: arg.name.clone(),
            label: if arg.description.is_empty() {
                arg.name.clone()
            } else {
                arg.description.clone()
            },
            kind: InputKind::for_type(&arg.ty),
        })
        .collect()
}

/// A `<form>` posting to `action`. Multipart when any field takes a file.
pub fn render_form(description: &FunctionDescription, action: &str) -> String {
    let fields = form_fields(description);
    let multipart = fields.iter().any(|f| f.kind == InputKind::File);

    let mut html = format!("<form method=\"post\" action=\"{}\"", escape(action));
    if multipart {
        html.push_str(" enctype=\"multipart/form-data\"");
    }
    html.push_str(">\n");

    for field in &fields {
        let name = escape(field.name.as_str());
        html.push_str(&format!(
            "  <label for=\"{name}\">{}</label>\n",
            escape(field.label.as_str())
        ));
        let control = match &field.kind {
            InputKind::Checkbox => format!("<input type=\"checkbox\" id=\"{name}\" name=\"{name}\">"),
            InputKind::Number => {
                format!("<input type=\"number\" step=\"any\" id=\"{name}\" name=\"{name}\">")
            }
            InputKind::File => format!("<input type=\"file\" id=\"{name}\" name=\"{name}\">"),
            InputKind::Text => format!("<input type=\"text\" id=\"{name}\" name=\"{name}\">"),
            InputKind::Select(options) => {
                let mut select = format!("<select id=\"{name}\" name=\"{name}\">");
                for option in options {
                    let option = escape(option.as_str());
                    select.push_str(&format!("<option value=\"{option}\">{option}</option>"));
                }
                select.push_str("</select>");
                select
            }
        };
        html.push_str("  ");
        html.push_str(&control);
        html.push('\n');
    }

    html.push_str(&format!(
        "  <button type=\"submit\">{}</button>\n</form>\n",
        escape(description.name())
    ));
    html
}

/// Call `wrapper` with submitted form values.
///
/// Browsers omit unchecked checkboxes, send `on` for checked ones and send
/// an empty string for blank inputs. An optional argument that is blank or
/// unchecked is left out so it binds as absent; a required checkbox maps to
/// bool text.
pub fn submit(wrapper: &dyn Wrapper, ctx: &Context, values: &HashMap<String, String>) -> CallResult {
    let mut args = values.clone();
    for (_, arg) in wrapper.description().bindable_args() {
        let submitted = args.get(&arg.name).map(String::as_str);
        if matches!(arg.ty, TypeDescriptor::Optional(_)) && matches!(submitted, None | Some("")) {
            args.remove(&arg.name);
            continue;
        }
        if InputKind::for_type(&arg.ty) != InputKind::Checkbox {
            continue;
        }
        let checked = match submitted {
            None | Some("") | Some("off") => "false",
            Some("on") => "true",
            Some(other) => other,
        }
        .to_string();
        args.insert(arg.name.clone(), checked);
    }
    wrapper.call_with_named_strings(ctx, &args)
}
