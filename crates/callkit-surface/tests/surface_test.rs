//! Dispatcher, HTTP handler and form submission over reflective wrappers.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use callkit_core::config::{CliConfig, HttpConfig};
use callkit_core::errors::error_code;
use callkit_core::errors::{CallkitErrorCode, DispatchError};
use callkit_engine::{opaque_arg, wrap, wrap_described, Context, Wrapper};
use callkit_surface::{
    form_fields, render_form, submit, ArgumentSource, Dispatcher, HttpHandler, HttpRequest,
    InputKind, ResultWriter,
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Unit {
    #[default]
    Metric,
    Imperial,
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            other => Err(format!("unknown unit {other}")),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        })
    }
}

opaque_arg!(Unit, options = ["metric", "imperial"]);

#[derive(Debug, thiserror::Error)]
#[error("negative length")]
struct NegativeLength;

fn add() -> Arc<dyn Wrapper> {
    Arc::new(wrap("add", |a: i64, b: i64| a + b, &["a", "b"]).unwrap())
}

fn convert() -> Arc<dyn Wrapper> {
    Arc::new(
        wrap_described(
            "convert",
            |length: f64, unit: Unit, round: bool| {
                if length < 0.0 {
                    return Err(NegativeLength);
                }
                let value = match unit {
                    Unit::Metric => length,
                    Unit::Imperial => length / 2.54,
                };
                Ok(if round { value.round() } else { value })
            },
            &[("length", "Length in cm"), ("unit", ""), ("round", "Round the result")],
        )
        .unwrap(),
    )
}

fn dispatcher() -> Dispatcher {
    let mut d = Dispatcher::new("tool");
    d.register("add", add()).unwrap();
    d.register_in("units", "convert", convert()).unwrap();
    d
}

fn run(d: &Dispatcher, args: &[&str]) -> (i32, String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = d.run(&Context::background(), args, &mut out, &mut err);
    (code, String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
}

#[test]
fn test_dispatch_top_level_and_namespaced() {
    let d = dispatcher();
    let ctx = Context::background();
    assert_eq!(d.dispatch(&ctx, &["add", "2", "3"]).unwrap()[0].to_text(), "5");
    let converted = d
        .dispatch(&ctx, &["units", "convert", "5.08", "imperial"])
        .unwrap();
    assert_eq!(converted[0].to_text(), "2");
    assert_eq!(d.command_names(), ["add", "units convert"]);
}

#[test]
fn test_dispatch_not_found() {
    let d = dispatcher();
    let ctx = Context::background();
    let err = d.dispatch(&ctx, &["sub", "1"]).unwrap_err();
    assert_eq!(err.error_code(), error_code::COMMAND_NOT_FOUND);
    let err = d.dispatch_in(&ctx, "math", "add", &[]).unwrap_err();
    assert!(matches!(err, DispatchError::NamespaceNotFound { .. }));
    let err = d.dispatch(&ctx, &["units", "weigh"]).unwrap_err();
    assert!(err.to_string().contains("units weigh"), "{err}");
}

#[test]
fn test_registration_rules() {
    let mut d = dispatcher();
    assert!(matches!(
        d.register("add", add()),
        Err(DispatchError::DuplicateRegistration { .. })
    ));
    assert!(matches!(
        d.register("rm -rf", add()),
        Err(DispatchError::InvalidCommandName { .. })
    ));
    assert!(d.register_in("bad ns", "add", add()).is_err());
}

#[test]
fn test_run_prints_results_and_errors() {
    let d = dispatcher();
    let (code, out, _) = run(&d, &["add", "40", "2"]);
    assert_eq!((code, out.as_str()), (0, "42\n"));

    let (code, _, err) = run(&d, &["add", "forty"]);
    assert_eq!(code, 1);
    assert!(err.starts_with("tool: argument a (\"forty\"):"), "{err}");

    let (code, _, err) = run(&d, &["units", "convert", "-1"]);
    assert_eq!(code, 1);
    assert_eq!(err, "tool: negative length\n");

    let (code, _, err) = run(&d, &["nope"]);
    assert_eq!(code, 2);
    assert!(err.contains("Usage: tool"), "{err}");
}

#[test]
fn test_run_json_output_from_config() {
    let config = CliConfig {
        program_name: Some("calc".to_string()),
        json_output: Some(true),
    };
    let mut d = Dispatcher::from_config(&config);
    d.register("add", add()).unwrap();
    assert_eq!(d.program_name(), "calc");
    let (code, out, _) = run(&d, &["add", "1", "1"]);
    assert_eq!((code, out.as_str()), (0, "2\n"));
}

#[test]
fn test_help_lists_arguments() {
    let d = dispatcher();
    let (code, out, _) = run(&d, &[]);
    assert_eq!(code, 0);
    assert!(out.contains("  add <a> <b>"), "{out}");
    assert!(out.contains("  units convert <length> <unit> <round>"), "{out}");

    let help = d.help_for(&["units", "convert"]).unwrap();
    assert!(help.contains("length <f64>  Length in cm"), "{help}");
    assert!(help.contains("unit <Unit>"), "{help}");
}

#[test]
fn test_http_query_to_json() {
    let handler = HttpHandler::from_config(add(), &HttpConfig::default()).unwrap();
    let request = HttpRequest::new("GET", "/add").with_query("a=2&b=%2D5");
    let response = handler.handle(&Context::background(), &request);
    assert_eq!(response.status, 200);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.body, b"-3");
}

#[test]
fn test_http_status_mapping() {
    let ctx = Context::background();
    let handler = HttpHandler::new(convert(), ArgumentSource::JsonBody, ResultWriter::PlainText);

    let ok = handler.handle(
        &ctx,
        &HttpRequest::new("POST", "/convert").with_body(r#"{"length": 2.54, "unit": "imperial"}"#),
    );
    assert_eq!((ok.status, ok.body.as_slice()), (200, b"1".as_slice()));

    let bad = handler.handle(
        &ctx,
        &HttpRequest::new("POST", "/convert").with_body(r#"{"unit": "furlong"}"#),
    );
    assert_eq!(bad.status, 400);
    let body: serde_json::Value = serde_json::from_slice(&bad.body).unwrap();
    assert_eq!(body["code"], error_code::PARSE_ARGUMENT_TEXT);
    assert!(body["error"].as_str().unwrap().starts_with("argument unit"));

    let failed = handler.handle(
        &ctx,
        &HttpRequest::new("POST", "/convert").with_body(r#"{"length": -1}"#),
    );
    assert_eq!(failed.status, 500);

    let limited = handler
        .with_max_body_bytes(4)
        .handle(&ctx, &HttpRequest::new("POST", "/convert").with_body("{\"length\": 1}"));
    assert_eq!(limited.status, 413);
}

#[test]
fn test_http_headers_override_query() {
    let handler = HttpHandler::new(
        add(),
        ArgumentSource::Merge(vec![ArgumentSource::Query, ArgumentSource::Headers]),
        ResultWriter::Xml,
    );
    let request = HttpRequest::new("GET", "/add")
        .with_query("a=1&b=1")
        .with_header("b", "10");
    let response = handler.handle(&Context::background(), &request);
    assert_eq!(response.status, 200);
    assert_eq!(response.body, b"<results><result>11</result></results>");
}

#[test]
fn test_form_fields_and_rendering() {
    let w = convert();
    let fields = form_fields(w.description());
    let kinds: Vec<_> = fields.iter().map(|f| f.kind.clone()).collect();
    assert_eq!(
        kinds,
        [
            InputKind::Number,
            InputKind::Select(vec!["metric".to_string(), "imperial".to_string()]),
            InputKind::Checkbox,
        ]
    );
    assert_eq!(fields[0].label, "Length in cm");
    assert_eq!(fields[1].label, "unit");

    let html = render_form(w.description(), "/convert?x=1&y=2");
    assert!(html.starts_with("<form method=\"post\" action=\"/convert?x=1&amp;y=2\">"), "{html}");
    assert!(!html.contains("multipart"));
    assert!(html.contains("<option value=\"imperial\">imperial</option>"));
    assert!(html.contains("<input type=\"checkbox\" id=\"round\" name=\"round\">"));
}

#[test]
fn test_form_submit_maps_checkboxes() {
    let w = convert();
    let ctx = Context::background();
    let mut values = HashMap::new();
    values.insert("length".to_string(), "3.4".to_string());
    values.insert("unit".to_string(), "metric".to_string());

    let unchecked = submit(w.as_ref(), &ctx, &values).unwrap();
    assert_eq!(unchecked[0].to_text(), "3.4");

    values.insert("round".to_string(), "on".to_string());
    let checked = submit(w.as_ref(), &ctx, &values).unwrap();
    assert_eq!(checked[0].to_text(), "3");
}

#[test]
fn test_form_submit_leaves_blank_optionals_absent() {
    let ctx = Context::background();
    let flag = wrap("flag", |flag: Option<bool>| format!("{flag:?}"), &["flag"]).unwrap();
    let mut values = HashMap::new();
    assert_eq!(submit(&flag, &ctx, &values).unwrap()[0].to_text(), "None");
    values.insert("flag".to_string(), "on".to_string());
    assert_eq!(submit(&flag, &ctx, &values).unwrap()[0].to_text(), "Some(true)");
    values.insert("flag".to_string(), "off".to_string());
    assert_eq!(submit(&flag, &ctx, &values).unwrap()[0].to_text(), "Some(false)");

    let count = wrap(
        "count",
        |n: Option<i32>, label: String| format!("{label}:{n:?}"),
        &["n", "label"],
    )
    .unwrap();
    let mut values = HashMap::new();
    values.insert("n".to_string(), String::new());
    values.insert("label".to_string(), String::new());
    assert_eq!(submit(&count, &ctx, &values).unwrap()[0].to_text(), ":None");
    values.insert("n".to_string(), "12".to_string());
    assert_eq!(submit(&count, &ctx, &values).unwrap()[0].to_text(), ":Some(12)");
}
