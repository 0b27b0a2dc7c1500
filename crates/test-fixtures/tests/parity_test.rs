//! Synthesized adapters must agree with the reflective wrapper: same
//! descriptions, and for every input under every convention the same
//! results or the same failure.

use std::collections::HashMap;

use callkit_core::errors::CallkitErrorCode;
use callkit_engine::{CallResult, Cancellable, Context, Value, Wrapper};
use test_fixtures::{reflective, synthesized};

#[derive(Debug, PartialEq)]
enum Outcome {
    Returned(Vec<Value>),
    Failed {
        code: &'static str,
        scan_root: Option<&'static str>,
        function_error: Option<String>,
    },
}

fn outcome(result: CallResult) -> Outcome {
    match result {
        Ok(values) => Outcome::Returned(values),
        Err(e) => Outcome::Failed {
            code: e.error_code(),
            scan_root: e.scan_error().map(|s| s.root().error_code()),
            function_error: e.function_error().map(ToString::to_string),
        },
    }
}

struct Pair {
    synthesized: Box<dyn Wrapper>,
    reflective: Box<dyn Wrapper>,
}

fn pairs() -> HashMap<String, Pair> {
    let synthesized = synthesized();
    let reflective = reflective().unwrap();
    assert_eq!(synthesized.len(), reflective.len());
    synthesized
        .into_iter()
        .zip(reflective)
        .map(|(s, r)| {
            assert_eq!(s.name(), r.name());
            (
                s.name().to_string(),
                Pair {
                    synthesized: s,
                    reflective: r,
                },
            )
        })
        .collect()
}

fn synthesized_for<'a>(pairs: &'a HashMap<String, Pair>, name: &str) -> &'a dyn Wrapper {
    pairs[name].synthesized.as_ref()
}

fn named(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Positional tokens for one case. Named and JSON inputs are derived
/// from them using the description's argument names.
const CASES: &[(&str, &[&str])] = &[
    ("ping", &[]),
    ("ping", &["extra"]),
    ("add", &["2", "40"]),
    ("add", &["-7"]),
    ("add", &["2147483648", "1"]),
    ("add", &["two", "1"]),
    ("greet", &["Ada", "true"]),
    ("greet", &["Ada", "yes"]),
    ("greet", &[]),
    ("mix", &["255", "-32768", "7", "1.5", "x,y"]),
    ("mix", &["256"]),
    ("mix", &["1", "2", "3", "NaN?", "e"]),
    ("scale", &["2", "[1, 2.5, -3]"]),
    ("scale", &["2", "[]"]),
    ("scale", &["2", "[1, x]"]),
    ("trace", &["[[1, 2], [3, 4]]"]),
    ("trace", &["[[1, 2], [3, 4]"]),
    ("swap", &["[1, 2]"]),
    ("swap", &["[1, 2, 3]"]),
    ("swap", &["[1, 70000]"]),
    ("or_default", &["nil", "9"]),
    ("or_default", &["", "9"]),
    ("or_default", &["4", "9"]),
    ("elapsed", &["2024-01-01T00:00:00Z", "2024-01-01T02:00:00+01:00"]),
    ("elapsed", &["yesterday", "2024-01-01T00:00:00Z"]),
    ("deadline", &["2024-03-01T12:00:00-05:00", "1h30m"]),
    ("deadline", &["2024-03-01T12:00:00-05:00", "soon"]),
    ("centroid", &[r#"[{"x": 1, "y": 2}, {"x": 3, "y": 4}]"#]),
    ("centroid", &[r#"[{"x": "one"}]"#]),
    ("length", &[r#"{"from": {"x": 0, "y": 0}, "to": {"x": 3, "y": 4}, "label": "diag"}"#]),
    ("length", &[r#"{"to": {"x": 1, "y": 0}}"#]),
    ("rate", &["high", "urgent"]),
    ("rate", &["medium"]),
    ("rate", &["extreme"]),
    ("divide", &["9", "3"]),
    ("divide", &["9", "0"]),
    ("divide", &["9", "zero"]),
    ("split", &["key=value"]),
    ("split", &["novalue"]),
    ("touch", &["true"]),
    ("touch", &["maybe"]),
];

#[test]
fn test_descriptions_match() {
    for (name, pair) in pairs() {
        assert_eq!(
            pair.synthesized.description(),
            pair.reflective.description(),
            "description of {name}"
        );
    }
}

#[test]
fn test_positional_strings_agree() {
    let pairs = pairs();
    let ctx = Context::background();
    for (name, tokens) in CASES {
        let pair = &pairs[*name];
        assert_eq!(
            outcome(pair.synthesized.call_with_strings(&ctx, tokens)),
            outcome(pair.reflective.call_with_strings(&ctx, tokens)),
            "{name} {tokens:?}"
        );
    }
}

#[test]
fn test_named_strings_agree() {
    let pairs = pairs();
    let ctx = Context::background();
    for (name, tokens) in CASES {
        let pair = &pairs[*name];
        let args: HashMap<String, String> = pair
            .reflective
            .description()
            .bindable_args()
            .zip(tokens.iter())
            .map(|((_, arg), token)| (arg.name.clone(), token.to_string()))
            .collect();
        assert_eq!(
            outcome(pair.synthesized.call_with_named_strings(&ctx, &args)),
            outcome(pair.reflective.call_with_named_strings(&ctx, &args)),
            "{name} {args:?}"
        );
    }
}

#[test]
fn test_json_agrees() {
    let pairs = pairs();
    let ctx = Context::background();
    for (name, tokens) in CASES {
        let pair = &pairs[*name];
        // Each token becomes a JSON value when it parses as one, a string otherwise.
        let object: serde_json::Map<String, serde_json::Value> = pair
            .reflective
            .description()
            .bindable_args()
            .zip(tokens.iter())
            .map(|((_, arg), token)| {
                let value = serde_json::from_str(token)
                    .unwrap_or_else(|_| serde_json::Value::String(token.to_string()));
                (arg.name.clone(), value)
            })
            .collect();
        let payload = serde_json::Value::Object(object).to_string();
        assert_eq!(
            outcome(pair.synthesized.call_with_json(&ctx, payload.as_bytes())),
            outcome(pair.reflective.call_with_json(&ctx, payload.as_bytes())),
            "{name} {payload}"
        );
    }
}

#[test]
fn test_malformed_json_agrees() {
    let pairs = pairs();
    let ctx = Context::background();
    for payload in [&b"[1, 2]"[..], b"{", b"", b"null", br#"{"unknown": 1}"#] {
        for (name, pair) in &pairs {
            assert_eq!(
                outcome(pair.synthesized.call_with_json(&ctx, payload)),
                outcome(pair.reflective.call_with_json(&ctx, payload)),
                "{name} {:?}",
                String::from_utf8_lossy(payload)
            );
        }
    }
}

#[test]
fn test_typed_values_agree() {
    let pairs = pairs();
    let ctx = Context::background();
    let cases: Vec<(&str, Vec<Value>)> = vec![
        ("add", vec![Value::Int(1), Value::Int(2)]),
        ("add", vec![Value::Int(1)]),
        ("add", vec![Value::from("1"), Value::Int(2)]),
        ("greet", vec![Value::from("Lin"), Value::Bool(false)]),
        ("scale", vec![Value::Float(0.5), Value::Sequence(vec![Value::Float(4.0)])]),
        ("swap", vec![Value::Sequence(vec![Value::Uint(1), Value::Uint(2)])]),
        ("or_default", vec![Value::none(), Value::Int(3)]),
        ("or_default", vec![Value::some(Value::Int(5)), Value::Int(3)]),
        ("divide", vec![Value::Int(8), Value::Int(2)]),
        ("divide", vec![Value::Int(8), Value::Int(0)]),
        ("split", vec![Value::from("a=b")]),
        ("touch", vec![]),
    ];
    for (name, values) in cases {
        let pair = &pairs[name];
        assert_eq!(
            outcome(pair.synthesized.call(&ctx, values.clone())),
            outcome(pair.reflective.call(&ctx, values.clone())),
            "{name} {values:?}"
        );
    }
}

#[test]
fn test_context_reaches_both() {
    let pairs = pairs();
    let pair = &pairs["divide"];
    let ctx = Context::background();
    ctx.cancel();
    for wrapper in [&pair.synthesized, &pair.reflective] {
        let err = wrapper.call_with_strings(&ctx, &["1", "1"]).unwrap_err();
        assert_eq!(err.function_error().unwrap().to_string(), "cancelled");
    }
}

#[test]
fn test_selected_results() {
    let pairs = pairs();
    let ctx = Context::background();
    let adapter = |name| synthesized_for(&pairs, name);

    assert_eq!(
        adapter("add").call_with_strings(&ctx, &["2", "40"]).unwrap(),
        [Value::Int(42)]
    );
    assert_eq!(
        adapter("trace").call_with_strings(&ctx, &["[[1,2],[3,4]]"]).unwrap(),
        [Value::Int(5)]
    );
    assert_eq!(
        adapter("or_default")
            .call_with_named_strings(&ctx, &named(&[("fallback", "9")]))
            .unwrap(),
        [Value::Int(9)]
    );
    assert_eq!(
        adapter("split").call_with_json(&ctx, br#"{"text": "k=v"}"#).unwrap(),
        [Value::from("k"), Value::from("v")]
    );
    let elapsed = adapter("elapsed")
        .call_with_strings(&ctx, &["2024-01-01T00:00:00Z", "2024-01-01T02:00:00+01:00"])
        .unwrap();
    assert_eq!(elapsed[0].to_text(), "1h0m0s");
    let length = adapter("length")
        .call_with_strings(&ctx, &[r#"{"from":{"x":0,"y":0},"to":{"x":3,"y":4},"label":"d"}"#])
        .unwrap();
    assert_eq!(length, [Value::Float(5.0), Value::from("d")]);
    assert!(adapter("touch").call_with_strings(&ctx, &["true"]).unwrap().is_empty());
}
