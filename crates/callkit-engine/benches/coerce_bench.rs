//! Criterion benchmarks for callkit-engine.
//!
//! Covers the registry walk for scalars and nested sequences, and the
//! reflective wrapper across its text and JSON conventions.

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use callkit_engine::scan::standard_registry;
use callkit_engine::{wrap, Context, PrimitiveKind, TypeDescriptor, Wrapper};

fn bench_coerce_scalars(c: &mut Criterion) {
    let registry = standard_registry();
    let int = TypeDescriptor::primitive(PrimitiveKind::I64);
    let instant = TypeDescriptor::primitive(PrimitiveKind::Instant);
    let duration = TypeDescriptor::primitive(PrimitiveKind::Duration);

    c.bench_function("coerce_i64", |b| {
        b.iter(|| registry.coerce(black_box("-9223372036854775808"), &int))
    });
    c.bench_function("coerce_instant", |b| {
        b.iter(|| registry.coerce(black_box("2024-05-06T07:08:09.123456789+02:00"), &instant))
    });
    c.bench_function("coerce_duration", |b| {
        b.iter(|| registry.coerce(black_box("1h2m3.5s"), &duration))
    });
}

fn bench_coerce_sequences(c: &mut Criterion) {
    let registry = standard_registry();
    let matrix = TypeDescriptor::sequence(TypeDescriptor::sequence(TypeDescriptor::primitive(
        PrimitiveKind::F64,
    )));
    let literal = format!(
        "[{}]",
        (0..32)
            .map(|row| format!("[{}]", (0..32).map(|col| (row * col).to_string()).collect::<Vec<_>>().join(",")))
            .collect::<Vec<_>>()
            .join(",")
    );
    c.bench_function("coerce_matrix_32x32", |b| {
        b.iter(|| registry.coerce(black_box(&literal), &matrix))
    });

    let strings = TypeDescriptor::sequence(TypeDescriptor::primitive(PrimitiveKind::Text));
    let quoted = format!(
        "[{}]",
        (0..256).map(|i| format!("\"item,{i}\"")).collect::<Vec<_>>().join(",")
    );
    c.bench_function("coerce_quoted_strings_256", |b| {
        b.iter(|| registry.coerce(black_box(&quoted), &strings))
    });
}

fn bench_wrapper_conventions(c: &mut Criterion) {
    let w = wrap(
        "scale",
        |factor: f64, values: Vec<f64>| values.into_iter().map(|v| v * factor).collect::<Vec<_>>(),
        &["factor", "values"],
    )
    .unwrap();
    let ctx = Context::background();
    let named: HashMap<String, String> = [
        ("factor".to_string(), "2.5".to_string()),
        ("values".to_string(), "[1,2,3,4]".to_string()),
    ]
    .into_iter()
    .collect();

    c.bench_function("wrapper_strings", |b| {
        b.iter(|| w.call_with_strings(&ctx, black_box(&["2.5", "[1,2,3,4]"])))
    });
    c.bench_function("wrapper_named_strings", |b| {
        b.iter(|| w.call_with_named_strings(&ctx, black_box(&named)))
    });
    c.bench_function("wrapper_json", |b| {
        b.iter(|| w.call_with_json(&ctx, black_box(br#"{"factor": 2.5, "values": [1,2,3,4]}"#)))
    });
}

criterion_group!(
    benches,
    bench_coerce_scalars,
    bench_coerce_sequences,
    bench_wrapper_conventions
);
criterion_main!(benches);
