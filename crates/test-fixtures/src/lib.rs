//! Fixture functions covering every argument shape, each with an adapter
//! synthesized at build time from `adapters.toml`.
//!
//! [`reflective`] wraps the same functions reflectively, so tests can hold
//! both implementations side by side.

use std::fmt;
use std::str::FromStr;

use callkit_engine::chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use callkit_engine::{
    composite_arg, opaque_arg, wrap, wrap_described, Cancellable, Context, InvocationError, Wrapper,
};

pub mod adapters {
    include!(concat!(env!("OUT_DIR"), "/adapters.rs"));
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

composite_arg!(Point { x: f64, y: f64 });

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    pub label: Option<String>,
}

composite_arg!(Segment {
    from: Point,
    to: Point,
    label: Option<String>,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Low,
    Medium,
    High,
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown level {other:?}")),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

opaque_arg!(Level, options = ["low", "medium", "high"]);

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("division by zero")]
    DivideByZero,
    #[error("cancelled")]
    Cancelled,
    #[error("no separator in {0:?}")]
    NoSeparator(String),
}

pub fn ping() -> String {
    "pong".to_string()
}

pub fn add(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

pub fn greet(name: String, excited: bool) -> String {
    if excited {
        format!("Hello, {name}!")
    } else {
        format!("Hello, {name}.")
    }
}

pub fn mix(a: u8, b: i16, c: u32, d: f32, e: String) -> String {
    format!("{a}|{b}|{c}|{d}|{e}")
}

pub fn scale(factor: f64, values: Vec<f64>) -> Vec<f64> {
    values.into_iter().map(|v| v * factor).collect()
}

pub fn trace(matrix: Vec<Vec<i64>>) -> i64 {
    matrix
        .iter()
        .enumerate()
        .filter_map(|(i, row)| row.get(i))
        .sum()
}

pub fn swap(pair: [u16; 2]) -> [u16; 2] {
    [pair[1], pair[0]]
}

pub fn or_default(n: Option<i64>, fallback: i64) -> i64 {
    n.unwrap_or(fallback)
}

pub fn elapsed(start: DateTime<Utc>, end: DateTime<FixedOffset>) -> TimeDelta {
    end.signed_duration_since(start)
}

pub fn deadline(start: DateTime<FixedOffset>, wait: TimeDelta) -> DateTime<FixedOffset> {
    start + wait
}

pub fn centroid(points: Vec<Point>) -> Point {
    if points.is_empty() {
        return Point { x: 0.0, y: 0.0 };
    }
    let n = points.len() as f64;
    Point {
        x: points.iter().map(|p| p.x).sum::<f64>() / n,
        y: points.iter().map(|p| p.y).sum::<f64>() / n,
    }
}

pub fn length(segment: Segment) -> (f64, String) {
    let dx = segment.to.x - segment.from.x;
    let dy = segment.to.y - segment.from.y;
    (dx.hypot(dy), segment.label.unwrap_or_default())
}

pub fn rate(level: Level, note: Option<String>) -> String {
    match note {
        Some(note) => format!("{level}: {note}"),
        None => level.to_string(),
    }
}

pub fn divide(ctx: Context, a: i64, b: i64) -> Result<i64, FixtureError> {
    if ctx.is_cancelled() {
        return Err(FixtureError::Cancelled);
    }
    a.checked_div(b).ok_or(FixtureError::DivideByZero)
}

pub fn split(text: String) -> Result<(String, String), FixtureError> {
    text.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or(FixtureError::NoSeparator(text))
}

pub fn touch(flag: bool) {
    let _ = flag;
}

/// Each fixture paired with its synthesized adapter, in manifest order.
pub fn synthesized() -> Vec<Box<dyn Wrapper>> {
    use adapters::*;
    vec![
        Box::new(PingWrapper::new()),
        Box::new(AddWrapper::new()),
        Box::new(GreetWrapper::new()),
        Box::new(MixWrapper::new()),
        Box::new(ScaleWrapper::new()),
        Box::new(TraceWrapper::new()),
        Box::new(SwapWrapper::new()),
        Box::new(OrDefaultWrapper::new()),
        Box::new(ElapsedWrapper::new()),
        Box::new(DeadlineWrapper::new()),
        Box::new(CentroidWrapper::new()),
        Box::new(LengthWrapper::new()),
        Box::new(RateWrapper::new()),
        Box::new(DivideWrapper::new()),
        Box::new(SplitWrapper::new()),
        Box::new(TouchWrapper::new()),
    ]
}

/// The same fixtures wrapped reflectively, in manifest order.
pub fn reflective() -> Result<Vec<Box<dyn Wrapper>>, InvocationError> {
    fn boxed<W: Wrapper + 'static>(w: W) -> Box<dyn Wrapper> {
        Box::new(w)
    }
    Ok(vec![
        boxed(wrap("ping", ping, &[])?),
        boxed(wrap_described(
            "add",
            add,
            &[("a", "left operand"), ("b", "right operand")],
        )?),
        boxed(wrap("greet", greet, &["name", "excited"])?),
        boxed(wrap("mix", mix, &["a", "b", "c", "d", "e"])?),
        boxed(wrap("scale", scale, &["factor", "values"])?),
        boxed(wrap("trace", trace, &["matrix"])?),
        boxed(wrap("swap", swap, &["pair"])?),
        boxed(wrap("or_default", or_default, &["n", "fallback"])?),
        boxed(wrap("elapsed", elapsed, &["start", "end"])?),
        boxed(wrap("deadline", deadline, &["start", "wait"])?),
        boxed(wrap("centroid", centroid, &["points"])?),
        boxed(wrap("length", length, &["segment"])?),
        boxed(wrap("rate", rate, &["level", "note"])?),
        boxed(wrap("divide", divide, &["ctx", "a", "b"])?),
        boxed(wrap("split", split, &["text"])?),
        boxed(wrap("touch", touch, &["flag"])?),
    ])
}
