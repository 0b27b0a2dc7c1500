//! The invocation contract shared by reflective wrappers and synthesized adapters.

use std::collections::HashMap;
use std::sync::Arc;

use callkit_core::errors::CallError;
use callkit_core::{Context, Value};

use crate::description::FunctionDescription;

/// Result values in declaration order, with the error result split out.
pub type CallResult = Result<Vec<Value>, CallError>;

/// A function callable through four conventions.
///
/// Every convention skips the context argument and passes `ctx` in its
/// place. Missing arguments bind to their type's zero value and extra
/// arguments are ignored. A failure to bind any argument aborts the call
/// before the function runs.
pub trait Wrapper: Send + Sync {
    fn description(&self) -> &FunctionDescription;

    /// Typed values for the non-context arguments, in order.
    fn call(&self, ctx: &Context, args: Vec<Value>) -> CallResult;

    /// Positional text tokens for the non-context arguments, in order.
    fn call_with_strings(&self, ctx: &Context, args: &[&str]) -> CallResult;

    /// Text tokens keyed by argument name.
    fn call_with_named_strings(&self, ctx: &Context, args: &HashMap<String, String>) -> CallResult;

    /// A JSON object keyed by argument name. An empty payload is `{}`.
    fn call_with_json(&self, ctx: &Context, json: &[u8]) -> CallResult;

    fn name(&self) -> &str {
        self.description().name()
    }
}

impl<W: Wrapper + ?Sized> Wrapper for Arc<W> {
    fn description(&self) -> &FunctionDescription {
        (**self).description()
    }

    fn call(&self, ctx: &Context, args: Vec<Value>) -> CallResult {
        (**self).call(ctx, args)
    }

    fn call_with_strings(&self, ctx: &Context, args: &[&str]) -> CallResult {
        (**self).call_with_strings(ctx, args)
    }

    fn call_with_named_strings(&self, ctx: &Context, args: &HashMap<String, String>) -> CallResult {
        (**self).call_with_named_strings(ctx, args)
    }

    fn call_with_json(&self, ctx: &Context, json: &[u8]) -> CallResult {
        (**self).call_with_json(ctx, json)
    }
}

impl<W: Wrapper + ?Sized> Wrapper for Box<W> {
    fn description(&self) -> &FunctionDescription {
        (**self).description()
    }

    fn call(&self, ctx: &Context, args: Vec<Value>) -> CallResult {
        (**self).call(ctx, args)
    }

    fn call_with_strings(&self, ctx: &Context, args: &[&str]) -> CallResult {
        (**self).call_with_strings(ctx, args)
    }

    fn call_with_named_strings(&self, ctx: &Context, args: &HashMap<String, String>) -> CallResult {
        (**self).call_with_named_strings(ctx, args)
    }

    fn call_with_json(&self, ctx: &Context, json: &[u8]) -> CallResult {
        (**self).call_with_json(ctx, json)
    }
}
