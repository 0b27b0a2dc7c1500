//! Argument binding for the four call conventions.
//!
//! Each binder produces one value per declared argument: the context slot
//! holds the caller's context, absent arguments hold their zero value.

use std::collections::HashMap;

use tracing::trace;

use callkit_core::errors::InvocationError;
use callkit_core::tracing::fields;
use callkit_core::types::ArgBuffer;
use callkit_core::{Context, TypeDescriptor, Value};

use crate::description::FunctionDescription;
use crate::scan::{json, ScannerRegistry};

fn push_context(buffer: &mut ArgBuffer, description: &FunctionDescription, ctx: &Context) {
    if description.has_context_arg() {
        buffer.push(Value::Context(ctx.clone()));
    }
}

fn coerce_token(
    description: &FunctionDescription,
    registry: &ScannerRegistry,
    name: &str,
    ty: &TypeDescriptor,
    token: Option<&str>,
) -> Result<Value, InvocationError> {
    match token {
        Some(text) => registry
            .coerce(text, ty)
            .map_err(|cause| InvocationError::ParseArgumentText {
                function: description.name().to_string(),
                argument: name.to_string(),
                text: text.to_string(),
                cause,
            }),
        None => {
            trace!({ fields::ARGUMENT } = name, "argument absent, using zero value");
            Ok(ty.zero_value())
        }
    }
}

/// Typed values. Extra values are dropped; missing values are zero.
pub fn bind_values(description: &FunctionDescription, ctx: &Context, values: Vec<Value>) -> ArgBuffer {
    let mut buffer = ArgBuffer::new();
    push_context(&mut buffer, description, ctx);
    let mut values = values.into_iter();
    for (_, arg) in description.bindable_args() {
        buffer.push(values.next().unwrap_or_else(|| arg.ty.zero_value()));
    }
    buffer
}

/// Positional tokens, coerced in declaration order.
pub fn bind_strings(
    description: &FunctionDescription,
    registry: &ScannerRegistry,
    ctx: &Context,
    tokens: &[&str],
) -> Result<ArgBuffer, InvocationError> {
    let mut buffer = ArgBuffer::new();
    push_context(&mut buffer, description, ctx);
    for (position, (_, arg)) in description.bindable_args().enumerate() {
        let token = tokens.get(position).copied();
        buffer.push(coerce_token(description, registry, &arg.name, &arg.ty, token)?);
    }
    Ok(buffer)
}

/// Tokens looked up by argument name.
pub fn bind_named(
    description: &FunctionDescription,
    registry: &ScannerRegistry,
    ctx: &Context,
    named: &HashMap<String, String>,
) -> Result<ArgBuffer, InvocationError> {
    let mut buffer = ArgBuffer::new();
    push_context(&mut buffer, description, ctx);
    for (_, arg) in description.bindable_args() {
        let token = named.get(&arg.name).map(String::as_str);
        buffer.push(coerce_token(description, registry, &arg.name, &arg.ty, token)?);
    }
    Ok(buffer)
}

/// A JSON object payload.
pub fn bind_json(
    description: &FunctionDescription,
    ctx: &Context,
    payload: &[u8],
) -> Result<ArgBuffer, InvocationError> {
    let mut buffer = ArgBuffer::new();
    push_context(&mut buffer, description, ctx);
    buffer.extend(json::bind_arguments(payload, description)?);
    Ok(buffer)
}
