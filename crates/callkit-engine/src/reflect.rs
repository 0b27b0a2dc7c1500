//! The runtime-introspecting wrapper.
//!
//! Argument and result descriptors come from the `Arg` and `Returns`
//! implementations of the function's parameter and return types. All four
//! conventions bind through the scanner registry and then call the function.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use callkit_core::constants::DEFAULT_CONTEXT_ARG_NAME;
use callkit_core::errors::{CallError, InvocationError};
use callkit_core::tracing::fields;
use callkit_core::types::ArgBuffer;
use callkit_core::{Context, Value};

use crate::binding;
use crate::description::{ArgSpec, FunctionDescription};
use crate::scan::{standard_registry, ScannerRegistry};
use crate::typed::{Callable, InvokeError};
use crate::wrapper::{CallResult, Wrapper};

/// Wraps any `Fn` whose arguments are `Arg` and whose return type is `Returns`.
pub struct ReflectWrapper<F, M> {
    func: F,
    description: FunctionDescription,
    registry: ScannerRegistry,
    _marker: PhantomData<fn() -> M>,
}

/// Wrap `func` with the given argument names.
///
/// With no names, a function whose only argument is a `Context` names it `ctx`.
/// A name count different from the function's arity is `ArityMismatch`.
pub fn wrap<F, M>(
    name: &str,
    func: F,
    arg_names: &[&str],
) -> Result<ReflectWrapper<F, M>, InvocationError>
where
    F: Callable<M>,
{
    let described: Vec<(&str, &str)> = arg_names.iter().map(|n| (*n, "")).collect();
    wrap_described(name, func, &described)
}

/// Wrap `func` with `(name, description)` pairs for its arguments.
pub fn wrap_described<F, M>(
    name: &str,
    func: F,
    args: &[(&str, &str)],
) -> Result<ReflectWrapper<F, M>, InvocationError>
where
    F: Callable<M>,
{
    let arg_types = F::arg_types();
    let args: Vec<(&str, &str)> =
        if args.is_empty() && arg_types.len() == 1 && arg_types[0].is_context() {
            vec![(DEFAULT_CONTEXT_ARG_NAME, "")]
        } else {
            args.to_vec()
        };

    if args.len() != arg_types.len() {
        return Err(InvocationError::ArityMismatch {
            function: name.to_string(),
            expected: arg_types.len(),
            actual: args.len(),
        });
    }

    let specs = args
        .iter()
        .zip(arg_types)
        .map(|((arg_name, description), ty)| ArgSpec::new(*arg_name, *description, ty))
        .collect();
    let description = FunctionDescription::new(name, specs, F::result_types())?;
    debug!({ fields::FUNCTION } = name, signature = %description, "wrapped function");

    Ok(ReflectWrapper {
        func,
        description,
        registry: standard_registry().clone(),
        _marker: PhantomData,
    })
}

impl<F, M> ReflectWrapper<F, M>
where
    F: Callable<M>,
{
    /// Use `registry` for the text conventions instead of the standard registry.
    pub fn with_registry(mut self, registry: ScannerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &ScannerRegistry {
        &self.registry
    }

    fn invoke(&self, convention: &'static str, args: ArgBuffer) -> CallResult {
        debug!(
            { fields::FUNCTION } = self.description.name(),
            { fields::CONVENTION } = convention,
            "invoking"
        );
        self.func.invoke(args).map_err(|e| match e {
            InvokeError::Argument { index, cause } => CallError::Invocation(InvocationError::ArgumentType {
                function: self.description.name().to_string(),
                index,
                cause,
            }),
            InvokeError::Function(err) => CallError::Function(err),
        })
    }
}

impl<F, M> Wrapper for ReflectWrapper<F, M>
where
    F: Callable<M>,
    M: 'static,
{
    fn description(&self) -> &FunctionDescription {
        &self.description
    }

    fn call(&self, ctx: &Context, args: Vec<Value>) -> CallResult {
        let bound = binding::bind_values(&self.description, ctx, args);
        self.invoke("typed", bound)
    }

    fn call_with_strings(&self, ctx: &Context, args: &[&str]) -> CallResult {
        let bound = binding::bind_strings(&self.description, &self.registry, ctx, args)?;
        self.invoke("strings", bound)
    }

    fn call_with_named_strings(&self, ctx: &Context, args: &HashMap<String, String>) -> CallResult {
        let bound = binding::bind_named(&self.description, &self.registry, ctx, args)?;
        self.invoke("named_strings", bound)
    }

    fn call_with_json(&self, ctx: &Context, json: &[u8]) -> CallResult {
        let bound = binding::bind_json(&self.description, ctx, json)?;
        self.invoke("json", bound)
    }
}

impl<F, M> fmt::Debug for ReflectWrapper<F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectWrapper")
            .field("description", &self.description)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
