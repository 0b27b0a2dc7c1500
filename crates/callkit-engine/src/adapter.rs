//! Runtime support for synthesized adapters.
//!
//! Generated code does the per-type scanning itself through
//! [`crate::scan::typed`]; these helpers carry the parts every adapter
//! shares so the error values match the reflective wrapper exactly.

use std::collections::HashMap;

use serde_json::{Map, Value as Json};

use callkit_core::errors::{CallError, InvocationError, ScanError};
use callkit_core::Value;

use crate::scan::json;
use crate::typed::{Arg, Returns};
use crate::wrapper::CallResult;

/// Parsed JSON arguments object.
pub type JsonArgs = Map<String, Json>;

/// The zero value of `T`, converted. `index` is the argument's position
/// in the full argument list.
pub fn zero_arg<T: Arg>(function: &str, index: usize) -> Result<T, InvocationError> {
    T::from_value(T::descriptor().zero_value()).map_err(|cause| InvocationError::ArgumentType {
        function: function.to_string(),
        index,
        cause,
    })
}

/// Scan one text token with `scan`, or use the zero value when it is absent.
pub fn text_arg<T: Arg>(
    function: &str,
    argument: &str,
    index: usize,
    token: Option<&str>,
    scan: impl FnOnce(&str) -> Result<T, ScanError>,
) -> Result<T, InvocationError> {
    match token {
        Some(text) => scan(text).map_err(|cause| InvocationError::ParseArgumentText {
            function: function.to_string(),
            argument: argument.to_string(),
            text: text.to_string(),
            cause,
        }),
        None => zero_arg(function, index),
    }
}

/// The `position`-th positional token, if present.
pub fn positional<'a>(tokens: &[&'a str], position: usize) -> Option<&'a str> {
    tokens.get(position).copied()
}

/// The named token for `argument`, if present.
pub fn named<'a>(tokens: &'a HashMap<String, String>, argument: &str) -> Option<&'a str> {
    tokens.get(argument).map(String::as_str)
}

/// Parse a JSON arguments payload. An empty payload is an empty object.
pub fn json_args(function: &str, payload: &[u8]) -> Result<JsonArgs, InvocationError> {
    json::parse_arguments_object(function, payload)
}

/// Decode one argument from a JSON arguments object.
pub fn json_arg<T: Arg>(
    function: &str,
    args: &JsonArgs,
    argument: &str,
    index: usize,
) -> Result<T, InvocationError> {
    let value = json::decode_argument(function, args, argument, &T::descriptor())?;
    convert(function, index, value)
}

/// The next typed value, or the zero value when the caller supplied fewer.
pub fn typed_arg<T: Arg>(
    function: &str,
    values: &mut impl Iterator<Item = Value>,
    index: usize,
) -> Result<T, InvocationError> {
    match values.next() {
        Some(value) => convert(function, index, value),
        None => zero_arg(function, index),
    }
}

fn convert<T: Arg>(function: &str, index: usize, value: Value) -> Result<T, InvocationError> {
    T::from_value(value).map_err(|cause| InvocationError::ArgumentType {
        function: function.to_string(),
        index,
        cause,
    })
}

/// Split a function's return value into results, passing its error result through.
pub fn results<R: Returns>(returned: R) -> CallResult {
    returned.into_results().map_err(CallError::Function)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::typed::scan_number;
    use callkit_core::errors::error_code::{self, CallkitErrorCode};

    #[test]
    fn test_text_arg_absent_is_zero() {
        let n: i32 = text_arg("f", "n", 0, None, scan_number::<i32>).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_text_arg_error_shape() {
        let err = text_arg::<i32>("f", "n", 0, Some("x"), scan_number::<i32>).unwrap_err();
        assert_eq!(err.error_code(), error_code::PARSE_ARGUMENT_TEXT);
        assert_eq!(err.argument(), Some("n"));
    }

    #[test]
    fn test_typed_arg_mismatch_reports_index() {
        let mut values = vec![Value::from("x")].into_iter();
        let err = typed_arg::<bool>("f", &mut values, 2).unwrap_err();
        assert!(matches!(err, InvocationError::ArgumentType { index: 2, .. }));
    }

    #[test]
    fn test_results_split_error() {
        let ok: Result<i32, String> = Ok(4);
        assert_eq!(results(ok).unwrap(), vec![Value::Int(4)]);
        let failed: Result<i32, String> = Err("nope".into());
        assert!(results(failed).unwrap_err().is_function_error());
    }
}
