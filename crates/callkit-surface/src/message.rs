//! User-facing error text for the surfaces.

use callkit_core::errors::{root_cause, CallError, InvocationError};

/// One line describing a failed call: the offending argument and its raw
/// text when known, then the innermost cause.
pub fn user_message(err: &CallError) -> String {
    match err {
        CallError::Invocation(InvocationError::ParseArgumentText {
            argument, text, ..
        }) => format!("argument {argument} ({text:?}): {}", root_cause(err)),
        CallError::Invocation(InvocationError::ParseArgumentJson { argument, .. }) => {
            format!("argument {argument}: {}", root_cause(err))
        }
        CallError::Invocation(InvocationError::ParseArgumentsJson { .. }) => {
            format!("arguments: {}", root_cause(err))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callkit_core::errors::{FunctionError, ScanError};

    #[test]
    fn test_text_error_names_argument_and_cause() {
        let err = CallError::Invocation(InvocationError::ParseArgumentText {
            function: "f".into(),
            argument: "n".into(),
            text: "[1,x]".into(),
            cause: ScanError::nested(
                "[1,x]",
                "Vec<i32>",
                ScanError::invalid("x", "i32", "invalid digit found in string"),
            ),
        });
        assert_eq!(user_message(&err), "argument n (\"[1,x]\"): invalid digit found in string");
    }

    #[test]
    fn test_function_error_verbatim() {
        let err = CallError::Function(FunctionError::new("disk full"));
        assert_eq!(user_message(&err), "disk full");
    }
}
