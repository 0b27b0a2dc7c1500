//! Function descriptions: names, types, and flags of a callable.

use std::fmt;

use callkit_core::errors::InvocationError;
use callkit_core::TypeDescriptor;

/// One declared argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: String,
    pub description: String,
    pub ty: TypeDescriptor,
}

impl ArgSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ty,
        }
    }
}

/// Metadata about a wrapped function.
///
/// `has_context_arg` is true iff the first argument is a `Context`;
/// `has_error_result` is true iff the last result is the error result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescription {
    name: String,
    args: Vec<ArgSpec>,
    results: Vec<TypeDescriptor>,
}

impl FunctionDescription {
    /// Build a description, rejecting duplicate argument names.
    pub fn new(
        name: impl Into<String>,
        args: Vec<ArgSpec>,
        results: Vec<TypeDescriptor>,
    ) -> Result<Self, InvocationError> {
        let name = name.into();
        for (i, arg) in args.iter().enumerate() {
            if args[..i].iter().any(|earlier| earlier.name == arg.name) {
                return Err(InvocationError::DuplicateRegistration {
                    function: name,
                    argument: arg.name.clone(),
                });
            }
        }
        Ok(Self { name, args, results })
    }

    /// Build a description whose argument names are already known to be unique.
    /// Used by synthesized adapters, which are checked when they are rendered.
    pub fn from_parts(
        name: impl Into<String>,
        args: Vec<ArgSpec>,
        results: Vec<TypeDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            args,
            results,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    pub fn arg_names(&self) -> Vec<&str> {
        self.args.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn arg_descriptions(&self) -> Vec<&str> {
        self.args.iter().map(|a| a.description.as_str()).collect()
    }

    pub fn arg_types(&self) -> Vec<&TypeDescriptor> {
        self.args.iter().map(|a| &a.ty).collect()
    }

    pub fn result_types(&self) -> &[TypeDescriptor] {
        &self.results
    }

    pub fn has_context_arg(&self) -> bool {
        self.args.first().is_some_and(|a| a.ty.is_context())
    }

    pub fn has_error_result(&self) -> bool {
        self.results.last().is_some_and(TypeDescriptor::is_error)
    }

    /// Arguments callers supply, with their index in the full argument list.
    /// Skips the context argument.
    pub fn bindable_args(&self) -> impl Iterator<Item = (usize, &ArgSpec)> {
        let skip = usize::from(self.has_context_arg());
        self.args.iter().enumerate().skip(skip)
    }

    pub fn arg(&self, name: &str) -> Option<&ArgSpec> {
        self.args.iter().find(|a| a.name == name)
    }
}

impl fmt::Display for FunctionDescription {
    /// Signature line, e.g. `add(a: i32, b: i32) -> i32`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", arg.name, arg.ty)?;
        }
        f.write_str(")")?;
        match self.results.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " -> {single}"),
            many => {
                f.write_str(" -> (")?;
                for (i, ty) in many.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callkit_core::PrimitiveKind;

    fn i32_arg(name: &str) -> ArgSpec {
        ArgSpec::new(name, "", TypeDescriptor::primitive(PrimitiveKind::I32))
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = FunctionDescription::new("f", vec![i32_arg("a"), i32_arg("a")], vec![]).unwrap_err();
        assert!(matches!(err, InvocationError::DuplicateRegistration { ref argument, .. } if argument == "a"));
    }

    #[test]
    fn test_flags_and_bindable_args() {
        let desc = FunctionDescription::new(
            "f",
            vec![ArgSpec::new("ctx", "", TypeDescriptor::Context), i32_arg("n")],
            vec![TypeDescriptor::primitive(PrimitiveKind::Text), TypeDescriptor::Error],
        )
        .unwrap();
        assert!(desc.has_context_arg());
        assert!(desc.has_error_result());
        let bindable: Vec<_> = desc.bindable_args().map(|(i, a)| (i, a.name.as_str())).collect();
        assert_eq!(bindable, [(1, "n")]);
        assert_eq!(desc.to_string(), "f(ctx: Context, n: i32) -> (String, Error)");
    }

    #[test]
    fn test_context_only_counts_first() {
        let desc = FunctionDescription::new(
            "g",
            vec![i32_arg("n"), ArgSpec::new("ctx", "", TypeDescriptor::Context)],
            vec![],
        )
        .unwrap();
        assert!(!desc.has_context_arg());
        assert!(!desc.has_error_result());
    }
}
