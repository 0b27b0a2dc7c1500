//! Rendering of adapter source.

use std::fmt::Write as _;

use tracing::debug;

use callkit_core::config::SynthConfig;
use callkit_core::constants::{ADAPTER_BEGIN_MARKER, ADAPTER_END_MARKER, DEFAULT_RUNTIME_CRATE, GENERATED_HEADER};
use callkit_core::errors::SynthError;
use callkit_core::tracing::fields;
use callkit_core::types::FxHashSet;

use crate::manifest::{FunctionSpec, Manifest};
use crate::type_text::{parse_result_text, parse_type_text, ResultExpr, TypeExpr};

/// A function spec with its type texts parsed.
#[derive(Debug, Clone)]
struct ResolvedFunction<'a> {
    spec: &'a FunctionSpec,
    args: Vec<(&'a str, &'a str, TypeExpr)>,
    results: Vec<ResultExpr>,
}

impl ResolvedFunction<'_> {
    fn has_context_arg(&self) -> bool {
        self.args.first().is_some_and(|(_, _, ty)| ty.is_context())
    }
}

/// Renders adapters for a manifest.
#[derive(Debug, Clone)]
pub struct AdapterSynthesizer {
    runtime_crate: String,
    header: String,
}

impl Default for AdapterSynthesizer {
    fn default() -> Self {
        Self {
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
            header: GENERATED_HEADER.to_string(),
        }
    }
}

impl AdapterSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SynthConfig) -> Self {
        Self {
            runtime_crate: config.effective_runtime_crate().to_string(),
            header: config.effective_header().to_string(),
        }
    }

    /// Path generated code uses to reach `callkit_engine`.
    pub fn with_runtime_crate(mut self, path: impl Into<String>) -> Self {
        self.runtime_crate = path.into();
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn runtime_crate(&self) -> &str {
        &self.runtime_crate
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// Render a whole module: header, imports and one block per function.
    pub fn render_file(&self, manifest: &Manifest) -> Result<String, SynthError> {
        manifest.check()?;
        let mut out = self.render_preamble(manifest);
        for function in &manifest.functions {
            out.push('\n');
            out.push_str(&self.render_adapter(function, manifest)?);
        }
        debug!({ fields::ADAPTER_COUNT } = manifest.functions.len(), "rendered adapter file");
        Ok(out)
    }

    /// The header line and `use` imports that open the module.
    pub fn render_preamble(&self, manifest: &Manifest) -> String {
        let mut out = String::new();
        out.push_str(&self.header);
        out.push('\n');
        if !manifest.imports.is_empty() {
            out.push('\n');
            for import in &manifest.imports {
                let _ = writeln!(out, "use {import};");
            }
        }
        out
    }

    /// Render one adapter block, begin and end markers included.
    pub fn render_adapter(&self, spec: &FunctionSpec, manifest: &Manifest) -> Result<String, SynthError> {
        let function = resolve(spec, manifest)?;
        let rt = self.runtime_crate.as_str();
        let name = spec.name.as_str();
        let wrapper = spec.wrapper_name();
        let mut out = String::new();

        let _ = writeln!(out, "{ADAPTER_BEGIN_MARKER}{name}");
        let _ = writeln!(out, "/// Adapter for `{}`.", spec.path);
        let _ = writeln!(out, "pub struct {wrapper} {{");
        let _ = writeln!(out, "    description: {rt}::FunctionDescription,");
        out.push_str("}\n\n");

        self.render_constructor(&mut out, &function, &wrapper);
        let _ = writeln!(out, "impl ::std::default::Default for {wrapper} {{");
        out.push_str("    fn default() -> Self {\n        Self::new()\n    }\n}\n\n");

        out.push_str("#[allow(unused_mut, unused_variables)]\n");
        let _ = writeln!(out, "impl {rt}::Wrapper for {wrapper} {{");
        let _ = writeln!(out, "    fn description(&self) -> &{rt}::FunctionDescription {{");
        out.push_str("        &self.description\n    }\n");

        self.render_call(&mut out, &function);
        self.render_text_call(&mut out, &function, TextSource::Positional);
        self.render_text_call(&mut out, &function, TextSource::Named);
        self.render_json_call(&mut out, &function);
        out.push_str("}\n");
        let _ = writeln!(out, "{ADAPTER_END_MARKER}{name}");

        debug!({ fields::FUNCTION } = name, wrapper = %wrapper, "rendered adapter");
        Ok(out)
    }

    fn render_constructor(&self, out: &mut String, function: &ResolvedFunction<'_>, wrapper: &str) {
        let rt = self.runtime_crate.as_str();
        let _ = writeln!(out, "impl {wrapper} {{");
        out.push_str("    pub fn new() -> Self {\n        Self {\n");
        let _ = writeln!(out, "            description: {rt}::FunctionDescription::from_parts(");
        let _ = writeln!(out, "                {:?},", function.spec.name);
        out.push_str("                ::std::vec![\n");
        for (arg_name, description, ty) in &function.args {
            let _ = writeln!(
                out,
                "                    {rt}::ArgSpec::new({arg_name:?}, {description:?}, <{} as {rt}::Arg>::descriptor()),",
                ty.rust_type(rt)
            );
        }
        out.push_str("                ],\n");
        out.push_str("                ::std::vec![\n");
        for result in &function.results {
            match result {
                ResultExpr::Value(ty) => {
                    let _ = writeln!(
                        out,
                        "                    <{} as {rt}::Arg>::descriptor(),",
                        ty.rust_type(rt)
                    );
                }
                ResultExpr::Error => {
                    let _ = writeln!(out, "                    {rt}::TypeDescriptor::Error,");
                }
            }
        }
        out.push_str("                ],\n            ),\n        }\n    }\n}\n\n");
    }

    /// Call expression of the wrapped function, context first when declared.
    fn invocation(&self, function: &ResolvedFunction<'_>) -> String {
        let rt = self.runtime_crate.as_str();
        let args: Vec<String> = function
            .args
            .iter()
            .enumerate()
            .map(|(i, (arg_name, _, _))| {
                if i == 0 && function.has_context_arg() {
                    "ctx.clone()".to_string()
                } else {
                    local(arg_name)
                }
            })
            .collect();
        format!(
            "        {rt}::adapter::results({}({}))\n    }}\n",
            function.spec.path,
            args.join(", ")
        )
    }

    fn bindable<'f, 'a>(
        function: &'f ResolvedFunction<'a>,
    ) -> impl Iterator<Item = (usize, &'f (&'a str, &'a str, TypeExpr))> {
        let skip = usize::from(function.has_context_arg());
        function.args.iter().enumerate().skip(skip)
    }

    fn render_call(&self, out: &mut String, function: &ResolvedFunction<'_>) {
        let rt = self.runtime_crate.as_str();
        let name = &function.spec.name;
        out.push('\n');
        let _ = writeln!(
            out,
            "    fn call(&self, ctx: &{rt}::Context, args: ::std::vec::Vec<{rt}::Value>) -> {rt}::CallResult {{"
        );
        out.push_str("        let mut values = args.into_iter();\n");
        for (index, (arg_name, _, ty)) in Self::bindable(function) {
            let _ = writeln!(
                out,
                "        let {}: {} = {rt}::adapter::typed_arg({name:?}, &mut values, {index})?;",
                local(arg_name),
                ty.rust_type(rt)
            );
        }
        out.push_str(&self.invocation(function));
    }

    fn render_text_call(&self, out: &mut String, function: &ResolvedFunction<'_>, source: TextSource) {
        let rt = self.runtime_crate.as_str();
        let name = &function.spec.name;
        out.push('\n');
        match source {
            TextSource::Positional => {
                let _ = writeln!(
                    out,
                    "    fn call_with_strings(&self, ctx: &{rt}::Context, args: &[&str]) -> {rt}::CallResult {{"
                );
            }
            TextSource::Named => {
                let _ = writeln!(
                    out,
                    "    fn call_with_named_strings(\n        &self,\n        ctx: &{rt}::Context,\n        args: &::std::collections::HashMap<::std::string::String, ::std::string::String>,\n    ) -> {rt}::CallResult {{"
                );
            }
        }
        for (position, (index, (arg_name, _, ty))) in Self::bindable(function).enumerate() {
            let token = match source {
                TextSource::Positional => format!("{rt}::adapter::positional(args, {position})"),
                TextSource::Named => format!("{rt}::adapter::named(args, {arg_name:?})"),
            };
            let _ = writeln!(
                out,
                "        let {}: {} = {rt}::adapter::text_arg(\n            {name:?},\n            {arg_name:?},\n            {index},\n            {token},\n            {},\n        )?;",
                local(arg_name),
                ty.rust_type(rt),
                ty.scan_expr(rt)
            );
        }
        out.push_str(&self.invocation(function));
    }

    fn render_json_call(&self, out: &mut String, function: &ResolvedFunction<'_>) {
        let rt = self.runtime_crate.as_str();
        let name = &function.spec.name;
        out.push('\n');
        let _ = writeln!(
            out,
            "    fn call_with_json(&self, ctx: &{rt}::Context, json: &[u8]) -> {rt}::CallResult {{"
        );
        let _ = writeln!(out, "        let args = {rt}::adapter::json_args({name:?}, json)?;");
        for (index, (arg_name, _, ty)) in Self::bindable(function) {
            let _ = writeln!(
                out,
                "        let {}: {} = {rt}::adapter::json_arg({name:?}, &args, {arg_name:?}, {index})?;",
                local(arg_name),
                ty.rust_type(rt)
            );
        }
        out.push_str(&self.invocation(function));
    }
}

#[derive(Debug, Clone, Copy)]
enum TextSource {
    Positional,
    Named,
}

/// Local variable for an argument. Prefixed so argument names never
/// collide with the adapter's own bindings or Rust keywords.
fn local(arg_name: &str) -> String {
    let sanitized: String = arg_name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("arg_{sanitized}")
}

fn resolve<'a>(spec: &'a FunctionSpec, manifest: &Manifest) -> Result<ResolvedFunction<'a>, SynthError> {
    let mut seen = FxHashSet::default();
    let mut locals = FxHashSet::default();
    let mut args = Vec::with_capacity(spec.args.len());
    for arg in &spec.args {
        if !seen.insert(arg.name.as_str()) || !locals.insert(local(&arg.name)) {
            return Err(SynthError::Description {
                function: spec.name.clone(),
                message: format!("duplicate argument name {:?}", arg.name),
            });
        }
        let ty = parse_type_text(&arg.ty, manifest)?;
        args.push((arg.name.as_str(), arg.description.as_str(), ty));
    }

    let results = spec
        .results
        .iter()
        .map(|text| parse_result_text(text, manifest))
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(position) = results.iter().position(|r| *r == ResultExpr::Error) {
        if position + 1 != results.len() {
            return Err(SynthError::Description {
                function: spec.name.clone(),
                message: "the error result must be the last result".to_string(),
            });
        }
    }

    Ok(ResolvedFunction { spec, args, results })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(text: &str) -> Manifest {
        Manifest::parse(text, "test").unwrap()
    }

    const CONTEXT_FN: &str = r#"
[[functions]]
name = "lookup"
path = "crate::lookup"
results = ["Option<String>", "Error"]
args = [
    { name = "ctx", type = "Context" },
    { name = "key", type = "String", description = "entry key" },
]
"#;

    #[test]
    fn test_adapter_passes_context_through() {
        let m = manifest(CONTEXT_FN);
        let code = AdapterSynthesizer::new().render_adapter(&m.functions[0], &m).unwrap();
        assert!(code.starts_with("// callkit:adapter lookup\n"));
        assert!(code.ends_with("// callkit:end lookup\n"));
        assert!(code.contains("pub struct LookupWrapper {"));
        assert!(code.contains("crate::lookup(ctx.clone(), arg_key)"));
        assert!(code.contains("::callkit_engine::TypeDescriptor::Error,"));
        assert!(code.contains("::callkit_engine::adapter::positional(args, 0)"));
        assert!(code.contains("\"key\",\n            1,"));
        assert!(!code.contains("let arg_ctx"));
    }

    #[test]
    fn test_runtime_crate_is_configurable() {
        let m = manifest(CONTEXT_FN);
        let code = AdapterSynthesizer::new()
            .with_runtime_crate("crate::rt")
            .render_adapter(&m.functions[0], &m)
            .unwrap();
        assert!(code.contains("impl crate::rt::Wrapper for LookupWrapper"));
        assert!(!code.contains("::callkit_engine"));
    }

    #[test]
    fn test_file_has_header_and_imports() {
        let m = manifest(&format!("imports = [\"crate::*\"]\n{CONTEXT_FN}"));
        let file = AdapterSynthesizer::new().with_header("// custom").render_file(&m).unwrap();
        assert!(file.starts_with("// custom\n"));
        assert!(file.contains("use crate::*;\n"));
        assert_eq!(file.matches("// callkit:adapter ").count(), 1);
    }

    #[test]
    fn test_error_result_must_be_last() {
        let m = manifest(
            r#"
[[functions]]
name = "f"
path = "f"
results = ["Error", "i32"]
"#,
        );
        let err = AdapterSynthesizer::new().render_adapter(&m.functions[0], &m).unwrap_err();
        assert!(matches!(err, SynthError::Description { .. }));
    }

    #[test]
    fn test_duplicate_argument_rejected() {
        let m = manifest(
            r#"
[[functions]]
name = "f"
path = "f"
args = [{ name = "a", type = "i32" }, { name = "a", type = "i64" }]
"#,
        );
        assert!(AdapterSynthesizer::new().render_adapter(&m.functions[0], &m).is_err());
    }

    #[test]
    fn test_unknown_argument_type() {
        let m = manifest(
            r#"
[[functions]]
name = "f"
path = "f"
args = [{ name = "w", type = "Widget" }]
"#,
        );
        let err = AdapterSynthesizer::new().render_adapter(&m.functions[0], &m).unwrap_err();
        assert!(matches!(err, SynthError::UnknownType { .. }));
    }

    #[test]
    fn test_local_names() {
        assert_eq!(local("type"), "arg_type");
        assert_eq!(local("api-key"), "arg_api_key");
    }
}
