//! The function manifest: which functions get adapters, and their signatures.
//!
//! ```toml
//! imports = ["crate::fixtures::*"]
//!
//! [[composites]]
//! name = "Point"
//!
//! [[opaques]]
//! name = "Level"
//! path = "crate::fixtures::Level"
//!
//! [[functions]]
//! name = "add"
//! path = "crate::fixtures::add"
//! results = ["i32"]
//! args = [
//!     { name = "a", type = "i32", description = "left operand" },
//!     { name = "b", type = "i32" },
//! ]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use callkit_core::errors::SynthError;
use callkit_core::types::FxHashSet;

/// A user struct made an argument type with `composite_arg!`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeDecl {
    /// Type name as it appears in type texts and descriptors.
    pub name: String,
    /// Rust path used in generated code. Defaults to `name`.
    #[serde(default)]
    pub path: Option<String>,
}

/// A user type made an argument type with `opaque_arg!`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueDecl {
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// One declared argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub description: String,
}

/// One function to adapt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Name reported by the adapter's description.
    pub name: String,
    /// Rust path of the function.
    pub path: String,
    /// Adapter struct name. Defaults to the PascalCase name plus `Wrapper`.
    #[serde(default)]
    pub wrapper: Option<String>,
    #[serde(default)]
    pub args: Vec<ArgDecl>,
    /// Result type texts in order. `Error` marks the error result and must be last.
    #[serde(default)]
    pub results: Vec<String>,
}

impl FunctionSpec {
    pub fn wrapper_name(&self) -> String {
        self.wrapper
            .clone()
            .unwrap_or_else(|| format!("{}Wrapper", pascal_case(&self.name)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// `use` paths emitted at the top of the generated file.
    pub imports: Vec<String>,
    pub composites: Vec<CompositeDecl>,
    pub opaques: Vec<OpaqueDecl>,
    pub functions: Vec<FunctionSpec>,
}

impl Manifest {
    /// Read and check a manifest file.
    pub fn load(path: &Path) -> Result<Self, SynthError> {
        let content = std::fs::read_to_string(path).map_err(|source| SynthError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let manifest = Self::parse(&content, &path.display().to_string())?;
        tracing::debug!(
            path = %path.display(),
            functions = manifest.functions.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Parse and check manifest text. `origin` names the source in errors.
    pub fn parse(content: &str, origin: &str) -> Result<Self, SynthError> {
        let manifest: Manifest = toml::from_str(content).map_err(|e| SynthError::Manifest {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        manifest.check()?;
        Ok(manifest)
    }

    /// Reject duplicate type, function and adapter names.
    pub fn check(&self) -> Result<(), SynthError> {
        let mut types = FxHashSet::default();
        let declared = self
            .composites
            .iter()
            .map(|c| &c.name)
            .chain(self.opaques.iter().map(|o| &o.name));
        for name in declared {
            if !types.insert(name.as_str()) {
                return Err(SynthError::DuplicateDeclaration { name: name.clone() });
            }
        }

        let mut functions = FxHashSet::default();
        let mut wrappers = FxHashSet::default();
        for function in &self.functions {
            if !functions.insert(function.name.as_str()) {
                return Err(SynthError::DuplicateDeclaration {
                    name: function.name.clone(),
                });
            }
            let wrapper = function.wrapper_name();
            if !wrappers.insert(wrapper.clone()) {
                return Err(SynthError::DuplicateDeclaration { name: wrapper });
            }
        }
        Ok(())
    }

    pub fn composite(&self, name: &str) -> Option<&CompositeDecl> {
        self.composites.iter().find(|c| c.name == name)
    }

    pub fn opaque(&self, name: &str) -> Option<&OpaqueDecl> {
        self.opaques.iter().find(|o| o.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// `parse_query` → `ParseQuery`, `http-get` → `HttpGet`.
pub fn pascal_case(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
imports = ["crate::fixtures::*"]

[[composites]]
name = "Point"

[[functions]]
name = "add_points"
path = "crate::fixtures::add_points"
results = ["Point"]
args = [
    { name = "a", type = "Point", description = "first" },
    { name = "b", type = "Point" },
]
"#;

    #[test]
    fn test_parse_sample() {
        let manifest = Manifest::parse(SAMPLE, "sample").unwrap();
        assert_eq!(manifest.imports, ["crate::fixtures::*"]);
        let f = manifest.function("add_points").unwrap();
        assert_eq!(f.args[0].description, "first");
        assert_eq!(f.args[1].description, "");
        assert_eq!(f.wrapper_name(), "AddPointsWrapper");
        assert!(manifest.composite("Point").is_some());
    }

    #[test]
    fn test_duplicate_function_rejected() {
        let text = r#"
[[functions]]
name = "f"
path = "f"

[[functions]]
name = "f"
path = "g"
"#;
        let err = Manifest::parse(text, "dup").unwrap_err();
        assert!(matches!(err, SynthError::DuplicateDeclaration { ref name } if name == "f"));
    }

    #[test]
    fn test_colliding_wrapper_names_rejected() {
        let text = r#"
[[functions]]
name = "get_item"
path = "a"

[[functions]]
name = "get-item"
path = "b"
"#;
        assert!(Manifest::parse(text, "dup").is_err());
    }

    #[test]
    fn test_malformed_manifest() {
        let err = Manifest::parse("functions = 3", "bad.toml").unwrap_err();
        assert!(matches!(err, SynthError::Manifest { ref path, .. } if path == "bad.toml"));
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("add"), "Add");
        assert_eq!(pascal_case("parse_http_query"), "ParseHttpQuery");
        assert_eq!(pascal_case("__x"), "X");
    }
}
