//! Adapter synthesis configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RUNTIME_CRATE, GENERATED_HEADER};

/// Configuration for `callkit-synth`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SynthConfig {
    /// Manifest describing the functions to adapt. Default: "callkit.manifest.toml".
    pub manifest: Option<String>,
    /// Where the adapter file is written. Default: "src/adapters.rs".
    pub output: Option<String>,
    /// Crate path generated code refers to. Default: "::callkit_engine".
    pub runtime_crate: Option<String>,
    /// First line of the generated file.
    pub header: Option<String>,
}

impl SynthConfig {
    pub fn effective_manifest(&self) -> &str {
        self.manifest.as_deref().unwrap_or("callkit.manifest.toml")
    }

    pub fn effective_output(&self) -> &str {
        self.output.as_deref().unwrap_or("src/adapters.rs")
    }

    pub fn effective_runtime_crate(&self) -> &str {
        self.runtime_crate.as_deref().unwrap_or(DEFAULT_RUNTIME_CRATE)
    }

    pub fn effective_header(&self) -> &str {
        self.header.as_deref().unwrap_or(GENERATED_HEADER)
    }
}
