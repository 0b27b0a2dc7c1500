//! Command dispatcher configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CliConfig {
    /// Program name shown in help output. Default: "callkit".
    pub program_name: Option<String>,
    /// Print results as JSON instead of canonical text. Default: false.
    pub json_output: Option<bool>,
}

impl CliConfig {
    pub fn effective_program_name(&self) -> &str {
        self.program_name.as_deref().unwrap_or("callkit")
    }

    pub fn effective_json_output(&self) -> bool {
        self.json_output.unwrap_or(false)
    }
}
