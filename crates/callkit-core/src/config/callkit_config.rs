//! Top-level callkit configuration with 4-layer resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::http_config::RESULT_FORMATS;
use super::{CliConfig, HttpConfig, SynthConfig};
use crate::constants::PROJECT_CONFIG_FILE;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`CALLKIT_*`)
/// 3. Project config (`callkit.toml` in project root)
/// 4. User config (`~/.callkit/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CallkitConfig {
    pub synth: SynthConfig,
    pub http: HttpConfig,
    pub cli: CliConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub synth_manifest: Option<String>,
    pub synth_output: Option<String>,
    pub synth_runtime_crate: Option<String>,
}

impl CallkitConfig {
    /// Load configuration with 4-layer resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &CallkitConfig) -> Result<(), ConfigError> {
        if let Some(ref format) = config.http.result_format {
            if !RESULT_FORMATS.contains(&format.as_str()) {
                return Err(ConfigError::ValidationFailed {
                    field: "http.result_format".to_string(),
                    message: format!("must be one of {}", RESULT_FORMATS.join(", ")),
                });
            }
        }
        if config.http.max_body_bytes == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "http.max_body_bytes".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(ref path) = config.synth.runtime_crate {
            if path.is_empty() || path.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidValue {
                    field: "synth.runtime_crate".to_string(),
                    message: format!("{path:?} is not a crate path"),
                });
            }
        }
        if config.cli.program_name.as_deref() == Some("") {
            return Err(ConfigError::ValidationFailed {
                field: "cli.program_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.callkit/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut CallkitConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;

        let file_config: CallkitConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it has a value.
    pub fn merge(base: &mut CallkitConfig, other: &CallkitConfig) {
        // Synth
        if other.synth.manifest.is_some() {
            base.synth.manifest = other.synth.manifest.clone();
        }
        if other.synth.output.is_some() {
            base.synth.output = other.synth.output.clone();
        }
        if other.synth.runtime_crate.is_some() {
            base.synth.runtime_crate = other.synth.runtime_crate.clone();
        }
        if other.synth.header.is_some() {
            base.synth.header = other.synth.header.clone();
        }

        // HTTP
        if other.http.result_format.is_some() {
            base.http.result_format = other.http.result_format.clone();
        }
        if other.http.max_body_bytes.is_some() {
            base.http.max_body_bytes = other.http.max_body_bytes;
        }

        // CLI
        if other.cli.program_name.is_some() {
            base.cli.program_name = other.cli.program_name.clone();
        }
        if other.cli.json_output.is_some() {
            base.cli.json_output = other.cli.json_output;
        }
    }

    /// Apply environment variable overrides read through `lookup`.
    /// Pattern: `CALLKIT_SYNTH_OUTPUT`, `CALLKIT_HTTP_MAX_BODY_BYTES`, etc.
    /// Values that fail to parse are ignored.
    pub fn apply_env_overrides(config: &mut CallkitConfig, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("CALLKIT_SYNTH_MANIFEST") {
            config.synth.manifest = Some(val);
        }
        if let Some(val) = lookup("CALLKIT_SYNTH_OUTPUT") {
            config.synth.output = Some(val);
        }
        if let Some(val) = lookup("CALLKIT_SYNTH_RUNTIME_CRATE") {
            config.synth.runtime_crate = Some(val);
        }
        if let Some(val) = lookup("CALLKIT_HTTP_RESULT_FORMAT") {
            config.http.result_format = Some(val);
        }
        if let Some(val) = lookup("CALLKIT_HTTP_MAX_BODY_BYTES") {
            if let Ok(v) = val.parse::<usize>() {
                config.http.max_body_bytes = Some(v);
            }
        }
        if let Some(val) = lookup("CALLKIT_CLI_PROGRAM_NAME") {
            config.cli.program_name = Some(val);
        }
        if let Some(val) = lookup("CALLKIT_CLI_JSON_OUTPUT") {
            if let Ok(v) = val.parse::<bool>() {
                config.cli.json_output = Some(v);
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    pub fn apply_cli_overrides(config: &mut CallkitConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.synth_manifest {
            config.synth.manifest = Some(v.clone());
        }
        if let Some(ref v) = cli.synth_output {
            config.synth.output = Some(v.clone());
        }
        if let Some(ref v) = cli.synth_runtime_crate {
            config.synth.runtime_crate = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }
}

/// Returns the user-level callkit config directory: `~/.callkit/`.
fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".callkit"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
