//! Configuration system for callkit.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod callkit_config;
pub mod cli_config;
pub mod http_config;
pub mod synth_config;

pub use callkit_config::{CallkitConfig, CliOverrides};
pub use cli_config::CliConfig;
pub use http_config::HttpConfig;
pub use synth_config::SynthConfig;
