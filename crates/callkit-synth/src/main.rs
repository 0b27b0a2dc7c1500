//! callkit-synth: render or check adapter files from a manifest.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::info;

use callkit_core::config::{CallkitConfig, CliOverrides};
use callkit_core::errors::{CallkitErrorCode, SynthError};
use callkit_core::tracing::{fields, init_tracing};
use callkit_synth::{check_file, write_file, AdapterSynthesizer, Manifest};

#[derive(Parser)]
#[command(name = "callkit-synth")]
#[command(about = "Render Wrapper adapters for the functions in a manifest", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root holding callkit.toml
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Manifest path, relative to the root
    #[arg(short, long, global = true, value_name = "MANIFEST")]
    manifest: Option<String>,

    /// Adapter file path, relative to the root
    #[arg(short, long, global = true, value_name = "OUTPUT")]
    output: Option<String>,

    /// Crate path generated code uses for the runtime
    #[arg(long, global = true, value_name = "PATH")]
    runtime_crate: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the adapter file
    Generate,

    /// Report missing, stale and orphaned adapters without writing
    Check,
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<SynthError>() {
                Some(synth) => eprintln!("{}", synth.coded_string()),
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let overrides = CliOverrides {
        synth_manifest: cli.manifest,
        synth_output: cli.output,
        synth_runtime_crate: cli.runtime_crate,
    };
    let config = CallkitConfig::load(&cli.root, Some(&overrides))
        .map_err(|e| anyhow::anyhow!(e.coded_string()))?;

    let manifest_path = resolve(&cli.root, config.synth.effective_manifest());
    let output_path = resolve(&cli.root, config.synth.effective_output());
    let manifest = Manifest::load(&manifest_path)
        .with_context(|| format!("loading {}", manifest_path.display()))?;
    let synthesizer = AdapterSynthesizer::from_config(&config.synth);

    match cli.command {
        Commands::Generate => {
            let written = write_file(&synthesizer, &manifest, &output_path)?;
            info!(
                path = %output_path.display(),
                { fields::ADAPTER_COUNT } = manifest.functions.len(),
                written,
                "generate finished"
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check => {
            let report = check_file(&synthesizer, &manifest, &output_path)?;
            if report.is_clean() {
                info!(path = %output_path.display(), "adapters up to date");
                return Ok(ExitCode::SUCCESS);
            }
            Err(SynthError::Drift {
                path: output_path.display().to_string(),
                summary: report.to_string(),
            }
            .into())
        }
    }
}

fn resolve(root: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
