use std::path::{Path, PathBuf};

use callkit_synth::{AdapterSynthesizer, Manifest};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest = Manifest::load(Path::new("adapters.toml"))?;
    let rendered = AdapterSynthesizer::new().render_file(&manifest)?;

    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    std::fs::write(out_dir.join("adapters.rs"), rendered)?;

    println!("cargo:rerun-if-changed=adapters.toml");
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
