//! Drift detection between a manifest and an emitted adapter file.

use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use callkit_core::constants::{ADAPTER_BEGIN_MARKER, ADAPTER_END_MARKER};
use callkit_core::errors::SynthError;
use callkit_core::tracing::fields;

use crate::manifest::Manifest;
use crate::synthesizer::AdapterSynthesizer;

/// Adapters whose emitted source does not match what the manifest renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// In the manifest, absent from the file.
    pub missing: Vec<String>,
    /// Present in both, with different source.
    pub stale: Vec<String>,
    /// In the file, absent from the manifest.
    pub orphaned: Vec<String>,
    /// Emitted more than once in the file.
    pub duplicated: Vec<String>,
    /// Header or imports differ from what the manifest renders.
    pub preamble_stale: bool,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
            && self.stale.is_empty()
            && self.orphaned.is_empty()
            && self.duplicated.is_empty()
            && !self.preamble_stale
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return f.write_str("up to date");
        }
        let mut parts = Vec::new();
        if self.preamble_stale {
            parts.push("stale header or imports".to_string());
        }
        for (label, names) in [
            ("missing", &self.missing),
            ("stale", &self.stale),
            ("orphaned", &self.orphaned),
            ("duplicated", &self.duplicated),
        ] {
            if !names.is_empty() {
                parts.push(format!("{label}: {}", names.join(", ")));
            }
        }
        f.write_str(&parts.join("; "))
    }
}

/// Adapter blocks in `source`, as (function name, block text) pairs.
/// An unterminated block runs to the end of the source.
pub fn adapter_blocks(source: &str) -> Vec<(String, String)> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, String)> = None;

    for line in source.lines() {
        let trimmed = line.trim();
        if let Some((name, mut body)) = current.take() {
            body.push_str(line);
            body.push('\n');
            if trimmed.strip_prefix(ADAPTER_END_MARKER.trim_end()).map(str::trim) == Some(name.as_str()) {
                blocks.push((name, body));
            } else {
                current = Some((name, body));
            }
        } else if let Some(name) = trimmed.strip_prefix(ADAPTER_BEGIN_MARKER.trim_end()) {
            current = Some((name.trim().to_string(), format!("{line}\n")));
        }
    }
    if let Some(block) = current {
        blocks.push(block);
    }
    blocks
}

/// Everything before the first adapter block.
pub fn preamble(source: &str) -> &str {
    let begin = ADAPTER_BEGIN_MARKER.trim_end();
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        if line.trim_start().starts_with(begin) {
            return &source[..offset];
        }
        offset += line.len();
    }
    source
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl AdapterSynthesizer {
    /// Compare what `manifest` renders against `existing` source: the header
    /// and imports, then each adapter block by name.
    pub fn validate(&self, manifest: &Manifest, existing: &str) -> Result<ValidationReport, SynthError> {
        let blocks = adapter_blocks(existing);
        let mut report = ValidationReport {
            preamble_stale: normalize(preamble(existing)) != normalize(&self.render_preamble(manifest)),
            ..ValidationReport::default()
        };

        for function in &manifest.functions {
            let expected = self.render_adapter(function, manifest)?;
            match blocks.iter().find(|(name, _)| *name == function.name) {
                None => report.missing.push(function.name.clone()),
                Some((_, actual)) if normalize(actual) != normalize(&expected) => {
                    report.stale.push(function.name.clone());
                }
                Some(_) => {}
            }
        }
        for (i, (name, _)) in blocks.iter().enumerate() {
            let first = blocks.iter().position(|(other, _)| other == name) == Some(i);
            if !first {
                if !report.duplicated.contains(name) {
                    report.duplicated.push(name.clone());
                }
            } else if manifest.function(name).is_none() {
                report.orphaned.push(name.clone());
            }
        }

        debug!(
            { fields::ADAPTER_COUNT } = manifest.functions.len(),
            clean = report.is_clean(),
            "validated adapters"
        );
        Ok(report)
    }
}

/// Validate with the default synthesizer settings.
pub fn validate(manifest: &Manifest, existing: &str) -> Result<ValidationReport, SynthError> {
    AdapterSynthesizer::default().validate(manifest, existing)
}

/// Validate the adapter file at `path`. A missing file reports every adapter missing.
pub fn check_file(
    synthesizer: &AdapterSynthesizer,
    manifest: &Manifest,
    path: &Path,
) -> Result<ValidationReport, SynthError> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(SynthError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };
    synthesizer.validate(manifest, &existing)
}

/// Render `manifest` to `path`, creating parent directories.
/// Returns `false` when the file already held exactly this content.
pub fn write_file(
    synthesizer: &AdapterSynthesizer,
    manifest: &Manifest,
    path: &Path,
) -> Result<bool, SynthError> {
    let rendered = synthesizer.render_file(manifest)?;
    let io_error = |source| SynthError::Io {
        path: path.display().to_string(),
        source,
    };

    if std::fs::read_to_string(path).is_ok_and(|existing| existing == rendered) {
        debug!(path = %path.display(), "adapter file unchanged");
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, rendered).map_err(io_error)?;
    info!(
        path = %path.display(),
        { fields::ADAPTER_COUNT } = manifest.functions.len(),
        "wrote adapters"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_extracted_by_marker() {
        let source = "\
// header
// callkit:adapter a
struct A;
// callkit:end a

// callkit:adapter b
struct B;
";
        let blocks = adapter_blocks(source);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].0, "a");
        assert_eq!(blocks[0].1, "// callkit:adapter a\nstruct A;\n// callkit:end a\n");
        assert_eq!(blocks[1].0, "b");
    }

    #[test]
    fn test_preamble_stops_at_first_block() {
        let source = "// header\nuse a::B;\n\n// callkit:adapter a\nstruct A;\n";
        assert_eq!(preamble(source), "// header\nuse a::B;\n\n");
        assert_eq!(preamble("// header only\n"), "// header only\n");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  a\n\t b  c\n"), "a b c");
    }

    #[test]
    fn test_report_display() {
        let report = ValidationReport {
            missing: vec!["f".into()],
            stale: vec![],
            orphaned: vec!["g".into(), "h".into()],
            ..ValidationReport::default()
        };
        assert_eq!(report.to_string(), "missing: f; orphaned: g, h");
        let report = ValidationReport {
            duplicated: vec!["f".into()],
            preamble_stale: true,
            ..ValidationReport::default()
        };
        assert_eq!(report.to_string(), "stale header or imports; duplicated: f");
        assert_eq!(ValidationReport::default().to_string(), "up to date");
    }
}
