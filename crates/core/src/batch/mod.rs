//! Batch conversion driver.
//!
//! Inputs are parsed, encoded and rendered independently (optionally on the
//! rayon pool); destination selection and writing then happen one file at a
//! time so name collisions are resolved in input order. A failing input is
//! recorded and never stops the rest of the batch.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rayon::prelude::*;

use crate::{
    builder::SourceModelBuilder,
    config::{ConflictPolicy, ConvertConfig},
    encoder::TargetProgram,
    serializer, Result,
};

/// A fully rendered preset that has not been written anywhere yet.
#[derive(Debug, Clone)]
pub struct RenderedPreset {
    pub source: PathBuf,
    pub program: TargetProgram,
    pub xml: String,
}

/// Runs the whole pipeline for one input file.
pub fn convert_file(path: &Path) -> Result<RenderedPreset> {
    let sequence = SourceModelBuilder::build(path)?;
    let program = TargetProgram::encode(file_stem(path), &sequence);
    let xml = serializer::to_xml_string(&program)?;

    Ok(RenderedPreset {
        source: path.to_path_buf(),
        program,
        xml,
    })
}

/// Whether `path` looks like an Equalizer APO configuration (`*.txt`).
pub fn is_apo_config(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

/// Outcome of a batch.
#[derive(Debug, Default, Clone)]
pub struct BatchReport {
    /// `(source, destination)` for every preset written.
    pub converted: Vec<(PathBuf, PathBuf)>,
    /// Inputs left unconverted because their destination already existed.
    pub skipped: Vec<PathBuf>,
    /// `(file name, message)` for every failed input.
    pub errors: Vec<(String, String)>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.converted.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Human readable end-of-batch summary.
    pub fn summary(&self) -> String {
        let mut summary = format!("Converted {} file(s) successfully.", self.success_count());
        if self.has_errors() {
            summary.push_str("\n\nErrors:");
            for (name, message) in &self.errors {
                summary.push_str(&format!("\n{name}: {message}"));
            }
        }
        summary
    }
}

/// Converts every input and writes the presets into the configured
/// destination directory, creating it if needed.
///
/// Only a destination directory that cannot be resolved or created fails
/// the batch as a whole.
pub fn run_batch(inputs: &[PathBuf], config: &ConvertConfig) -> Result<BatchReport> {
    let output_dir = config.resolve_output_dir()?;
    fs::create_dir_all(&output_dir)?;

    let rendered: Vec<Result<RenderedPreset>> = if config.parallel {
        inputs.par_iter().map(|path| convert_file(path)).collect()
    } else {
        inputs.iter().map(|path| convert_file(path)).collect()
    };

    let mut report = BatchReport::default();
    for (input, outcome) in inputs.iter().zip(rendered) {
        let written = outcome.and_then(|preset| {
            write_preset(&preset, &output_dir, config.on_conflict)
        });

        match written {
            Ok(Some(destination)) => {
                tracing::info!(
                    source = %input.display(),
                    destination = %destination.display(),
                    "converted preset"
                );
                report.converted.push((input.clone(), destination));
            }
            Ok(None) => {
                tracing::info!(source = %input.display(), "destination exists, skipped");
                report.skipped.push(input.clone());
            }
            Err(err) => {
                let name = file_name(input);
                tracing::warn!(file = %name, error = %err, "conversion failed");
                report.errors.push((name, err.to_string()));
            }
        }
    }

    Ok(report)
}

fn write_preset(
    preset: &RenderedPreset,
    output_dir: &Path,
    policy: ConflictPolicy,
) -> Result<Option<PathBuf>> {
    let Some(destination) = destination_for(output_dir, preset.program.name(), policy) else {
        return Ok(None);
    };
    fs::write(&destination, &preset.xml)?;
    tracing::debug!(bands = preset.program.bands().len(), "preset written");
    Ok(Some(destination))
}

/// Picks the file a preset named `stem` is written to, or `None` when the
/// policy says to leave an existing file alone.
pub fn destination_for(output_dir: &Path, stem: &str, policy: ConflictPolicy) -> Option<PathBuf> {
    let preferred = output_dir.join(format!("{stem}.xml"));
    if !preferred.exists() {
        return Some(preferred);
    }

    match policy {
        ConflictPolicy::Overwrite => Some(preferred),
        ConflictPolicy::Skip => None,
        ConflictPolicy::Rename => (1..)
            .map(|attempt| {
                let suffix = if attempt == 1 {
                    "_new".to_string()
                } else {
                    format!("_new{attempt}")
                };
                output_dir.join(format!("{stem}{suffix}.xml"))
            })
            .find(|candidate| !candidate.exists()),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path, on_conflict: ConflictPolicy) -> ConvertConfig {
        ConvertConfig {
            output_dir: Some(dir.to_path_buf()),
            on_conflict,
            parallel: true,
        }
    }

    fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn recognises_txt_inputs() {
        assert!(is_apo_config(Path::new("config.txt")));
        assert!(is_apo_config(Path::new("Preset.TXT")));
        assert!(!is_apo_config(Path::new("preset.xml")));
        assert!(!is_apo_config(Path::new("txt")));
    }

    #[test]
    fn names_program_after_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "HD600 AutoEQ.txt", "Preamp: -6 dB\n");

        let preset = convert_file(&input).unwrap();
        assert_eq!(preset.program.name(), "HD600 AutoEQ");
        assert_eq!(preset.program.out_gain(), 140);
        assert!(preset.xml.contains("Name=\"HD600 AutoEQ\""));
    }

    #[test]
    fn failing_input_does_not_stop_the_batch() {
        let inputs_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let good = write_input(
            inputs_dir.path(),
            "good.txt",
            "Filter: ON PK Fc 1000 Hz Gain 1 dB Q 1\n",
        );
        let bad = write_input(
            inputs_dir.path(),
            "bad.txt",
            "Filter: ON PK Fc abc Hz Gain 1 dB Q 1\n",
        );
        let other = write_input(inputs_dir.path(), "other.txt", "Preamp: -1 dB\n");

        let report = run_batch(
            &[good, bad, other],
            &config(out_dir.path(), ConflictPolicy::Rename),
        )
        .unwrap();

        assert_eq!(report.success_count(), 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, "bad.txt");
        assert!(out_dir.path().join("good.xml").exists());
        assert!(out_dir.path().join("other.xml").exists());
        assert!(!out_dir.path().join("bad.xml").exists());
        assert!(report.summary().contains("bad.txt"));
    }

    #[test]
    fn rename_policy_appends_new_suffix() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("eq.xml"), "old").unwrap();
        assert_eq!(
            destination_for(dir.path(), "eq", ConflictPolicy::Rename),
            Some(dir.path().join("eq_new.xml"))
        );

        fs::write(dir.path().join("eq_new.xml"), "old").unwrap();
        assert_eq!(
            destination_for(dir.path(), "eq", ConflictPolicy::Rename),
            Some(dir.path().join("eq_new2.xml"))
        );
    }

    #[test]
    fn skip_and_overwrite_policies() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("eq.xml"), "old").unwrap();

        assert_eq!(destination_for(dir.path(), "eq", ConflictPolicy::Skip), None);
        assert_eq!(
            destination_for(dir.path(), "eq", ConflictPolicy::Overwrite),
            Some(dir.path().join("eq.xml"))
        );
    }

    #[test]
    fn skipped_inputs_are_neither_success_nor_error() {
        let inputs_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        fs::write(out_dir.path().join("eq.xml"), "old").unwrap();
        let input = write_input(inputs_dir.path(), "eq.txt", "Preamp: -1 dB\n");

        let report = run_batch(&[input], &config(out_dir.path(), ConflictPolicy::Skip)).unwrap();

        assert_eq!(report.success_count(), 0);
        assert!(!report.has_errors());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(fs::read_to_string(out_dir.path().join("eq.xml")).unwrap(), "old");
    }

    #[test]
    fn creates_missing_output_directory() {
        let inputs_dir = tempfile::tempdir().unwrap();
        let out_root = tempfile::tempdir().unwrap();
        let out_dir = out_root.path().join("nested").join("Converted");
        let input = write_input(inputs_dir.path(), "eq.txt", "Preamp: 0 dB\n");

        let mut config = config(&out_dir, ConflictPolicy::Rename);
        config.parallel = false;
        let report = run_batch(&[input], &config).unwrap();

        assert_eq!(report.success_count(), 1);
        assert!(out_dir.join("eq.xml").exists());
    }
}
