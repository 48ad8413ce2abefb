//! End-to-end conversion tests: APO text in, preset XML out.

use std::{fs, path::Path};

use apo_tbeq_core::{convert_file, run_batch, ConflictPolicy, ConvertConfig, MAX_BANDS};

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

/// Preamps inside includes count towards the output gain.
#[test]
fn preamps_across_includes_set_out_gain() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "speakers.txt", "Device: Speakers\nPreamp: -1.0 dB\n");
    write(
        dir.path(),
        "config.txt",
        "Preamp: -2.0 dB\nInclude: speakers.txt\nFilter 1: ON PK Fc 1000 Hz Gain 3.5 dB Q 0.707\n",
    );

    let preset = convert_file(&dir.path().join("config.txt")).unwrap();
    assert_eq!(preset.program.out_gain(), 170);
    assert!(preset.xml.contains("OutGain=\"170\""));
    assert!(preset.xml.contains("Freq1=\"995\" Gain1=\"3350\" Q1=\"687\""));
}

/// Only the first 32 filters in file order become bands.
#[test]
fn forty_filters_yield_thirty_two_bands() {
    let dir = tempfile::tempdir().unwrap();
    let body: String = (1..=40)
        .map(|i| format!("Filter {i}: ON PK Fc {} Hz Gain 1 dB Q 1\n", i * 100))
        .collect();
    write(dir.path(), "many.txt", &body);

    let preset = convert_file(&dir.path().join("many.txt")).unwrap();
    let bands = preset.program.bands();
    assert_eq!(bands.len(), MAX_BANDS);
    assert_eq!(bands.first().map(|band| band.freq), Some(95));
    assert_eq!(bands.last().map(|band| band.freq), Some(3195));
    assert!(preset.xml.contains("ScnIdx=\"32\""));
    assert!(!preset.xml.contains("Freq33"));
}

/// Shelves carry type/order attributes; graphic EQ lines add no bands.
#[test]
fn shelves_and_graphic_eq() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "mixed.txt",
        "GraphicEQ: 20 -3; 1000 0; 20000 2\n\
         Filter: ON LSC Fc 105 Hz Gain 5 dB Q 0.7\n\
         Filter: OFF HSC Fc 10000 Hz Gain -2 dB Q 0.7\n",
    );

    let preset = convert_file(&dir.path().join("mixed.txt")).unwrap();
    assert_eq!(preset.program.bands().len(), 2);
    assert!(preset.xml.contains("Type1=\"1\" Order1=\"1\""));
    assert!(preset.xml.contains("Enable2=\"0\""));
    assert!(preset.xml.contains("Type2=\"2\" Order2=\"1\""));
}

/// A malformed file fails alone; its siblings are still written.
#[test]
fn batch_isolates_failures() {
    let inputs = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write(inputs.path(), "ok.txt", "Filter: ON PK Fc 500 Hz Gain 2 dB Q 1.2\n");
    write(inputs.path(), "broken.txt", "Filter: ON PK Fc 5x0 Hz Gain 2 dB Q 1.2\n");

    let config = ConvertConfig {
        output_dir: Some(output.path().to_path_buf()),
        on_conflict: ConflictPolicy::Rename,
        parallel: true,
    };
    let report = run_batch(
        &[inputs.path().join("broken.txt"), inputs.path().join("ok.txt")],
        &config,
    )
    .unwrap();

    assert_eq!(report.success_count(), 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].0, "broken.txt");
    assert!(report.errors[0].1.contains("Fc"));

    let written = fs::read_to_string(output.path().join("ok.xml")).unwrap();
    assert!(written.contains("Name=\"ok\""));
    assert!(!output.path().join("broken.xml").exists());
}
