//! Core library for converting Equalizer APO configurations into TB
//! Equalizer Pro presets.
//!
//! The pipeline runs in three stages per input file: the
//! [`SourceModelBuilder`] reads a root file and its includes into a
//! [`CommandSequence`], [`TargetProgram::encode`] folds that sequence into at
//! most [`MAX_BANDS`] bands plus an output gain, and
//! [`serializer::to_xml_string`] renders the preset document. The [`batch`]
//! module drives many inputs and writes the results.

pub mod batch;
pub mod builder;
pub mod config;
pub mod encoder;
pub mod error;
pub mod model;
pub mod patterns;
pub mod serializer;

pub use batch::{convert_file, run_batch, BatchReport, RenderedPreset};
pub use builder::SourceModelBuilder;
pub use config::{ConflictPolicy, ConvertConfig};
pub use encoder::{TargetBand, TargetProgram, HUE_CYCLE, MAX_BANDS};
pub use error::{ConvertError, Result};
pub use model::{Command, CommandSequence, Context, CurvePoint, Filter, FilterKind, Stage};
