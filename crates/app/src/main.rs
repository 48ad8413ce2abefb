use std::path::{Path, PathBuf};

use apo_tbeq_core::{
    batch, ConflictPolicy, ConvertConfig, ConvertError, SourceModelBuilder, TargetProgram,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

fn main() -> apo_tbeq_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            inputs,
            output_dir,
            on_conflict,
            config,
            sequential,
        } => run_convert(inputs, output_dir, on_conflict, config.as_deref(), sequential),
        Commands::Inspect { input, program } => run_inspect(&input, program),
    }
}

fn run_convert(
    inputs: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    on_conflict: Option<ConflictArg>,
    config_path: Option<&Path>,
    sequential: bool,
) -> apo_tbeq_core::Result<()> {
    let mut config = match config_path {
        Some(path) => ConvertConfig::from_file(path)?,
        None => ConvertConfig::default(),
    };
    if output_dir.is_some() {
        config.output_dir = output_dir;
    }
    if let Some(policy) = on_conflict {
        config.on_conflict = policy.into();
    }
    if sequential {
        config.parallel = false;
    }

    let (accepted, ignored): (Vec<PathBuf>, Vec<PathBuf>) = inputs
        .into_iter()
        .partition(|path| batch::is_apo_config(path));
    for path in &ignored {
        tracing::warn!(path = %path.display(), "not a .txt configuration, ignoring");
    }
    if accepted.is_empty() {
        return Ok(());
    }

    tracing::info!(files = accepted.len(), ?config, "converting presets");
    let report = batch::run_batch(&accepted, &config)?;
    println!("{}", report.summary());

    if report.has_errors() {
        return Err(ConvertError::msg(format!(
            "{} file(s) failed to convert",
            report.errors.len()
        )));
    }
    Ok(())
}

fn run_inspect(input: &Path, program: bool) -> apo_tbeq_core::Result<()> {
    let sequence = SourceModelBuilder::build(input)?;
    let json = if program {
        let name = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        serde_json::to_string_pretty(&TargetProgram::encode(name, &sequence))
    } else {
        serde_json::to_string_pretty(&sequence)
    }
    .map_err(|err| ConvertError::msg(err.to_string()))?;

    println!("{json}");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert Equalizer APO configurations into TB Equalizer Pro presets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert one or more APO `.txt` configurations into preset files.
    Convert {
        /// Configuration files to convert. Non-`.txt` arguments are ignored.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Directory the presets are written to. Defaults to the TB Equalizer
        /// Pro user preset folder.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// How to handle an existing preset with the same name.
        #[arg(long, value_enum)]
        on_conflict: Option<ConflictArg>,
        /// Optional TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Convert inputs one after another instead of in parallel.
        #[arg(long)]
        sequential: bool,
    },
    /// Print the parsed command sequence of a configuration as JSON.
    Inspect {
        input: PathBuf,
        /// Print the encoded preset program instead of the command sequence.
        #[arg(long)]
        program: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ConflictArg {
    Rename,
    Overwrite,
    Skip,
}

impl From<ConflictArg> for ConflictPolicy {
    fn from(value: ConflictArg) -> Self {
        match value {
            ConflictArg::Rename => Self::Rename,
            ConflictArg::Overwrite => Self::Overwrite,
            ConflictArg::Skip => Self::Skip,
        }
    }
}
