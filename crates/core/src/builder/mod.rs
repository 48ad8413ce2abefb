use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    model::{Command, CommandSequence, Context},
    patterns::{self, Directive},
    ConvertError, Result,
};

/// Reads a root configuration file and every file it includes into a flat
/// [`CommandSequence`].
///
/// Includes are resolved against the root file's directory and parsed
/// depth-first at the point of inclusion. Each file starts from the context
/// in effect at its `Include` line; scope changes inside it are discarded
/// when it returns. A missing include target contributes nothing.
#[derive(Debug)]
pub struct SourceModelBuilder {
    root_dir: PathBuf,
    commands: Vec<Command>,
    include_stack: Vec<PathBuf>,
}

impl SourceModelBuilder {
    /// Parses `path` starting from the default context.
    pub fn build(path: &Path) -> Result<CommandSequence> {
        Self::build_with_context(path, Context::default())
    }

    /// Parses `path` starting from an explicit inherited context.
    pub fn build_with_context(path: &Path, context: Context) -> Result<CommandSequence> {
        let root_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let mut builder = Self {
            root_dir,
            commands: Vec::new(),
            include_stack: Vec::new(),
        };

        let contents = fs::read_to_string(path).map_err(|source| ConvertError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        builder.parse_contents(path, &contents, context)?;

        Ok(CommandSequence::from_commands(builder.commands))
    }

    fn parse_contents(&mut self, path: &Path, contents: &str, mut context: Context) -> Result<()> {
        self.include_stack.push(identity(path));

        for (index, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let directive = patterns::classify(line).map_err(|invalid| ConvertError::InvalidNumber {
                path: path.to_path_buf(),
                line: index + 1,
                field: invalid.field,
                value: invalid.value,
            })?;

            match directive {
                Directive::Device(device) => context.device = device.to_string(),
                Directive::Channel(channel) => context.channel = channel.to_string(),
                Directive::Stage(stage) => context.stage = stage,
                Directive::Include(target) => {
                    let target = self.root_dir.join(target);
                    self.include(&target, context.clone())?;
                }
                Directive::Preamp(db) => self.commands.push(Command::Preamp {
                    db,
                    context: context.clone(),
                }),
                Directive::Filter(filter) => self.commands.push(Command::Filter {
                    filter,
                    context: context.clone(),
                }),
                Directive::GraphicEq(points) => self.commands.push(Command::GraphicEq {
                    points,
                    context: context.clone(),
                }),
                Directive::Unrecognized => {}
            }
        }

        self.include_stack.pop();
        Ok(())
    }

    fn include(&mut self, path: &Path, context: Context) -> Result<()> {
        if self.include_stack.contains(&identity(path)) {
            return Err(ConvertError::IncludeCycle {
                path: path.to_path_buf(),
            });
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "include target missing, skipping");
                return Ok(());
            }
            Err(source) => {
                return Err(ConvertError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        tracing::debug!(path = %path.display(), device = %context.device, "entering include");
        self.parse_contents(path, &contents, context)
    }
}

/// Canonical form used for cycle detection; falls back to the path as given
/// when it cannot be resolved.
fn identity(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
