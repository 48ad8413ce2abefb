use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Processing stage a directive applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    PreMix,
    #[default]
    PostMix,
    Capture,
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pre-mix" => Ok(Self::PreMix),
            "post-mix" => Ok(Self::PostMix),
            "capture" => Ok(Self::Capture),
            other => Err(format!("unknown stage `{other}`")),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PreMix => "pre-mix",
            Self::PostMix => "post-mix",
            Self::Capture => "capture",
        })
    }
}

/// Ambient device/channel/stage scope attached to every parsed command.
///
/// Passed by value through the include recursion, so a scope change made in
/// an included file never leaks back into the file that included it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub device: String,
    pub channel: String,
    pub stage: Stage,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            device: "all".to_string(),
            channel: "all".to_string(),
            stage: Stage::PostMix,
        }
    }
}

/// Filter type token. Kinds the target encodes specially get their own
/// variant; anything else is kept verbatim (upper-cased).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKind {
    Peaking,
    LowShelf,
    LowShelfCorner,
    HighShelf,
    HighShelfCorner,
    Other(String),
}

impl FilterKind {
    pub fn from_token(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "PK" => Self::Peaking,
            "LS" => Self::LowShelf,
            "LSC" => Self::LowShelfCorner,
            "HS" => Self::HighShelf,
            "HSC" => Self::HighShelfCorner,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_low_shelf(&self) -> bool {
        matches!(self, Self::LowShelf | Self::LowShelfCorner)
    }

    pub fn is_high_shelf(&self) -> bool {
        matches!(self, Self::HighShelf | Self::HighShelfCorner)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Peaking => "PK",
            Self::LowShelf => "LS",
            Self::LowShelfCorner => "LSC",
            Self::HighShelf => "HS",
            Self::HighShelfCorner => "HSC",
            Self::Other(token) => token,
        })
    }
}

/// One parametric band as written in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub kind: FilterKind,
    pub fc: f64,
    pub gain: f64,
    pub q: f64,
    pub enabled: bool,
}

/// A single `freq gain` point of a graphic EQ curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub freq: f64,
    pub gain: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Preamp {
        db: f64,
        context: Context,
    },
    Filter {
        filter: Filter,
        context: Context,
    },
    GraphicEq {
        points: Vec<CurvePoint>,
        context: Context,
    },
}

impl Command {
    pub fn context(&self) -> &Context {
        match self {
            Self::Preamp { context, .. }
            | Self::Filter { context, .. }
            | Self::GraphicEq { context, .. } => context,
        }
    }
}

/// Ordered, immutable list of commands read from a root file and everything
/// it includes, in depth-first order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandSequence {
    commands: Vec<Command>,
}

impl CommandSequence {
    pub(crate) fn from_commands(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Sum of every preamp value, regardless of the scope it was declared in.
    pub fn total_preamp_db(&self) -> f64 {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::Preamp { db, .. } => Some(*db),
                _ => None,
            })
            .sum()
    }
}

impl<'a> IntoIterator for &'a CommandSequence {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
