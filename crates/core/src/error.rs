use std::path::PathBuf;

/// Result alias that carries the custom [`ConvertError`] type.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Common error type for the core crate.
///
/// Every variant is scoped to a single input file: the batch driver records
/// the message against that file and moves on to the next one.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A configuration or include file could not be read.
    #[error("cannot read `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A recognised directive carried a value that is not a number.
    #[error("{}:{line}: invalid {field} value `{value}`", .path.display())]
    InvalidNumber {
        path: PathBuf,
        line: usize,
        field: &'static str,
        value: String,
    },
    /// An include chain re-entered a file that is still being parsed.
    #[error("include cycle through `{}`", .path.display())]
    IncludeCycle { path: PathBuf },
    #[error("xml: {0}")]
    Xml(String),
    #[error("config: {0}")]
    Config(String),
    /// No default preset directory is known for the host platform.
    #[error("the TB Equalizer Pro preset path for this platform is unknown; set an output directory")]
    UnknownPresetDir,
}

impl ConvertError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for ConvertError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for ConvertError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
