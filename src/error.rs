// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Source file is missing, not a regular file, or unreadable.
    InputNotFound(String),
    /// SVG markup is not well-formed.
    Parse(String),
    /// Rasterization failed after a successful parse.
    Render(String),
    /// The external thumbnail tool failed or produced no output.
    Subprocess(String),
    /// Writing, moving or deleting files failed.
    FileSystem(String),
    /// Scale factor is not a finite positive number.
    InvalidScale(String),
    Config(String),
}

impl Error {
    /// Short machine-friendly name of the error kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InputNotFound(_) => "input-not-found",
            Error::Parse(_) => "parse",
            Error::Render(_) => "render",
            Error::Subprocess(_) => "subprocess",
            Error::FileSystem(_) => "file-system",
            Error::InvalidScale(_) => "invalid-scale",
            Error::Config(_) => "config",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InputNotFound(e) => write!(f, "Input not found: {}", e),
            Error::Parse(e) => write!(f, "SVG parse error: {}", e),
            Error::Render(e) => write!(f, "Render error: {}", e),
            Error::Subprocess(e) => write!(f, "Thumbnail tool error: {}", e),
            Error::FileSystem(e) => write!(f, "I/O Error: {}", e),
            Error::InvalidScale(e) => write!(f, "Invalid scale: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::FileSystem(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
