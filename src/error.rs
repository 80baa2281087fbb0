use std::fmt::{Display, Formatter};
use std::num::ParseIntError;

use config::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Unsupported policy or memory selector, zero frames, unreadable
    /// configuration. Raised only while building an engine.
    Config(String),
    /// The trace handed to the engine has no accesses.
    EmptyTrace,
    /// A broken engine invariant or a wrapped foreign failure.
    Internal(String),
    /// Malformed input, e.g. a trace line that cannot be parsed.
    Value(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(s) | Error::Internal(s) | Error::Value(s) => {
                write!(f, "{}", s)
            }
            Error::EmptyTrace => write!(f, "no memory accesses in trace"),
        }
    }
}

impl std::error::Error for Error {}

#[macro_export]
macro_rules! config_err {
    ($($arg:tt)*) => {
        $crate::error::Error::Config(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! internal_err {
    ($($arg:tt)*) => {
        $crate::error::Error::Internal(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! value_err {
    ($($arg:tt)*) => {
        $crate::error::Error::Value(format!($($arg)*))
    };
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<ParseIntError> for Error {
    fn from(err: ParseIntError) -> Self {
        Error::Value(err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<log::ParseLevelError> for Error {
    fn from(err: log::ParseLevelError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Self {
        Error::Internal(err.to_string())
    }
}
