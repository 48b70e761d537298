//! Error types for simon-smart

use std::io;
use thiserror::Error;

/// Result type alias for simon-smart operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the SMART stack.
///
/// Hardware and transport failures are deliberately absent here: a failed
/// control-channel call is reported through the operation's empty result,
/// not as an error. Only lifecycle misuse surfaces from [`crate::SmartDevice`].
#[derive(Error, Debug)]
pub enum Error {
    /// Operation attempted on a session that has already been closed
    #[error("Cannot access a disposed object: {0}")]
    Disposed(&'static str),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Whether this error marks use of a closed session
    pub fn is_disposed(&self) -> bool {
        matches!(self, Error::Disposed(_))
    }
}
