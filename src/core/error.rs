//! Error handling - the only fatal class is a transport fault

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// hft-system error hierarchy
///
/// Malformed wire input, unknown message types and unknown order ids are
/// not errors; they are skipped at the point where they are seen.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport faults (peer gone, send refused)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Socket/IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
