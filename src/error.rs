use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a document or writing the compressed grammar.
///
/// Every variant is detected before any output is produced.
#[derive(Debug, Error)]
pub enum Error {
    /// The source could not be read.
    #[error("cannot read '{}'", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document is longer than the configured ceiling.
    #[error("document of {len} bytes is larger than the maximum of {max} bytes")]
    TooLarge { len: usize, max: usize },

    /// The document contains the terminator byte.
    #[error("document contains a null byte at offset {offset}")]
    NullByte { offset: usize },

    /// The configuration cannot drive the compressor.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Writing the emitted grammar failed.
    #[error("failed to write output")]
    Io(#[from] io::Error),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Unreadable { .. } | Error::Io(_) => 1,
            Error::TooLarge { .. } => 2,
            Error::NullByte { .. } => 3,
            Error::InvalidConfig(_) => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
