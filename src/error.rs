use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not encoded as {encoding}", file_name(.path))]
    Decode { path: PathBuf, encoding: String },

    #[error("{} cannot be represented as {encoding}", file_name(.path))]
    Encode { path: PathBuf, encoding: String },

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Encoding {0} can be read but not written")]
    UnwritableEncoding(String),

    #[error("Subtitle error in {}: {message}", .path.display())]
    Subtitle { path: PathBuf, message: String },

    #[error("{} does not end with the backup suffix", .0.display())]
    NotABackup(PathBuf),

    #[error("Invalid shift: {0}")]
    InvalidShift(String),
}

impl FixError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FixError::Io {
            path: path.into(),
            source,
        }
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub type Result<T> = std::result::Result<T, FixError>;
