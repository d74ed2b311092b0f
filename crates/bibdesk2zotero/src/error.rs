//! Error types

use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a `Bdsk-File-N` value into a filesystem path.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("base directory is not absolute: {}", .0.display())]
    RelativeBaseDir(PathBuf),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid property list: {0}")]
    Plist(#[from] plist::Error),

    #[error("property list root is not a dictionary")]
    NotADictionary,

    #[error("property list has no string `relativePath` entry")]
    MissingRelativePath,
}

/// Errors raised while transforming a single record.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("base directory is not absolute: {}", .0.display())]
    RelativeBaseDir(PathBuf),

    #[error("cannot decode field `{field}`: {source}")]
    Decode {
        field: String,
        #[source]
        source: DecodeError,
    },
}

/// Errors from a whole migration run.
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("BibTeX syntax error at line {line}: {message}")]
    Parse { line: u32, message: String },

    #[error("record ID={id}: {source}")]
    Transform {
        id: String,
        #[source]
        source: TransformError,
    },

    #[error("attachment base directory is not absolute: {}", .0.display())]
    RelativeBaseDir(PathBuf),

    #[error("source and destination are the same file: {}", .0.display())]
    SameFile(PathBuf),
}

pub type Result<T, E = MigrateError> = std::result::Result<T, E>;
