use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong inside a session.
///
/// None of these end the session: each one is reported on the output surface
/// (or logged) and the shell keeps reading lines.
#[derive(Error, Debug)]
pub enum ShellError {
    /// A search-path entry could not be listed while building the command index.
    #[error("cannot list {}: {source}", .path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// The reply to a correction menu was not a number.
    #[error("--- Aborted ---")]
    CorrectionAborted,

    /// The reply to a correction menu was a number outside `1..=max`.
    #[error("--- Invalid choice. Aborted. ---")]
    InvalidChoice { choice: String, max: usize },

    #[error("cd: '{}': No such file or directory", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("{context}: {source}")]
    Filesystem {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("history file {}: {source}", .path.display())]
    History {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type ShellResult<T> = Result<T, ShellError>;
