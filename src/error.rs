use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Failure of an underlying script or style compiler
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("`{0}` not found in PATH")]
    NotFound(String),

    #[error("failed to run `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("invalid file URL `{0}`")]
    InvalidUrl(String),

    #[error("{0}")]
    Message(String),
}

/// Errors that abort the transformation of a single document
#[derive(Error, Debug)]
pub enum Error {
    #[error("{}: only UTF-8 text documents are supported", path.display())]
    Unsupported { path: PathBuf },

    #[error("cannot compile {lang} in {}: {source}", path.display())]
    Compile {
        lang: &'static str,
        path: PathBuf,
        #[source]
        source: CompileError,
    },
}
