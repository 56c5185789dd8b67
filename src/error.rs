use miette::Diagnostic;
use thiserror::Error;

/// Main error type for gridway operations
#[derive(Error, Diagnostic, Debug)]
pub enum GridwayError {
    #[error("IO error: {0}")]
    #[diagnostic(code(gridway::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(gridway::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(gridway::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Topology error: {message}")]
    #[diagnostic(code(gridway::topology))]
    Topology {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Build error: {message}")]
    #[diagnostic(code(gridway::build))]
    Build {
        message: String,
        #[help]
        help: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, GridwayError>;
