use std::fmt;

/// Everything that can abort a label run.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("label template error: {0}")]
    Template(String),

    #[error("invalid release: {0}")]
    InvalidRelease(String),

    #[error("malformed releases file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("collaborator error: {0}")]
    Collaborator(String),
}

impl Error {
    pub(crate) fn config(msg: impl fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }

    pub(crate) fn template(msg: impl fmt::Display) -> Self {
        Self::Template(msg.to_string())
    }

    /// Attach the offending path to an I/O error, keeping its kind.
    pub(crate) fn io_at(e: std::io::Error, path: &std::path::Path) -> Self {
        Self::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", e, path.display()),
        ))
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Self::template(e)
    }
}

impl From<usvg::Error> for Error {
    fn from(e: usvg::Error) -> Self {
        Self::template(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::config(e)
    }
}
