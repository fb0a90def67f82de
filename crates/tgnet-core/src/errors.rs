use std::path::PathBuf;

/// Engine error type.
///
/// Only invocation and storage problems surface here. Message Source
/// failures are a separate taxonomy ([`crate::source::SourceError`]) and are
/// absorbed inside the scanner/classifier rather than converted into this
/// type: a failed chat must never abort a crawl, a failed write must.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid seed file: {path}: {reason}")]
    Seeds { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
