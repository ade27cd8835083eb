use std::path::PathBuf;
use thiserror::Error;

/// Failures at the I/O edges of the crate.
///
/// Parsing and the confidence gate never fail; only writing an artifact
/// container or loading configuration can.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to write office document container: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to write rendered output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize preview: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown format: {0}. Use docx, html, preview, or model")]
    UnknownFormat(String),

    #[error("unknown layout: {0}. Use classic or modern")]
    UnknownLayout(String),

    #[error("unknown mode: {0}. Use auto, structured, or raw")]
    UnknownMode(String),

    #[error("failed to read lexicon {}: {source}", path.display())]
    LexiconRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid lexicon {}: {source}", path.display())]
    LexiconParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
