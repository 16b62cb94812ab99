use thiserror::Error;

/// Failures inside an annotation pass. None of these reach the host:
/// the annotator turns them into empty or no-op results.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnnotateError {
    #[error("no word at offset {0}")]
    NoWordAtPosition(usize),

    #[error("invalid range {start}..{end} for text of {len} chars")]
    InvalidRange { start: usize, end: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("dictionary unavailable for language '{0}'")]
    Unavailable(String),

    #[error("dictionary I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dictionary is not a valid FST: {0}")]
    Fst(#[from] fst::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
