use std::path::PathBuf;

/// Errors raised while loading, filtering or writing a dataset.
///
/// Everything here is fatal for a run. Per-record anomalies (empty
/// description, empty category field) are not errors; they are counted in
/// the run report instead.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("failed to access {path}: {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {path}: {source}", path = path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(
        "column '{column}' not found in {path} (available: {available})",
        path = path.display(),
        available = available.join(", ")
    )]
    MissingColumn {
        column: String,
        path: PathBuf,
        available: Vec<String>,
    },
    #[error(
        "line {line} of {path} has {found} cells but the header has {expected}",
        path = path.display()
    )]
    RaggedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(String),
    #[error("stopword table {path} has an empty header in column {index}", path = path.display())]
    EmptyCategoryHeader { path: PathBuf, index: usize },
    #[error("failed to compile pattern for stopword '{word}': {source}")]
    Pattern {
        word: String,
        #[source]
        source: regex::Error,
    },
}

impl FilterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FilterError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        FilterError::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
