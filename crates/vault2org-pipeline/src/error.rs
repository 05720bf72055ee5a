use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole run
///
/// Anything scoped to a single note is a
/// [`NoteFailure`](crate::report::NoteFailure) in the report instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input directory does not exist: {}", .0.display())]
    InputDirectoryMissing(PathBuf),

    #[error("cannot prepare output directory {}: {source}", path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start render workers: {0}")]
    ThreadPool(String),
}

impl From<rayon::ThreadPoolBuildError> for PipelineError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err.to_string())
    }
}
