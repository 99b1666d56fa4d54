use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run before or during scoring.
///
/// Shape and configuration problems are detected when the datasets are
/// constructed, so a run never produces scores from inconsistent arrays.
/// Numeric edge cases inside scoring (degenerate descriptors, candidates
/// with no depth-valid keypoint) are not errors; they resolve to defined
/// score values so the arg-min over candidates stays total.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read array file {path:?}: {source}")]
    ArrayRead {
        path: PathBuf,
        source: ndarray_npy::ReadNpyError,
    },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("global descriptor dimensionality differs between sets: reference {reference}, query {query}")]
    DescriptorDimensionMismatch { reference: usize, query: usize },
    #[error("dense tensor for image {index} has shape {found:?}, expected {expected:?}")]
    DenseShapeMismatch {
        index: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("feature grid {rows}x{cols} does not match {cells} spatial cells")]
    GridShapeMismatch {
        rows: usize,
        cols: usize,
        cells: usize,
    },
    #[error("depth map resolution {full:?} is not an integer multiple of the feature grid {grid:?}")]
    DepthResolutionMismatch {
        full: (usize, usize),
        grid: (usize, usize),
    },
    #[error("expected {expected} {kind} entries, found {found}")]
    CountMismatch {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("dataset contains no {0} images")]
    EmptyDataset(&'static str),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
