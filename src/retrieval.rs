use float_ord::FloatOrd;
use log::*;
use ndarray::ArrayView2;

use crate::distance::cosine_distance_matrix;
use crate::error::{Error, Result};

/// The output of coarse global retrieval: one candidate list per query.
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Per query, the reference indices of the `top_n` smallest global
    /// cosine distances, sorted ascending. Position 0 is the global best.
    pub candidates: Vec<Vec<usize>>,
}

impl Retrieval {
    /// The unmodified global best match per query, used as the baseline the
    /// re-ranked result is compared against downstream.
    pub fn baseline(&self) -> Vec<usize> {
        self.candidates.iter().map(|c| c[0]).collect()
    }
}

/// Computes the full reference-query cosine-distance matrix and extracts
/// the `top_n` nearest reference indices for every query.
///
/// `reference` and `query` are the global descriptor sets, one row per
/// image. `top_n` is clamped to the reference count.
pub fn retrieve_candidates(
    reference: ArrayView2<f32>,
    query: ArrayView2<f32>,
    top_n: usize,
) -> Result<Retrieval> {
    if reference.nrows() == 0 {
        return Err(Error::EmptyDataset("reference"));
    }
    if query.nrows() == 0 {
        return Err(Error::EmptyDataset("query"));
    }
    if reference.ncols() != query.ncols() {
        return Err(Error::DescriptorDimensionMismatch {
            reference: reference.ncols(),
            query: query.ncols(),
        });
    }
    let top_n = top_n.clamp(1, reference.nrows());
    debug!(
        "computing {}x{} global distance matrix",
        reference.nrows(),
        query.nrows()
    );
    let distances = cosine_distance_matrix(reference, query);
    let candidates = (0..query.nrows())
        .map(|q| {
            let column = distances.column(q);
            let mut order: Vec<usize> = (0..column.len()).collect();
            order.sort_unstable_by_key(|&r| FloatOrd(column[r]));
            order.truncate(top_n);
            order
        })
        .collect();
    Ok(Retrieval { candidates })
}
