use log::*;
use ndarray::ArrayView2;

use crate::dataset::ReferenceData;
use crate::depth::filter_depths;
use crate::distance::paired_cosine_distances;
use crate::features::channelwise_argmax;
use crate::window::sequence_window;

/// Re-scores one query's global candidates with depth-filtered local
/// matching aggregated over a sequence window.
///
/// Returns one dissimilarity per candidate, positionally aligned with
/// `candidates`. A candidate whose entire window never produces a
/// depth-valid keypoint scores `f32::INFINITY`, so it can only win the
/// arg-min if every other candidate is equally degenerate.
pub fn rerank_candidates(
    reference: &ReferenceData,
    query_dense: ArrayView2<f32>,
    candidates: &[usize],
    window_length: usize,
    depth_threshold: f32,
) -> Vec<f32> {
    // The query-side keypoint assignment is shared by all candidates.
    let query_keypoints = channelwise_argmax(query_dense);
    candidates
        .iter()
        .map(|&candidate| {
            let best = window_minima(
                reference,
                query_dense,
                &query_keypoints,
                candidate,
                window_length,
                depth_threshold,
            );
            score_from_minima(&best)
        })
        .collect()
}

/// The best (minimum) cosine distance per channel across the candidate's
/// sequence window.
///
/// `None` marks a channel that never had a depth-valid reference keypoint
/// in any window frame. Taking the minimum over the window lets a channel
/// contribute its best match from any neighboring frame, which compensates
/// for perspective shift between opposing viewpoints and for single-frame
/// depth-estimation failures.
fn window_minima(
    reference: &ReferenceData,
    query_dense: ArrayView2<f32>,
    query_keypoints: &[usize],
    candidate: usize,
    window_length: usize,
    depth_threshold: f32,
) -> Vec<Option<f32>> {
    let window = sequence_window(candidate, reference.len(), window_length);
    let projection = reference.projection();
    let mut best: Vec<Option<f32>> = vec![None; reference.channels()];
    for frame in window {
        // Reference-side keypoints for this frame, assigned independently
        // of the query's.
        let dense = reference.dense_tensor(frame);
        let keypoints = channelwise_argmax(dense);
        let depth_map = reference.depth_map(frame);
        let depths: Vec<f32> = keypoints
            .iter()
            .map(|&cell| {
                let (x, y) = projection.pixel(cell);
                depth_map[[y, x]]
            })
            .collect();
        let valid = filter_depths(&depths, 0.0, depth_threshold);
        trace!(
            "candidate {}: frame {} keeps {}/{} channels after depth filtering",
            candidate,
            frame,
            valid.len(),
            depths.len()
        );
        // Descriptors are paired per feature channel: the reference row at
        // this frame's keypoint against the query row at the query's
        // keypoint for the same channel.
        let reference_rows: Vec<usize> = valid.iter().map(|&channel| keypoints[channel]).collect();
        let query_rows: Vec<usize> = valid
            .iter()
            .map(|&channel| query_keypoints[channel])
            .collect();
        let gathered_reference = dense.select(ndarray::Axis(0), &reference_rows);
        let gathered_query = query_dense.select(ndarray::Axis(0), &query_rows);
        let distances =
            paired_cosine_distances(gathered_reference.view(), gathered_query.view());
        for (&channel, distance) in valid.iter().zip(distances) {
            best[channel] = Some(match best[channel] {
                Some(current) => current.min(distance),
                None => distance,
            });
        }
    }
    best
}

/// Mean of the collapsed per-channel distances, skipping channels that
/// never matched; infinity when no channel matched at all.
fn score_from_minima(best: &[Option<f32>]) -> f32 {
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for &distance in best.iter().flatten() {
        sum += distance;
        count += 1;
    }
    if count == 0 {
        f32::INFINITY
    } else {
        sum / count as f32
    }
}
