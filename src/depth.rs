/// Returns the indices of keypoints whose depth lies strictly inside the
/// open interval `(min_depth, max_depth)`.
///
/// The lower bound rejects non-positive depths, which mark unknown or
/// failed depth estimates; the upper bound is the run's depth threshold.
/// The output is an index set rather than a mask so callers can subset
/// other per-keypoint arrays with it directly.
pub fn filter_depths(depths: &[f32], min_depth: f32, max_depth: f32) -> Vec<usize> {
    depths
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d > min_depth && d < max_depth)
        .map(|(i, _)| i)
        .collect()
}
